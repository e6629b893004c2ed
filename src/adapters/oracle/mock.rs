//! Mock oracle for testing and offline runs.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::sections::{MANDATORY_SECTIONS, RECOMMENDATIONS};
use crate::domain::ports::{ContentOracle, OracleRequest, RequestKind};
use crate::services::scoring::fallback_score;

/// Mock response configuration.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Output text
    pub output: String,
    /// Whether to simulate failure
    pub fail: bool,
    /// Error message if failing
    pub error_message: Option<String>,
}

impl MockResponse {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            fail: false,
            error_message: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            output: String::new(),
            fail: true,
            error_message: Some(error.into()),
        }
    }

    fn into_result(self) -> DomainResult<String> {
        if self.fail {
            Err(DomainError::OracleFailed(
                self.error_message.unwrap_or_else(|| "Mock failure".to_string()),
            ))
        } else {
            Ok(self.output)
        }
    }
}

#[derive(Default)]
struct Script {
    by_kind: HashMap<RequestKind, MockResponse>,
    by_section: HashMap<String, MockResponse>,
    verification_queue: VecDeque<MockResponse>,
    failing_sections: HashSet<String>,
}

/// Scripted oracle.
///
/// Resolution order for a request: failing section, section override,
/// queued verification answer, per-kind override, built-in default.
pub struct MockOracle {
    script: Arc<RwLock<Script>>,
    calls: Arc<RwLock<Vec<OracleRequest>>>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self {
            script: Arc::new(RwLock::new(Script::default())),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Set the answer for every request of `kind`.
    pub async fn set_response(&self, kind: RequestKind, output: impl Into<String>) {
        self.set_mock_response(kind, MockResponse::success(output)).await;
    }

    pub async fn set_mock_response(&self, kind: RequestKind, response: MockResponse) {
        let mut script = self.script.write().await;
        script.by_kind.insert(kind, response);
    }

    pub async fn set_verification_response(&self, output: impl Into<String>) {
        self.set_response(RequestKind::Verify, output).await;
    }

    /// Queue verification answers consumed one per call, before falling
    /// back to the per-kind answer.
    pub async fn queue_verification_responses<I, S>(&self, outputs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut script = self.script.write().await;
        script
            .verification_queue
            .extend(outputs.into_iter().map(MockResponse::success));
    }

    pub async fn set_section_response(&self, section: impl Into<String>, output: impl Into<String>) {
        let mut script = self.script.write().await;
        script
            .by_section
            .insert(section.into(), MockResponse::success(output));
    }

    /// Make every revision call for `section` fail.
    pub async fn fail_section(&self, section: impl Into<String>) {
        let mut script = self.script.write().await;
        script.failing_sections.insert(section.into());
    }

    /// Make every request of `kind` fail.
    pub async fn fail_kind(&self, kind: RequestKind, message: impl Into<String>) {
        self.set_mock_response(kind, MockResponse::failure(message)).await;
    }

    /// Every request received so far, in order.
    pub async fn calls(&self) -> Vec<OracleRequest> {
        self.calls.read().await.clone()
    }

    pub async fn calls_of(&self, kind: RequestKind) -> Vec<OracleRequest> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.kind == kind)
            .cloned()
            .collect()
    }

    pub async fn clear(&self) {
        self.calls.write().await.clear();
    }

    async fn resolve(&self, request: &OracleRequest) -> MockResponse {
        let mut script = self.script.write().await;
        if let Some(section) = request.section.as_deref() {
            if script.failing_sections.contains(section) {
                return MockResponse::failure(format!("scripted failure for '{section}'"));
            }
            if let Some(response) = script.by_section.get(section) {
                return response.clone();
            }
        }
        if request.kind == RequestKind::Verify {
            if let Some(response) = script.verification_queue.pop_front() {
                return response;
            }
        }
        script
            .by_kind
            .get(&request.kind)
            .cloned()
            .unwrap_or_else(|| MockResponse::success(default_output(request)))
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new()
    }
}

fn default_output(request: &OracleRequest) -> String {
    match request.kind {
        RequestKind::GenerateMainSections => {
            let mut text = String::from("AI ASSESSMENT AND CONSULTATION\n\nCompany Name: Mock Company\n");
            for name in MANDATORY_SECTIONS.iter().filter(|n| **n != RECOMMENDATIONS) {
                text.push_str(&format!("\n**{name}:**\nMock content for {name}.\n"));
            }
            text
        }
        RequestKind::GenerateRecommendations => {
            format!("**{RECOMMENDATIONS}:**\n- Mock recommendation.")
        }
        RequestKind::Verify => format!(
            r#"{{"score": {}, "issues": [], "suggestions": [], "summary": "Mock verification", "strengths": []}}"#,
            fallback_score(0)
        ),
        RequestKind::ReviseSection => {
            let section = request.section.as_deref().unwrap_or("General");
            format!("**{section}:**\nRevised {section} content.")
        }
    }
}

#[async_trait]
impl ContentOracle for MockOracle {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, request: OracleRequest) -> DomainResult<String> {
        let response = self.resolve(&request).await;
        self.calls.write().await.push(request);
        response.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::OracleVerdict;

    #[tokio::test]
    async fn test_default_verification_is_valid_json() {
        let oracle = MockOracle::new();
        let text = oracle
            .generate(OracleRequest::new(RequestKind::Verify, "check"))
            .await
            .unwrap();
        let verdict = OracleVerdict::parse(&text).unwrap();
        assert_eq!(verdict.score, Some(7.5));
        assert!(verdict.issues.is_empty());
    }

    #[tokio::test]
    async fn test_queue_then_fallback() {
        let oracle = MockOracle::new();
        oracle.queue_verification_responses(["first"]).await;
        oracle.set_verification_response("steady").await;

        let ask = || oracle.generate(OracleRequest::new(RequestKind::Verify, "p"));
        assert_eq!(ask().await.unwrap(), "first");
        assert_eq!(ask().await.unwrap(), "steady");
        assert_eq!(oracle.calls_of(RequestKind::Verify).await.len(), 2);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let oracle = MockOracle::new();
        oracle.fail_section("Recommendations").await;
        let request =
            OracleRequest::new(RequestKind::ReviseSection, "p").for_section("Recommendations");
        assert!(oracle.generate(request).await.unwrap_err().is_oracle_error());

        oracle.fail_kind(RequestKind::GenerateMainSections, "down").await;
        let err = oracle
            .generate(OracleRequest::new(RequestKind::GenerateMainSections, "p"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Oracle call failed: down");
    }
}
