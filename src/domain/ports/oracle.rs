//! Oracle port - interface for the content-generation backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainResult;

/// What a request is for. Adapters may log or script by kind; the wire
/// call is the same for all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    GenerateMainSections,
    GenerateRecommendations,
    Verify,
    ReviseSection,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GenerateMainSections => "generate_main_sections",
            Self::GenerateRecommendations => "generate_recommendations",
            Self::Verify => "verify",
            Self::ReviseSection => "revise_section",
        }
    }
}

/// A single prompt sent to the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRequest {
    pub kind: RequestKind,
    pub prompt: String,
    /// Section being revised, for `ReviseSection` requests.
    pub section: Option<String>,
    /// The caller will parse the answer as JSON.
    pub expect_json: bool,
}

impl OracleRequest {
    pub fn new(kind: RequestKind, prompt: impl Into<String>) -> Self {
        Self {
            kind,
            prompt: prompt.into(),
            section: None,
            expect_json: kind == RequestKind::Verify,
        }
    }

    pub fn for_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }
}

/// Text-in, text-out content generator.
#[async_trait]
pub trait ContentOracle: Send + Sync {
    /// Backend name, for logs.
    fn name(&self) -> &'static str;

    /// Generate a completion for the request.
    async fn generate(&self, request: OracleRequest) -> DomainResult<String>;
}
