use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::CompanyInfo;

/// Renders a finished artifact into deliverable documents.
#[async_trait]
pub trait ReportFormatter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Write the artifact as a document under `output_dir` and return its path.
    async fn render(
        &self,
        artifact: &str,
        company: &CompanyInfo,
        output_dir: &Path,
    ) -> DomainResult<PathBuf>;

    /// Render the artifact as a standalone HTML fragment.
    fn render_html(&self, artifact: &str, company: &CompanyInfo) -> DomainResult<String>;
}
