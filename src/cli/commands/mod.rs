//! CLI command implementations.

pub mod config;
pub mod render;
pub mod run;
pub mod verify;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::oracle::{build_oracle, MockOracle};
use crate::domain::models::{CompanyInfo, Config};
use crate::domain::ports::ContentOracle;
use crate::infrastructure::config::{ConfigLoader, CONFIG_DIR};

/// Company details shown in the report header.
#[derive(Args, Debug, Clone, Default)]
pub struct CompanyArgs {
    /// Company name
    #[arg(long = "company")]
    pub company_name: Option<String>,

    /// JSON file with all company fields (overridden by individual flags)
    #[arg(long)]
    pub company_json: Option<PathBuf>,

    #[arg(long)]
    pub country: Option<String>,

    #[arg(long)]
    pub consultation_date: Option<String>,

    /// Experts present in the consultation
    #[arg(long)]
    pub experts: Option<String>,

    #[arg(long)]
    pub customer_manager: Option<String>,

    #[arg(long)]
    pub consultation_type: Option<String>,
}

impl CompanyArgs {
    pub async fn resolve(&self) -> Result<CompanyInfo> {
        let mut company = match &self.company_json {
            Some(path) => {
                let raw = read_text(path).await?;
                serde_json::from_str::<CompanyInfo>(&raw)
                    .with_context(|| format!("Invalid company JSON in {}", path.display()))?
            }
            None => CompanyInfo::default(),
        };

        let overrides = [
            (&self.company_name, &mut company.company_name),
            (&self.country, &mut company.country),
            (&self.consultation_date, &mut company.consultation_date),
            (&self.experts, &mut company.experts),
            (&self.customer_manager, &mut company.customer_manager),
            (&self.consultation_type, &mut company.consultation_type),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                field.clone_from(value);
            }
        }
        Ok(company)
    }
}

/// Load configuration from `path` or the project hierarchy.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// The configured oracle, or the scripted mock when `mock` is set.
pub fn oracle_for(config: &Config, mock: bool) -> Result<Arc<dyn ContentOracle>> {
    if mock {
        return Ok(Arc::new(MockOracle::new()));
    }
    build_oracle(config).context("Failed to configure the content oracle")
}

/// Directory holding stored job records.
pub fn jobs_dir() -> PathBuf {
    Path::new(CONFIG_DIR).join("jobs")
}

pub async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Read an optional text file, returning an empty string when absent.
pub async fn read_optional(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => read_text(path).await,
        None => Ok(String::new()),
    }
}
