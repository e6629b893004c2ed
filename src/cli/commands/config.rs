//! `reportloop config`: print the effective configuration.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::load_config;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

const REDACTED: &str = "[REDACTED]";

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Show the API key instead of redacting it
    #[arg(long)]
    pub show_secrets: bool,
}

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    #[serde(flatten)]
    pub config: Config,
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.config).unwrap_or_default()
    }
}

/// Replace a configured or environment-provided key with a placeholder.
pub fn redact(mut config: Config) -> Config {
    if config.oracle.resolve_api_key().is_some() {
        config.oracle.api_key = Some(REDACTED.to_string());
    }
    config
}

pub async fn execute(args: ConfigArgs, config_path: Option<PathBuf>, json_mode: bool) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let config = if args.show_secrets {
        config
    } else {
        redact(config)
    };
    output(&ConfigOutput { config }, json_mode);
    Ok(())
}
