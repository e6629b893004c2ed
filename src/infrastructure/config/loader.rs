use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::{Config, OracleProvider};
use crate::domain::models::workflow::{MAX_ROUNDS, MIN_ROUNDS};

/// Project-local configuration directory.
pub const CONFIG_DIR: &str = ".reportloop";

/// Environment variable prefix; nested keys are split on `__`.
pub const ENV_PREFIX: &str = "REPORTLOOP_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid verification_rounds: {0}. Must be between 1 and 5")]
    InvalidVerificationRounds(u32),

    #[error("Invalid rate limit: {0}. Must be positive")]
    InvalidRateLimit(f64),

    #[error("Invalid burst_size: {0}. Must be at least 1")]
    InvalidBurstSize(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Azure provider requires oracle.azure_endpoint")]
    MissingAzureEndpoint,

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .reportloop/config.yaml
    /// 3. .reportloop/local.yaml (optional overrides)
    /// 4. Environment variables (REPORTLOOP_* prefix)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment()
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring environment overrides.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(format!("{CONFIG_DIR}/config.yaml")))
            .merge(Yaml::file(format!("{CONFIG_DIR}/local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading.
    ///
    /// A missing API key is not an error here; the oracle adapter reports it
    /// when it is actually constructed.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let rounds = config.engine.verification_rounds;
        if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&rounds) {
            return Err(ConfigError::InvalidVerificationRounds(rounds));
        }

        if config.engine.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "engine.output_dir cannot be empty".to_string(),
            ));
        }

        if config.oracle.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "oracle.model cannot be empty".to_string(),
            ));
        }

        if config.oracle.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.oracle.timeout_secs));
        }

        if config.oracle.provider == OracleProvider::Azure
            && config
                .oracle
                .azure_endpoint
                .as_deref()
                .is_none_or(str::is_empty)
        {
            return Err(ConfigError::MissingAzureEndpoint);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        if config.rate_limit.requests_per_second <= 0.0 {
            return Err(ConfigError::InvalidRateLimit(
                config.rate_limit.requests_per_second,
            ));
        }

        if config.rate_limit.burst_size == 0 {
            return Err(ConfigError::InvalidBurstSize(config.rate_limit.burst_size));
        }

        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        Ok(())
    }
}
