use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure for reportloop
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Convergence engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Content-generation oracle settings
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Recording transcription settings
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Retry policy configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Which rendering of the orchestration machine drives a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    Loop,
    #[default]
    Graph,
}

impl DriverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loop => "loop",
            Self::Graph => "graph",
        }
    }
}

impl std::str::FromStr for DriverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "loop" => Ok(Self::Loop),
            "graph" => Ok(Self::Graph),
            other => Err(format!("unknown driver '{other}', expected loop or graph")),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Maximum verification rounds (1-5)
    #[serde(default = "default_verification_rounds")]
    pub verification_rounds: u32,

    /// Orchestration driver: loop or graph
    #[serde(default)]
    pub driver: DriverKind,

    /// Directory for transcripts and finished reports
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Revise independent sections concurrently
    #[serde(default)]
    pub parallel_sections: bool,

    /// Include the sample report as a format reference during verification
    #[serde(default = "default_true")]
    pub include_sample_report: bool,
}

const fn default_verification_rounds() -> u32 {
    5
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".reportloop/output")
}

const fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            verification_rounds: default_verification_rounds(),
            driver: DriverKind::default(),
            output_dir: default_output_dir(),
            parallel_sections: false,
            include_sample_report: default_true(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleProvider {
    #[default]
    Openai,
    Azure,
    Mock,
}

/// Oracle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OracleConfig {
    #[serde(default)]
    pub provider: OracleProvider,

    /// Model name or friendly alias
    #[serde(default = "default_model")]
    pub model: String,

    /// API key; falls back to `OPENAI_API_KEY` / `AZURE_API_KEY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL for OpenAI-compatible endpoints
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Azure resource endpoint, required for the azure provider
    #[serde(default)]
    pub azure_endpoint: Option<String>,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Token ceiling for reasoning models
    #[serde(default = "default_max_completion_tokens")]
    pub max_completion_tokens: u32,

    #[serde(default = "default_low")]
    pub reasoning_effort: String,

    #[serde(default = "default_low")]
    pub verbosity: String,
}

fn default_model() -> String {
    "gpt-4.1".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_version() -> String {
    "2025-03-01-preview".to_string()
}

const fn default_timeout_secs() -> u64 {
    300
}

const fn default_max_completion_tokens() -> u32 {
    4000
}

fn default_low() -> String {
    "low".to_string()
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: OracleProvider::default(),
            model: default_model(),
            api_key: None,
            base_url: default_base_url(),
            azure_endpoint: None,
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
            max_completion_tokens: default_max_completion_tokens(),
            reasoning_effort: default_low(),
            verbosity: default_low(),
        }
    }
}

impl OracleConfig {
    /// Resolve friendly aliases to dated model identifiers.
    pub fn resolved_model(&self) -> String {
        match self.model.as_str() {
            "gpt-4.1" => "gpt-4.1-2025-04-14".to_string(),
            "gpt-5.1" => "gpt-5-2025-08-07".to_string(),
            "gpt-5.2" => "gpt-5.2-2025-12-11".to_string(),
            other => other.to_string(),
        }
    }

    /// Reasoning models take completion-token, effort and verbosity
    /// parameters instead of a temperature.
    pub fn is_reasoning_model(&self) -> bool {
        self.resolved_model().starts_with("gpt-5")
    }

    /// Configured key, or the provider's conventional environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key.clone().filter(|k| !k.is_empty()).or_else(|| {
            let var = match self.provider {
                OracleProvider::Azure => "AZURE_API_KEY",
                _ => "OPENAI_API_KEY",
            };
            std::env::var(var).ok().filter(|k| !k.is_empty())
        })
    }
}

/// Transcription configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TranscriptionConfig {
    #[serde(default = "default_transcription_model")]
    pub model: String,

    /// ISO-639-1 language hint
    #[serde(default)]
    pub language: Option<String>,
}

fn default_transcription_model() -> String {
    "whisper-1".to_string()
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: default_transcription_model(),
            language: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,

    /// Number of days to retain logs
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

const fn default_retention_days() -> u32 {
    30
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
            retention_days: default_retention_days(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RateLimitConfig {
    /// Oracle requests per second allowed
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// Burst size for token bucket
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

const fn default_requests_per_second() -> f64 {
    2.0
}

const fn default_burst_size() -> u32 {
    4
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    1000
}

const fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}
