//! Content-generation oracle adapters.

pub mod mock;
pub mod openai_api;

use std::sync::Arc;

pub use mock::{MockOracle, MockResponse};
pub use openai_api::OpenAiOracle;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Config, OracleProvider};
use crate::domain::ports::ContentOracle;

/// Build the oracle selected by `config.oracle.provider`.
pub fn build_oracle(config: &Config) -> DomainResult<Arc<dyn ContentOracle>> {
    match config.oracle.provider {
        OracleProvider::Mock => Ok(Arc::new(MockOracle::new())),
        OracleProvider::Openai | OracleProvider::Azure => Ok(Arc::new(OpenAiOracle::new(
            config.oracle.clone(),
            &config.rate_limit,
            config.retry.clone(),
        )?)),
    }
}
