//! Domain layer: report models, the scoring vocabulary and the ports the
//! orchestration engine talks through.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
