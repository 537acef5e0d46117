//! Error types for sheetnest.

use thiserror::Error;

/// Result type alias for sheetnest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while ingesting parts or building solver/cost configurations.
///
/// Nesting and cost allocation themselves never fail: degenerate outcomes are
/// reported as data inside [`crate::NestingResult`].
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid part geometry provided.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Invalid stock sheet definition.
    #[error("Invalid sheet: {0}")]
    InvalidSheet(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// No rate is known for the requested material/thickness.
    #[error("No rate for {0}")]
    MissingRate(String),
}
