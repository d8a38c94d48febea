//! Error types for template and option parsing
//!
//! These errors arise while turning declarative data (template definitions,
//! serialized call options) into typed values. They never come from a driver.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the core crate
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// `_type` named something other than a known operation kind
    #[error("Unknown operation kind: {0}")]
    UnknownKind(String),

    /// Template definition is structurally invalid
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// Serialized call options could not be understood
    #[error("Invalid call options: {0}")]
    InvalidOptions(String),

    /// Template name registered twice
    #[error("Duplicate operation: {0}")]
    DuplicateOperation(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::InvalidOptions(e.to_string())
    }
}
