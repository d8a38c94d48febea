//! Error types for store calls.
//!
//! Every call ends in exactly one `Result`. The error variants fall into the
//! following categories:
//!
//! | Category | Variants | When |
//! |----------|----------|------|
//! | Validation | `Validation` | validator rejected the model; no driver call was made |
//! | Driver | `Driver` | the driver failed, possibly mid-pagination |
//! | Projection | `Projection` | an output builder failed while shaping a response |
//! | Paging | `PageCallback` | a page consumer asked to stop |
//! | Input | `UnknownOperation`, `InvalidOptions`, `InvalidTemplate` | bad call or definition |
//! | Setup | `Config` | store configuration could not be loaded |
//!
//! Nothing is retried here; retry and backoff belong to the driver.

use dynochamber_core::{BoxError, ValidationFailure};

use crate::driver::DriverError;

/// Store call errors.
///
/// # Example
///
/// ```ignore
/// match store.call("addMovie", &model).await {
///     Ok(result) => { /* handle success */ }
///     Err(Error::Validation(failure)) => {
///         println!("rejected: {}", failure.message);
///     }
///     Err(Error::Driver(e)) if e.code == "ConditionalCheckFailedException" => {
///         println!("condition failed");
///     }
///     Err(e) => println!("error: {}", e),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ==================== Validation ====================
    /// The template's validator rejected the sanitized model
    #[error("validation failed: {0}")]
    Validation(ValidationFailure),

    // ==================== Driver ====================
    /// The driver reported an error
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    // ==================== Shaping ====================
    /// An output builder failed
    #[error("output builder failed: {0}")]
    Projection(#[source] BoxError),

    /// A page callback failed
    #[error("page callback failed: {0}")]
    PageCallback(#[source] BoxError),

    // ==================== Input ====================
    /// No operation registered under this name
    #[error("unknown operation: {name}")]
    UnknownOperation {
        /// Requested operation name
        name: String,
    },

    /// Call options could not be understood
    #[error("invalid options: {reason}")]
    InvalidOptions {
        /// What was wrong
        reason: String,
    },

    /// A template definition is malformed
    #[error("invalid template: {reason}")]
    InvalidTemplate {
        /// What was wrong
        reason: String,
    },

    // ==================== Setup ====================
    /// Store configuration could not be read or parsed
    #[error("config error: {reason}")]
    Config {
        /// What was wrong
        reason: String,
    },
}

impl Error {
    /// Whether the error happened before any driver call was issued.
    pub fn is_pre_dispatch(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::UnknownOperation { .. }
                | Error::InvalidOptions { .. }
                | Error::InvalidTemplate { .. }
                | Error::Config { .. }
        )
    }
}
