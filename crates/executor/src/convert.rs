//! Error conversion from core error types.
//!
//! Core errors come from parsing declarative input, so they map onto the
//! input and setup categories of the executor's [`Error`].

use dynochamber_core::Error as CoreError;

use crate::Error;

impl From<CoreError> for Error {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidOptions(reason) => Error::InvalidOptions { reason },
            CoreError::UnknownKind(kind) => Error::InvalidTemplate {
                reason: format!("unknown operation kind {}", kind),
            },
            CoreError::InvalidTemplate(reason) => Error::InvalidTemplate { reason },
            CoreError::DuplicateOperation(name) => Error::InvalidTemplate {
                reason: format!("operation {} defined twice", name),
            },
        }
    }
}

/// Convert a core result into an executor result.
pub(crate) fn convert_result<T>(r: dynochamber_core::Result<T>) -> crate::Result<T> {
    r.map_err(Error::from)
}
