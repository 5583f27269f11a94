// src/models/error.rs
//! Failure taxonomy for document lifecycle operations.

use thiserror::Error;

use crate::storage::ledger_stub::StoreError;

/// Sentinel returned when an operation needs an existing key and none is present.
pub const NOT_FOUND_ERROR: &str = "NOT_FOUND_ERROR";

/// Sentinel returned when `registerDocument` targets an occupied key.
pub const ALREADY_EXIST_ERROR: &str = "ALREADY_EXIST_ERROR";

/// Errors surfaced to the caller of a contract operation.
///
/// Every variant maps to a stable [`code`](RegistryError::code) so callers can
/// branch without parsing messages. Nothing here is retried locally.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Malformed argument count or shape
    #[error("{0}")]
    Invalid(String),

    /// No value stored under the key
    #[error("no document registered under key '{0}'")]
    NotFound(String),

    /// A value is already stored under the key
    #[error("a document is already registered under key '{0}'")]
    AlreadyExists(String),

    /// The ledger rejected or failed a call
    #[error("ledger failure: {0}")]
    StoreFailure(#[from] StoreError),

    /// A patch or stored value is not valid JSON of the expected shape
    #[error("serialization failure: {0}")]
    SerializationFailure(String),
}

impl RegistryError {
    /// Machine-readable code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::Invalid(_) => "INVALID_ARGUMENT",
            RegistryError::NotFound(_) => NOT_FOUND_ERROR,
            RegistryError::AlreadyExists(_) => ALREADY_EXIST_ERROR,
            RegistryError::StoreFailure(_) => "STORE_FAILURE",
            RegistryError::SerializationFailure(_) => "SERIALIZATION_FAILURE",
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::SerializationFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(RegistryError::NotFound("k".into()).code(), "NOT_FOUND_ERROR");
        assert_eq!(RegistryError::AlreadyExists("k".into()).code(), "ALREADY_EXIST_ERROR");
        assert_eq!(RegistryError::Invalid("bad".into()).code(), "INVALID_ARGUMENT");
        assert_eq!(
            RegistryError::StoreFailure(StoreError::LockPoisoned).code(),
            "STORE_FAILURE"
        );
    }

    #[test]
    fn test_json_errors_become_serialization_failures() {
        let err: RegistryError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert_eq!(err.code(), "SERIALIZATION_FAILURE");
    }
}
