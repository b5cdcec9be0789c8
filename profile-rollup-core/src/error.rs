//! Error types for profile-rollup

use crate::document::DocumentError;
use crate::key::ObjectKey;
use crate::store::StoreError;
use thiserror::Error;

/// Errors raised while aggregating one invocation
#[derive(Debug, Error)]
pub enum RollupError {
    /// Inbound payload is missing a required field
    #[error("Invalid input: {0}")]
    Input(String),

    /// Object store read failed (listing, download, or probe/fetch race)
    #[error("Retrieval failed for '{key}': {message}")]
    Retrieval { key: String, message: String },

    /// Existing object does not parse as an aggregate document
    #[error("Corrupt document at '{key}': {source}")]
    CorruptDocument {
        key: String,
        #[source]
        source: DocumentError,
    },

    /// Object store write failed
    #[error("Write failed for '{key}': {message}")]
    Write { key: String, message: String },

    /// Conditional write kept losing to concurrent writers
    #[error("Write conflict for '{key}' after {attempts} attempts")]
    Conflict { key: String, attempts: u32 },

    /// Releasing transient buffers failed
    #[error("Cleanup failed: {0}")]
    Cleanup(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Transport or authentication error from the store client, unchanged
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RollupError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn cleanup(msg: impl Into<String>) -> Self {
        Self::Cleanup(msg.into())
    }

    pub fn corrupt_document(key: &ObjectKey, source: DocumentError) -> Self {
        Self::CorruptDocument {
            key: key.to_string(),
            source,
        }
    }

    /// Classify a store error raised while reading `key`
    ///
    /// Authentication failures pass through as [`RollupError::Store`];
    /// everything else becomes [`RollupError::Retrieval`].
    pub fn retrieval(key: &ObjectKey, err: StoreError) -> Self {
        if err.is_auth() {
            return Self::Store(err);
        }
        Self::Retrieval {
            key: key.to_string(),
            message: err.to_string(),
        }
    }

    /// Classify a store error raised while writing `key`
    pub fn write(key: &ObjectKey, err: StoreError) -> Self {
        if err.is_auth() {
            return Self::Store(err);
        }
        Self::Write {
            key: key.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for aggregation operations
pub type Result<T> = std::result::Result<T, RollupError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::DocumentKind;
    use chrono::NaiveDate;

    fn key() -> ObjectKey {
        ObjectKey::for_date(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            DocumentKind::Segments,
        )
    }

    #[test]
    fn test_auth_errors_pass_through_unchanged() {
        let err = RollupError::retrieval(&key(), StoreError::forbidden("denied"));
        assert!(matches!(err, RollupError::Store(StoreError::Forbidden(_))));

        let err = RollupError::write(&key(), StoreError::unauthorized("bad key"));
        assert!(matches!(err, RollupError::Store(StoreError::Unauthorized(_))));
    }

    #[test]
    fn test_transport_errors_are_classified() {
        let err = RollupError::retrieval(&key(), StoreError::io("reset"));
        assert!(matches!(err, RollupError::Retrieval { .. }));
        assert!(err.to_string().contains("2024-01-02_segments.json"));

        let err = RollupError::write(&key(), StoreError::throttled("slow down"));
        assert!(matches!(err, RollupError::Write { .. }));
    }
}
