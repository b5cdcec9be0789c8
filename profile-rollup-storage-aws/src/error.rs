//! Error types for the S3 backend

use thiserror::Error;

/// Errors building an S3 store
#[derive(Debug, Error)]
pub enum AwsStorageError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Missing region configuration
    #[error("Missing AWS region configuration")]
    MissingRegion,
}

impl AwsStorageError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Result type for S3 backend setup
pub type Result<T> = std::result::Result<T, AwsStorageError>;

impl From<AwsStorageError> for profile_rollup_core::RollupError {
    fn from(err: AwsStorageError) -> Self {
        profile_rollup_core::RollupError::config(err.to_string())
    }
}
