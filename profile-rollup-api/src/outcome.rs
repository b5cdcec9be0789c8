//! Result handed back to the workflow host

use serde::Serialize;
use std::fmt::Display;

pub const SUCCESS_PORT: &str = "UploadSuccess";
pub const ERROR_PORT: &str = "UploadError";

pub const SUCCESS_MESSAGE: &str = "JSON data uploaded to S3.";

/// Exactly one of the two output ports, with its value
///
/// Serializes as `{"port": "UploadSuccess", "value": {"message": ...}}` or
/// `{"port": "UploadError", "value": {"error": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "port", content = "value")]
pub enum ActionResult {
    #[serde(rename = "UploadSuccess")]
    Success { message: String },
    #[serde(rename = "UploadError")]
    Error { error: String },
}

impl ActionResult {
    pub fn success() -> Self {
        Self::Success {
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    /// Wrap an underlying failure
    pub fn error(cause: impl Display) -> Self {
        Self::Error {
            error: format!("S3 upload error: {cause}"),
        }
    }

    pub fn port(&self) -> &'static str {
        match self {
            Self::Success { .. } => SUCCESS_PORT,
            Self::Error { .. } => ERROR_PORT,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
