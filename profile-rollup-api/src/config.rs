//! Host-supplied configuration
//!
//! The host passes the action's init map as JSON:
//!
//! ```json
//! {
//!   "aws_access_key_id": "AKIA...",
//!   "aws_secret_access_key": "...",
//!   "s3_bucket": "profile-aggregates",
//!   "region": "eu-west-1",
//!   "probe": "fetch",
//!   "write_policy": {"mode": "conditional", "max_attempts": 5}
//! }
//! ```
//!
//! Only the credentials and bucket are required.

use crate::flow::{FlowSettings, WritePolicy};
use profile_rollup_core::{Result, RollupError};
use serde::Deserialize;
use serde_json::Value;

#[derive(Clone, Deserialize)]
pub struct UploaderConfig {
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub s3_bucket: String,
    /// AWS region; falls back to the SDK's provider chain
    #[serde(default)]
    pub region: Option<String>,
    /// Endpoint override (LocalStack/MinIO)
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Key prefix inside the bucket
    #[serde(default)]
    pub prefix: Option<String>,
    /// Operation timeout in milliseconds, including SDK retries
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(flatten)]
    pub flow: FlowSettings,
}

impl std::fmt::Debug for UploaderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploaderConfig")
            .field("aws_access_key_id", &self.aws_access_key_id)
            .field("aws_secret_access_key", &"<redacted>")
            .field("s3_bucket", &self.s3_bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("prefix", &self.prefix)
            .field("timeout_ms", &self.timeout_ms)
            .field("flow", &self.flow)
            .finish()
    }
}

impl UploaderConfig {
    /// Parse and validate the host's init map
    pub fn from_value(init: Value) -> Result<Self> {
        let config: Self = serde_json::from_value(init)
            .map_err(|e| RollupError::config(format!("invalid uploader configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check required fields are present
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("aws_access_key_id", &self.aws_access_key_id),
            ("aws_secret_access_key", &self.aws_secret_access_key),
            ("s3_bucket", &self.s3_bucket),
        ] {
            if value.trim().is_empty() {
                return Err(RollupError::config(format!("'{name}' must not be empty")));
            }
        }
        if let WritePolicy::Conditional { max_attempts: 0 } = self.flow.write_policy {
            return Err(RollupError::config(
                "'write_policy.max_attempts' must be at least 1",
            ));
        }
        Ok(())
    }
}
