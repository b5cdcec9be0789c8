//! S3-backed uploader construction

use crate::config::UploaderConfig;
use crate::uploader::Uploader;
use profile_rollup_core::Result;
use profile_rollup_storage_aws::{load_sdk_config, S3Config, S3Store, StaticCredentials};
use tracing::info;

/// Uploader writing to an S3 bucket
pub type S3Uploader = Uploader<S3Store>;

impl UploaderConfig {
    pub fn credentials(&self) -> StaticCredentials {
        StaticCredentials::new(&self.aws_access_key_id, &self.aws_secret_access_key)
    }

    pub fn s3_config(&self) -> S3Config {
        S3Config {
            bucket: self.s3_bucket.clone(),
            prefix: self.prefix.clone(),
            endpoint: self.endpoint.clone(),
            timeout_ms: self.timeout_ms,
            ..Default::default()
        }
    }
}

impl Uploader<S3Store> {
    /// Validate `config` and connect to its bucket
    pub async fn set_up(config: UploaderConfig) -> Result<Self> {
        config.validate()?;
        let sdk_config = load_sdk_config(Some(config.credentials()), config.region.clone()).await;
        let store = S3Store::new(&sdk_config, config.s3_config())?;
        info!(
            bucket = %config.s3_bucket,
            region = ?sdk_config.region(),
            probe = ?config.flow.probe,
            write_policy = ?config.flow.write_policy,
            "configured S3 uploader"
        );
        Ok(Self::new(store, config.flow))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use profile_rollup_core::RollupError;
    use serde_json::json;

    fn config() -> UploaderConfig {
        UploaderConfig::from_value(json!({
            "aws_access_key_id": "AKIAEXAMPLE",
            "aws_secret_access_key": "very-secret",
            "s3_bucket": "aggregates",
            "prefix": "daily",
            "timeout_ms": 2000
        }))
        .unwrap()
    }

    #[test]
    fn test_s3_config_mapping() {
        let s3 = config().s3_config();
        assert_eq!(s3.bucket, "aggregates");
        assert_eq!(s3.prefix.as_deref(), Some("daily"));
        assert_eq!(s3.timeout_ms, Some(2000));
        assert!(s3.endpoint.is_none());
    }

    #[tokio::test]
    async fn test_set_up_connects_without_io() {
        let mut config = config();
        config.region = Some("eu-west-1".into());
        let uploader = S3Uploader::set_up(config).await.unwrap();
        assert_eq!(uploader.store().bucket(), "aggregates");
        assert_eq!(uploader.store().prefix(), Some("daily"));
    }

    #[tokio::test]
    async fn test_set_up_rejects_invalid_config() {
        let mut config = config();
        config.s3_bucket = String::new();
        let err = S3Uploader::set_up(config).await.unwrap_err();
        assert!(matches!(err, RollupError::Config(_)));
    }
}
