//! S3 object store implementation
//!
//! Provides `S3Store` which implements [`ObjectStore`] over a single bucket.
//!
//! ## Conditional writes
//!
//! `PutCondition::IfAbsent` and `PutCondition::IfMatch` map to the
//! `If-None-Match: *` and `If-Match` headers on `PutObject`. A 412 (or a 409
//! from a concurrent conditional write) comes back as
//! `PutOutcome::PreconditionFailed`.
//!
//! ## Timeout Configuration
//!
//! The `timeout_ms` setting controls the total operation timeout, which
//! **includes SDK retry time**.

pub mod keys;

use crate::error::{AwsStorageError, Result};
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use aws_smithy_types::retry::RetryConfig;
use aws_smithy_types::timeout::TimeoutConfig;
use keys::{from_s3_key, list_prefix, normalize_etag, quote_etag, required_etag, to_s3_key};
use profile_rollup_core::{
    ObjectStore, PutCondition, PutOutcome, StoreError, StoreResult, StoredObject,
};
use std::fmt::Debug;
use std::time::Duration;

/// Access key pair supplied by the host
#[derive(Clone)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl StaticCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }
}

impl Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Region used when neither the caller nor the environment names one
pub const FALLBACK_REGION: &str = "us-east-1";

/// Load AWS SDK configuration
///
/// Explicit credentials and region override whatever the default provider
/// chain (environment, profile, IMDS) would resolve.
pub async fn load_sdk_config(
    credentials: Option<StaticCredentials>,
    region: Option<String>,
) -> aws_config::SdkConfig {
    let region = RegionProviderChain::first_try(region.map(Region::new))
        .or_default_provider()
        .or_else(Region::new(FALLBACK_REGION));
    let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);
    if let Some(creds) = credentials {
        loader = loader.credentials_provider(Credentials::new(
            creds.access_key_id,
            creds.secret_access_key,
            None,
            None,
            "profile-rollup",
        ));
    }
    loader.load().await
}

/// S3 store configuration
#[derive(Debug, Clone, Default)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,
    /// Optional key prefix inside the bucket
    pub prefix: Option<String>,
    /// Optional endpoint override (e.g. LocalStack/MinIO); enables path-style addressing
    pub endpoint: Option<String>,
    /// Operation timeout in milliseconds (optional)
    pub timeout_ms: Option<u64>,
    /// SDK retries *after* the initial attempt
    pub max_retries: Option<u32>,
    /// Initial backoff for retries in milliseconds (randomized with jitter by SDK)
    pub retry_base_delay_ms: Option<u64>,
    /// Max backoff for retries in milliseconds
    pub retry_max_delay_ms: Option<u64>,
}

/// S3-backed object store for one bucket
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
    prefix: Option<String>,
}

impl Debug for S3Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Store")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl S3Store {
    /// Create a new S3 store
    ///
    /// # Arguments
    ///
    /// * `sdk_config` - AWS SDK configuration (from [`load_sdk_config`])
    /// * `config` - bucket, prefix, endpoint, retry and timeout overrides
    pub fn new(sdk_config: &aws_config::SdkConfig, config: S3Config) -> Result<Self> {
        if config.bucket.trim().is_empty() {
            return Err(AwsStorageError::invalid_config("bucket name is empty"));
        }
        if sdk_config.region().is_none() {
            return Err(AwsStorageError::MissingRegion);
        }

        // Inherit HTTP client, retry config, sleep impl, etc. from SdkConfig
        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        if config.max_retries.is_some()
            || config.retry_base_delay_ms.is_some()
            || config.retry_max_delay_ms.is_some()
        {
            // AWS SDK uses "max attempts" = initial attempt + retries
            let max_attempts = config.max_retries.unwrap_or(0).saturating_add(1).max(1);

            let mut retry_config = RetryConfig::standard().with_max_attempts(max_attempts);
            if let Some(ms) = config.retry_base_delay_ms {
                retry_config = retry_config.with_initial_backoff(Duration::from_millis(ms));
            }
            if let Some(ms) = config.retry_max_delay_ms {
                retry_config = retry_config.with_max_backoff(Duration::from_millis(ms));
            }
            builder = builder.retry_config(retry_config);
        }

        if let Some(timeout_ms) = config.timeout_ms {
            let timeout_config = TimeoutConfig::builder()
                .operation_timeout(Duration::from_millis(timeout_ms))
                .build();
            builder = builder.timeout_config(timeout_config);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket,
            prefix: config.prefix,
        })
    }

    /// Create an S3Store from a pre-built client (for testing)
    pub fn from_client(client: Client, bucket: String, prefix: Option<String>) -> Self {
        Self {
            client,
            bucket,
            prefix,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    fn s3_key(&self, key: &str) -> String {
        to_s3_key(key, self.prefix.as_deref())
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn container(&self) -> &str {
        &self.bucket
    }

    async fn list_keys(&self) -> StoreResult<Vec<String>> {
        let prefix = list_prefix(self.prefix.as_deref());
        let mut keys = Vec::new();
        let mut continuation_token = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(&self.bucket);
            if let Some(p) = &prefix {
                request = request.prefix(p);
            }
            if let Some(token) = continuation_token.take() {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| map_s3_error(e, prefix.as_deref().unwrap_or(&self.bucket)))?;

            keys.extend(
                response
                    .contents()
                    .iter()
                    .filter_map(|obj| obj.key())
                    .filter_map(|k| from_s3_key(k, self.prefix.as_deref()))
                    .map(str::to_string),
            );

            match response.next_continuation_token() {
                Some(token) => continuation_token = Some(token.to_string()),
                None => break,
            }
        }

        tracing::debug!(bucket = %self.bucket, count = keys.len(), "listed bucket");
        Ok(keys)
    }

    async fn get(&self, key: &str) -> StoreResult<Option<StoredObject>> {
        let s3_key = self.s3_key(key);

        let response = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&s3_key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if is_status(&e, 404) => return Ok(None),
            Err(e) => return Err(map_s3_error(e, &s3_key)),
        };

        let etag = required_etag(response.e_tag(), &s3_key)?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StoreError::io(format!("Failed to read S3 body for '{}': {}", s3_key, e)))?
            .into_bytes()
            .to_vec();

        Ok(Some(StoredObject { bytes, etag }))
    }

    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        condition: PutCondition,
    ) -> StoreResult<PutOutcome> {
        let s3_key = self.s3_key(key);

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&s3_key)
            .content_type("application/json")
            .body(ByteStream::from(bytes.to_vec()));

        request = match &condition {
            PutCondition::Unconditional => request,
            PutCondition::IfAbsent => request.if_none_match("*"),
            PutCondition::IfMatch(etag) => request.if_match(quote_etag(etag)),
        };

        match request.send().await {
            Ok(output) => Ok(PutOutcome::Written {
                etag: output.e_tag().map(normalize_etag).unwrap_or_default(),
            }),
            // 409 is returned when a concurrent conditional write is in flight
            Err(e)
                if condition != PutCondition::Unconditional
                    && (is_status(&e, 412) || is_status(&e, 409)) =>
            {
                tracing::debug!(key = %s3_key, ?condition, "conditional put rejected");
                Ok(PutOutcome::PreconditionFailed)
            }
            Err(e) => Err(map_s3_error(e, &s3_key)),
        }
    }
}

// Error mapping helpers

/// Check the HTTP status of a service error response
fn is_status<E: std::fmt::Debug>(err: &aws_sdk_s3::error::SdkError<E>, status: u16) -> bool {
    use aws_sdk_s3::error::SdkError;

    match err {
        SdkError::ServiceError(service_err) => service_err.raw().status().as_u16() == status,
        _ => false,
    }
}

/// Map an SDK error to StoreError with HTTP status classification
fn map_s3_error<E: std::fmt::Debug>(err: aws_sdk_s3::error::SdkError<E>, key: &str) -> StoreError {
    use aws_sdk_s3::error::SdkError;

    match &err {
        SdkError::ServiceError(service_err) => {
            status_error(service_err.raw().status().as_u16(), key, &err)
        }
        SdkError::TimeoutError(_) => {
            StoreError::io(format!("S3 timeout for key '{}': {:?}", key, err))
        }
        SdkError::DispatchFailure(_) => {
            StoreError::io(format!("S3 connection error for key '{}': {:?}", key, err))
        }
        _ => StoreError::other(format!("S3 error for key '{}': {:?}", key, err)),
    }
}

/// Classify an S3 service response by HTTP status
///
/// 429 and 503 (`SlowDown`) are rate limiting; other 5xx are server errors.
/// Both reach us only after the SDK's own retries ran out.
fn status_error(status: u16, key: &str, detail: &dyn std::fmt::Debug) -> StoreError {
    match status {
        404 => StoreError::not_found(format!("Key not found: {}", key)),
        401 => StoreError::unauthorized(format!("Unauthorized for key: {}", key)),
        403 => StoreError::forbidden(format!("Access denied for key: {}", key)),
        429 | 503 => StoreError::throttled(format!(
            "Rate limited on key '{}' (HTTP {})",
            key, status
        )),
        500..=599 => StoreError::io(format!(
            "S3 server error for key '{}' (HTTP {})",
            key, status
        )),
        _ => StoreError::io(format!(
            "S3 error for key '{}' (HTTP {}): {:?}",
            key, status, detail
        )),
    }
}
