//! Amazon S3 backend for profile-rollup
//!
//! Provides [`S3Store`], an [`ObjectStore`] over one bucket, with an optional
//! key prefix and endpoint override (LocalStack/MinIO).
//!
//! ## Usage
//!
//! ```ignore
//! use profile_rollup_storage_aws::{load_sdk_config, S3Config, S3Store, StaticCredentials};
//!
//! let credentials = StaticCredentials::new("AKIA...", "secret");
//! let sdk_config = load_sdk_config(Some(credentials), Some("eu-west-1".into())).await;
//! let store = S3Store::new(&sdk_config, S3Config {
//!     bucket: "profile-aggregates".to_string(),
//!     ..Default::default()
//! })?;
//! ```

pub mod error;
pub mod s3;

pub use error::{AwsStorageError, Result};
pub use s3::{load_sdk_config, S3Config, S3Store, StaticCredentials, FALLBACK_REGION};

// Re-export the store seam for convenience
pub use profile_rollup_core::{ObjectStore, PutCondition, PutOutcome, StoreError, StoredObject};
