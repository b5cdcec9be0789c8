//! Object store seam
//!
//! The aggregation flow needs three operations from its store:
//!
//! - list every key in the container (existence probing)
//! - download an object with its ETag
//! - upload bytes under a key, optionally guarded by an ETag precondition
//!
//! [`MemoryStore`] implements the same contract in memory for tests and dry
//! runs. The S3 backend lives in `profile-rollup-storage-aws`.

use async_trait::async_trait;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;

/// Errors reported by an object store backend
///
/// - `Unauthorized`/`Forbidden` are credential problems and are surfaced to
///   the host unchanged
/// - `Throttled` is rate limiting (HTTP 429/503) that outlasted the SDK's
///   retries; other server errors are `Io`
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O or network error
    #[error("I/O error: {0}")]
    Io(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unauthorized - invalid credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden - insufficient permissions
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Throttled - rate limited (HTTP 429/503)
    #[error("Throttled: {0}")]
    Throttled(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl StoreError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn throttled(msg: impl Into<String>) -> Self {
        Self::Throttled(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Credential or permission failure
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::Forbidden(_))
    }
}

/// Result type for object store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A downloaded object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    /// Normalized (unquoted) ETag of the version that was read
    pub etag: String,
}

/// Precondition attached to an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutCondition {
    /// Overwrite whatever is at the key
    Unconditional,
    /// Write only if nothing exists at the key (`If-None-Match: *`)
    IfAbsent,
    /// Write only if the current ETag matches (`If-Match: <etag>`)
    IfMatch(String),
}

/// Result of an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    Written { etag: String },
    /// The precondition did not hold; nothing was written
    PreconditionFailed,
}

/// Minimal object store used by the aggregation flow
#[async_trait]
pub trait ObjectStore: Debug + Send + Sync {
    /// Container (bucket) name, for logging
    fn container(&self) -> &str;

    /// Every key currently listed in the container
    ///
    /// Backends follow continuation tokens until the listing is exhausted.
    async fn list_keys(&self) -> StoreResult<Vec<String>>;

    /// Download an object
    ///
    /// Returns `Ok(None)` if nothing exists at `key`.
    async fn get(&self, key: &str) -> StoreResult<Option<StoredObject>>;

    /// Upload `bytes` under `key`
    async fn put(&self, key: &str, bytes: &[u8], condition: PutCondition)
        -> StoreResult<PutOutcome>;
}

#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for Arc<T> {
    fn container(&self) -> &str {
        (**self).container()
    }

    async fn list_keys(&self) -> StoreResult<Vec<String>> {
        (**self).list_keys().await
    }

    async fn get(&self, key: &str) -> StoreResult<Option<StoredObject>> {
        (**self).get(key).await
    }

    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        condition: PutCondition,
    ) -> StoreResult<PutOutcome> {
        (**self).put(key, bytes, condition).await
    }
}

/// In-memory object store
///
/// Objects live in a `BTreeMap` behind `Arc<RwLock<...>>`, so clones share
/// state and listings come back in lexicographic order like S3. ETags are the
/// hex SHA-256 of the content.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    container: String,
    objects: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

impl MemoryStore {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            objects: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Store `bytes` at `key` directly, bypassing preconditions
    pub fn insert(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.objects.write().insert(key.into(), bytes.into());
    }

    /// Current content at `key`
    pub fn read(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

fn content_etag(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn container(&self) -> &str {
        &self.container
    }

    async fn list_keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.objects.read().keys().cloned().collect())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<StoredObject>> {
        Ok(self.objects.read().get(key).map(|bytes| StoredObject {
            etag: content_etag(bytes),
            bytes: bytes.clone(),
        }))
    }

    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        condition: PutCondition,
    ) -> StoreResult<PutOutcome> {
        let mut objects = self.objects.write();
        let holds = match (&condition, objects.get(key)) {
            (PutCondition::Unconditional, _) => true,
            (PutCondition::IfAbsent, current) => current.is_none(),
            (PutCondition::IfMatch(expected), Some(current)) => {
                content_etag(current) == *expected
            }
            (PutCondition::IfMatch(_), None) => false,
        };
        if !holds {
            tracing::debug!(key, ?condition, "precondition failed");
            return Ok(PutOutcome::PreconditionFailed);
        }
        objects.insert(key.to_string(), bytes.to_vec());
        Ok(PutOutcome::Written {
            etag: content_etag(bytes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = MemoryStore::new("bucket");
        assert!(store.get("nope.json").await.unwrap().is_none());
        assert_eq!(store.container(), "bucket");
    }

    #[tokio::test]
    async fn test_unconditional_put_overwrites() {
        let store = MemoryStore::default();
        store.put("k", b"one", PutCondition::Unconditional).await.unwrap();
        store.put("k", b"two", PutCondition::Unconditional).await.unwrap();
        assert_eq!(store.read("k").unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_if_absent() {
        let store = MemoryStore::default();
        let first = store.put("k", b"one", PutCondition::IfAbsent).await.unwrap();
        assert!(matches!(first, PutOutcome::Written { .. }));
        let second = store.put("k", b"two", PutCondition::IfAbsent).await.unwrap();
        assert_eq!(second, PutOutcome::PreconditionFailed);
        assert_eq!(store.read("k").unwrap(), b"one");
    }

    #[tokio::test]
    async fn test_if_match_uses_etag_from_get() {
        let store = MemoryStore::default();
        store.insert("k", b"v1".to_vec());
        let current = store.get("k").await.unwrap().unwrap();

        let stale = PutCondition::IfMatch("deadbeef".into());
        assert_eq!(
            store.put("k", b"v2", stale).await.unwrap(),
            PutOutcome::PreconditionFailed
        );

        let fresh = PutCondition::IfMatch(current.etag);
        let written = store.put("k", b"v2", fresh).await.unwrap();
        assert_eq!(
            written,
            PutOutcome::Written {
                etag: content_etag(b"v2")
            }
        );
    }

    #[tokio::test]
    async fn test_if_match_on_missing_key_fails() {
        let store = MemoryStore::default();
        let outcome = store
            .put("k", b"v", PutCondition::IfMatch("x".into()))
            .await
            .unwrap();
        assert_eq!(outcome, PutOutcome::PreconditionFailed);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_list_keys_sorted() {
        let store = MemoryStore::default();
        store.insert("b", b"".to_vec());
        store.insert("a", b"".to_vec());
        assert_eq!(store.list_keys().await.unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_store_error_auth_classification() {
        assert!(StoreError::unauthorized("x").is_auth());
        assert!(StoreError::forbidden("x").is_auth());
        assert!(!StoreError::io("x").is_auth());
        assert!(!StoreError::not_found("x").is_auth());
    }
}
