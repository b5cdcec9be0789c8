//! Shared test harness for profile-rollup-api integration tests.
//!
//! Wraps [`MemoryStore`] with the failure modes the S3 backend can show:
//! injected errors, a listing that lags behind writes, and a concurrent writer
//! that lands between our read and our write.

// Not every integration test crate uses every helper.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use profile_rollup_core::{
    merge, AggregateDocument, DocumentKind, MemoryStore, ObjectKey, ObjectStore, ProfileRecord,
    PutCondition, PutOutcome, StoreError, StoreResult, StoredObject,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

// =============================================================================
// Fixtures
// =============================================================================

pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
}

pub fn key(kind: DocumentKind) -> ObjectKey {
    ObjectKey::for_date(date(), kind)
}

/// Inbound payload in the host's shape
pub fn payload(uid: &str, segments: &[&str]) -> Value {
    json!({
        "traits": {"smi_uid": uid, "email": format!("{uid}@example.com")},
        "segments": segments,
    })
}

/// Parse the document currently stored at `kind`'s key
pub fn document(store: &MemoryStore, kind: DocumentKind) -> AggregateDocument {
    let bytes = store
        .read(key(kind).as_str())
        .unwrap_or_else(|| panic!("no {kind} document"));
    AggregateDocument::parse(&bytes).unwrap()
}

pub fn records(store: &MemoryStore, kind: DocumentKind) -> Vec<Value> {
    document(store, kind).records().to_vec()
}

// =============================================================================
// Fault injection
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub enum Fault {
    Io,
    Unauthorized,
    Forbidden,
}

impl Fault {
    fn error(self, op: &str) -> StoreError {
        match self {
            Fault::Io => StoreError::io(format!("{op}: connection reset")),
            Fault::Unauthorized => StoreError::unauthorized(format!("{op}: InvalidAccessKeyId")),
            Fault::Forbidden => StoreError::forbidden(format!("{op}: AccessDenied")),
        }
    }
}

/// Memory store that fails selected operations and counts every call
#[derive(Debug, Default)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    list: Option<Fault>,
    get: Option<Fault>,
    put: Option<Fault>,
    calls: AtomicUsize,
}

impl FaultyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn failing_list(mut self, fault: Fault) -> Self {
        self.list = Some(fault);
        self
    }

    pub fn failing_get(mut self, fault: Fault) -> Self {
        self.get = Some(fault);
        self
    }

    pub fn failing_put(mut self, fault: Fault) -> Self {
        self.put = Some(fault);
        self
    }

    /// Store operations attempted so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for FaultyStore {
    fn container(&self) -> &str {
        self.inner.container()
    }

    async fn list_keys(&self) -> StoreResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.list {
            Some(fault) => Err(fault.error("ListObjectsV2")),
            None => self.inner.list_keys().await,
        }
    }

    async fn get(&self, key: &str) -> StoreResult<Option<StoredObject>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.get {
            Some(fault) => Err(fault.error("GetObject")),
            None => self.inner.get(key).await,
        }
    }

    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        condition: PutCondition,
    ) -> StoreResult<PutOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.put {
            Some(fault) => Err(fault.error("PutObject")),
            None => self.inner.put(key, bytes, condition).await,
        }
    }
}

// =============================================================================
// Eventually consistent listing
// =============================================================================

/// Memory store whose listing has not caught up with some writes yet
#[derive(Debug)]
pub struct StaleListingStore {
    pub inner: MemoryStore,
    hidden: Vec<String>,
}

impl StaleListingStore {
    pub fn hiding(inner: MemoryStore, hidden: &[&ObjectKey]) -> Self {
        Self {
            inner,
            hidden: hidden.iter().map(|k| k.to_string()).collect(),
        }
    }
}

#[async_trait]
impl ObjectStore for StaleListingStore {
    fn container(&self) -> &str {
        self.inner.container()
    }

    async fn list_keys(&self) -> StoreResult<Vec<String>> {
        let keys = self.inner.list_keys().await?;
        Ok(keys
            .into_iter()
            .filter(|k| !self.hidden.contains(k))
            .collect())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<StoredObject>> {
        self.inner.get(key).await
    }

    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        condition: PutCondition,
    ) -> StoreResult<PutOutcome> {
        self.inner.put(key, bytes, condition).await
    }
}

// =============================================================================
// Concurrent writer
// =============================================================================

/// Memory store where another invocation appends its record right after our
/// first read of `key`
///
/// The caller gets the pre-append snapshot, so its follow-up write races the
/// other invocation's.
#[derive(Debug)]
pub struct InterleavingStore {
    pub inner: MemoryStore,
    key: String,
    intruder: Mutex<Option<ProfileRecord>>,
}

impl InterleavingStore {
    pub fn new(inner: MemoryStore, key: &ObjectKey, intruder: ProfileRecord) -> Self {
        Self {
            inner,
            key: key.to_string(),
            intruder: Mutex::new(Some(intruder)),
        }
    }

    /// Whether the concurrent append has happened
    pub fn intruded(&self) -> bool {
        self.intruder.lock().unwrap().is_none()
    }
}

#[async_trait]
impl ObjectStore for InterleavingStore {
    fn container(&self) -> &str {
        self.inner.container()
    }

    async fn list_keys(&self) -> StoreResult<Vec<String>> {
        self.inner.list_keys().await
    }

    async fn get(&self, key: &str) -> StoreResult<Option<StoredObject>> {
        let snapshot = self.inner.get(key).await?;
        if key == self.key {
            let intruder = self.intruder.lock().unwrap().take();
            if let Some(record) = intruder {
                let prior = snapshot.as_ref().map(|o| o.bytes.as_slice());
                let merged = merge(prior, &record).unwrap();
                self.inner.insert(key, merged.to_bytes().unwrap());
            }
        }
        Ok(snapshot)
    }

    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        condition: PutCondition,
    ) -> StoreResult<PutOutcome> {
        self.inner.put(key, bytes, condition).await
    }
}
