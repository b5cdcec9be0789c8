//! Per-invocation orchestration

use crate::flow::{run_flow, FlowSettings};
use crate::outcome::ActionResult;
use crate::payload::InboundPayload;
use crate::report::{FlowStatus, InvocationReport};
use async_trait::async_trait;
use chrono::NaiveDate;
use profile_rollup_core::{DocumentKind, ObjectKey, ObjectStore, Reaper};
use serde_json::Value;
use tracing::{error, info, warn};

/// Seam between the workflow host and an action
#[async_trait]
pub trait ActionRunner: Send + Sync {
    /// Process one payload; never fails, errors come back as the error port
    async fn run(&self, payload: &Value) -> ActionResult;
}

/// Appends each payload to today's segments and metadata documents
#[derive(Debug, Clone)]
pub struct Uploader<S> {
    store: S,
    settings: FlowSettings,
}

impl<S: ObjectStore> Uploader<S> {
    pub fn new(store: S, settings: FlowSettings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &FlowSettings {
        &self.settings
    }

    /// Run one invocation against today's documents
    pub async fn run_report(&self, payload: &Value) -> InvocationReport {
        self.run_for_date(payload, self.settings.date_basis.today())
            .await
    }

    /// Run one invocation against the documents of `date`
    ///
    /// The payload is checked before any store I/O. Segments run first;
    /// metadata is skipped if segments failed. Transient buffers are released
    /// on every path.
    pub async fn run_for_date(&self, payload: &Value, date: NaiveDate) -> InvocationReport {
        let payload = match InboundPayload::from_value(payload) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "rejected payload");
                return InvocationReport::rejected(err);
            }
        };

        let mut reaper = Reaper::new();

        let segments = self
            .run_kind(DocumentKind::Segments, &payload, date, &mut reaper)
            .await;
        let metadata = if segments.is_written() {
            self.run_kind(DocumentKind::Metadata, &payload, date, &mut reaper)
                .await
        } else {
            FlowStatus::Skipped
        };

        let reaped = reaper.reap();
        InvocationReport::finish(segments, metadata, reaped)
    }

    async fn run_kind(
        &self,
        kind: DocumentKind,
        payload: &InboundPayload,
        date: NaiveDate,
        reaper: &mut Reaper,
    ) -> FlowStatus {
        let key = ObjectKey::for_date(date, kind);
        let record = payload.record(kind);
        let status = FlowStatus::from(
            run_flow(&self.store, &key, &record, &self.settings, reaper).await,
        );
        if let FlowStatus::Failed(err) = &status {
            error!(container = self.store.container(), key = %key, error = %err, "aggregation failed");
        }
        status
    }
}

#[async_trait]
impl<S: ObjectStore> ActionRunner for Uploader<S> {
    async fn run(&self, payload: &Value) -> ActionResult {
        let report = self.run_report(payload).await;
        let result = report.to_result();
        if result.is_success() {
            info!(
                container = self.store.container(),
                released_buffers = report.released_buffers.len(),
                "uploaded segments and metadata"
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use profile_rollup_core::{MemoryStore, RollupError};
    use serde_json::json;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    #[tokio::test]
    async fn test_both_documents_written() {
        let uploader = Uploader::new(MemoryStore::default(), FlowSettings::default());
        let report = uploader
            .run_for_date(
                &json!({"traits": {"smi_uid": "u1"}, "segments": ["vip"]}),
                date(),
            )
            .await;

        assert!(report.is_success());
        assert!(report.released_buffers.is_empty());
        assert!(uploader.store().contains("2024-05-17_segments.json"));
        assert!(uploader.store().contains("2024-05-17_metadata.json"));
    }

    #[tokio::test]
    async fn test_metadata_skipped_after_segments_failure() {
        let store = MemoryStore::default();
        store.insert("2024-05-17_segments.json", b"[]".to_vec());
        let uploader = Uploader::new(store, FlowSettings::default());

        let report = uploader
            .run_for_date(
                &json!({"traits": {"smi_uid": "u1"}, "segments": ["vip"]}),
                date(),
            )
            .await;

        assert!(matches!(
            report.segments,
            FlowStatus::Failed(RollupError::CorruptDocument { .. })
        ));
        assert!(matches!(report.metadata, FlowStatus::Skipped));
        assert!(!uploader.store().contains("2024-05-17_metadata.json"));
        // The corrupt document was fetched into a buffer and then released
        assert_eq!(report.released_buffers.len(), 1);
        assert!(!report.released_buffers[0].exists());
    }

    #[tokio::test]
    async fn test_run_uses_todays_key() {
        let uploader = Uploader::new(MemoryStore::default(), FlowSettings::default());
        let result = uploader
            .run(&json!({"traits": {"smi_uid": "u1"}, "segments": []}))
            .await;
        assert!(result.is_success());
        // Written under today's date (or yesterday's, if the clock rolled over)
        let keys = uploader.store().list_keys().await.unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().any(|k| k.ends_with("_segments.json")));
        assert!(keys.iter().any(|k| k.ends_with("_metadata.json")));
    }
}
