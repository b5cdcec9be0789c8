//! Download an aggregate document into a transient buffer

use profile_rollup_core::{BufferId, ObjectKey, ObjectStore, Reaper, Result, RollupError};
use tracing::debug;

/// A downloaded document, spooled to a buffer owned by the invocation's reaper
#[derive(Debug, Clone)]
pub struct Fetched {
    pub buffer: BufferId,
    /// ETag of the version that was read
    pub etag: String,
    pub size: usize,
}

/// Download `key` if it exists
///
/// Returns `Ok(None)` when nothing is stored at `key`. The buffer is only
/// registered once the whole body has been received.
pub async fn fetch<S>(store: &S, key: &ObjectKey, reaper: &mut Reaper) -> Result<Option<Fetched>>
where
    S: ObjectStore + ?Sized,
{
    let Some(object) = store
        .get(key.as_str())
        .await
        .map_err(|e| RollupError::retrieval(key, e))?
    else {
        debug!(key = %key, "no document stored");
        return Ok(None);
    };

    let buffer = reaper
        .spool(&object.bytes)
        .map_err(|e| RollupError::Retrieval {
            key: key.to_string(),
            message: format!("failed to buffer object locally: {e}"),
        })?;

    debug!(key = %key, size = object.bytes.len(), etag = %object.etag, "fetched document");
    Ok(Some(Fetched {
        buffer,
        etag: object.etag,
        size: object.bytes.len(),
    }))
}

/// Download `key`, which a probe reported as present
///
/// A missing object at this point means it disappeared between probe and
/// fetch, which is a retrieval error.
pub async fn fetch_existing<S>(store: &S, key: &ObjectKey, reaper: &mut Reaper) -> Result<Fetched>
where
    S: ObjectStore + ?Sized,
{
    fetch(store, key, reaper)
        .await?
        .ok_or_else(|| RollupError::Retrieval {
            key: key.to_string(),
            message: "object was listed but is no longer present".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use profile_rollup_core::{DocumentKind, MemoryStore};

    fn key() -> ObjectKey {
        ObjectKey::for_date(
            NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
            DocumentKind::Segments,
        )
    }

    #[tokio::test]
    async fn test_fetch_spools_into_reaper() {
        let store = MemoryStore::default();
        store.insert(key().as_str(), br#"{"profiles":[]}"#.to_vec());
        let mut reaper = Reaper::new();

        let fetched = fetch(&store, &key(), &mut reaper).await.unwrap().unwrap();
        assert_eq!(fetched.size, 15);
        assert!(!fetched.etag.is_empty());
        assert_eq!(reaper.live(), 1);
        assert_eq!(reaper.contents(fetched.buffer).unwrap(), br#"{"profiles":[]}"#);
    }

    #[tokio::test]
    async fn test_fetch_missing_creates_no_buffer() {
        let store = MemoryStore::default();
        let mut reaper = Reaper::new();
        assert!(fetch(&store, &key(), &mut reaper).await.unwrap().is_none());
        assert_eq!(reaper.live(), 0);
    }

    #[tokio::test]
    async fn test_fetch_existing_reports_vanished_object() {
        let store = MemoryStore::default();
        let mut reaper = Reaper::new();
        let err = fetch_existing(&store, &key(), &mut reaper).await.unwrap_err();
        assert!(matches!(err, RollupError::Retrieval { .. }));
        assert_eq!(reaper.live(), 0);
    }
}
