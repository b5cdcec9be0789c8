//! List-based existence probe

use profile_rollup_core::{ObjectKey, ObjectStore, Result, RollupError};
use tracing::debug;

/// Whether `key` appears in the container listing
///
/// The full listing is enumerated. A key missing from the listing (eventual
/// consistency) reads as absent, which biases toward creating a new document.
pub async fn probe_exists<S>(store: &S, key: &ObjectKey) -> Result<bool>
where
    S: ObjectStore + ?Sized,
{
    let keys = store
        .list_keys()
        .await
        .map_err(|e| RollupError::retrieval(key, e))?;
    let exists = keys.iter().any(|k| k == key.as_str());
    debug!(container = store.container(), key = %key, listed = keys.len(), exists, "probed container");
    Ok(exists)
}
