//! Write an aggregate document back to the store

use profile_rollup_core::{
    AggregateDocument, ObjectKey, ObjectStore, PutCondition, PutOutcome, Result, RollupError,
};
use tracing::debug;

/// Serialize `document` and upload it under `key`
///
/// With [`PutCondition::Unconditional`] whatever is at `key` is replaced.
/// Conditional uploads may come back as [`PutOutcome::PreconditionFailed`].
pub async fn persist<S>(
    store: &S,
    key: &ObjectKey,
    document: &AggregateDocument,
    condition: PutCondition,
) -> Result<PutOutcome>
where
    S: ObjectStore + ?Sized,
{
    let bytes = document.to_bytes().map_err(|e| RollupError::Write {
        key: key.to_string(),
        message: e.to_string(),
    })?;

    let outcome = store
        .put(key.as_str(), &bytes, condition)
        .await
        .map_err(|e| RollupError::write(key, e))?;

    debug!(key = %key, bytes = bytes.len(), records = document.len(), ?outcome, "persisted document");
    Ok(outcome)
}
