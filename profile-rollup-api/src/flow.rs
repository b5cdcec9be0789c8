//! One read-merge-write cycle for a single document kind
//!
//! ## Probe strategy
//!
//! - [`ProbeStrategy::List`] (default): list the container, fetch only if the
//!   key is listed. A stale listing makes an existing document look absent.
//! - [`ProbeStrategy::Fetch`]: fetch directly and treat "not found" as the
//!   creation case.
//!
//! ## Write policy
//!
//! - [`WritePolicy::Overwrite`] (default): unconditional put. Two concurrent
//!   cycles on the same key can lose one of the appended records.
//! - [`WritePolicy::Conditional`]: create with `If-None-Match: *`, update with
//!   `If-Match: <etag>`. A rejected write re-fetches, re-merges and tries
//!   again, up to `max_attempts` cycles in total.
//!
//! [`FlowSettings::hardened`] opts into both `Fetch` and `Conditional`.

use crate::fetch::{fetch, fetch_existing, Fetched};
use crate::persist::persist;
use crate::probe::probe_exists;
use profile_rollup_core::{
    merge, DateBasis, DocumentKind, ObjectKey, ObjectStore, ProfileRecord, PutCondition,
    PutOutcome, Reaper, Result, RollupError,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Default number of read-merge-write cycles under [`WritePolicy::Conditional`]
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

/// How a flow decides whether today's document already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStrategy {
    #[default]
    List,
    Fetch,
}

/// How a flow writes the merged document back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WritePolicy {
    #[default]
    Overwrite,
    Conditional {
        #[serde(default = "default_max_attempts")]
        max_attempts: u32,
    },
}

impl WritePolicy {
    /// ETag-guarded writes with [`DEFAULT_MAX_ATTEMPTS`] cycles
    pub fn conditional() -> Self {
        WritePolicy::Conditional {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Read-merge-write cycles allowed before giving up
    pub fn max_attempts(self) -> u32 {
        match self {
            WritePolicy::Overwrite => 1,
            WritePolicy::Conditional { max_attempts } => max_attempts.max(1),
        }
    }

    fn condition(self, prior: Option<&Fetched>) -> PutCondition {
        match (self, prior) {
            (WritePolicy::Overwrite, _) => PutCondition::Unconditional,
            (WritePolicy::Conditional { .. }, Some(fetched)) => {
                PutCondition::IfMatch(fetched.etag.clone())
            }
            (WritePolicy::Conditional { .. }, None) => PutCondition::IfAbsent,
        }
    }
}

/// Per-invocation knobs shared by both flows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowSettings {
    pub date_basis: DateBasis,
    pub probe: ProbeStrategy,
    pub write_policy: WritePolicy,
}

impl FlowSettings {
    /// Fetch-probe with conditional writes
    ///
    /// Neither a stale listing nor a concurrent writer can drop a record.
    pub fn hardened() -> Self {
        Self {
            probe: ProbeStrategy::Fetch,
            write_policy: WritePolicy::conditional(),
            ..Default::default()
        }
    }
}

/// A successful flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowWrite {
    pub kind: DocumentKind,
    pub key: ObjectKey,
    /// Records in the document after the append
    pub records: usize,
    /// No document existed before this write
    pub created: bool,
    /// Read-merge-write cycles it took
    pub attempts: u32,
    pub etag: String,
}

/// Append `record` to the document at `key`
///
/// Every buffer created while fetching is registered with `reaper`; the caller
/// releases them.
pub async fn run_flow<S>(
    store: &S,
    key: &ObjectKey,
    record: &ProfileRecord,
    settings: &FlowSettings,
    reaper: &mut Reaper,
) -> Result<FlowWrite>
where
    S: ObjectStore + ?Sized,
{
    let max_attempts = settings.write_policy.max_attempts();
    let mut attempt = 0;

    loop {
        attempt += 1;

        let prior = match settings.probe {
            ProbeStrategy::List => {
                if probe_exists(store, key).await? {
                    Some(fetch_existing(store, key, reaper).await?)
                } else {
                    None
                }
            }
            ProbeStrategy::Fetch => fetch(store, key, reaper).await?,
        };

        let prior_bytes = match &prior {
            Some(fetched) => Some(reaper.contents(fetched.buffer).map_err(|e| {
                RollupError::Retrieval {
                    key: key.to_string(),
                    message: format!("failed to read transient buffer: {e}"),
                }
            })?),
            None => None,
        };

        let document = merge(prior_bytes.as_deref(), record)
            .map_err(|source| RollupError::corrupt_document(key, source))?;

        let condition = settings.write_policy.condition(prior.as_ref());
        match persist(store, key, &document, condition).await? {
            PutOutcome::Written { etag } => {
                info!(
                    key = %key,
                    kind = %record.kind(),
                    records = document.len(),
                    created = prior.is_none(),
                    attempt,
                    "appended record"
                );
                return Ok(FlowWrite {
                    kind: record.kind(),
                    key: key.clone(),
                    records: document.len(),
                    created: prior.is_none(),
                    attempts: attempt,
                    etag,
                });
            }
            PutOutcome::PreconditionFailed if attempt < max_attempts => {
                warn!(key = %key, attempt, max_attempts, "document changed concurrently; retrying merge");
            }
            PutOutcome::PreconditionFailed => {
                return Err(RollupError::Conflict {
                    key: key.to_string(),
                    attempts: attempt,
                });
            }
        }
        debug!(key = %key, "re-reading document");
    }
}
