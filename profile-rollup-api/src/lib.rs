//! Daily profile aggregation
//!
//! Each invocation takes one inbound payload and appends one record to each of
//! today's two aggregate documents:
//!
//! 1. derive the key (`{date}_segments.json`, `{date}_metadata.json`)
//! 2. find out whether the document exists ([`probe`] or a direct fetch)
//! 3. download it into a transient buffer ([`fetch`])
//! 4. append the new record ([`profile_rollup_core::merge`])
//! 5. write the result back ([`persist`])
//!
//! The segments flow runs first; the metadata flow only runs if it succeeded.
//! Transient buffers are released once both flows are done, whatever the
//! outcome. The host sees one [`ActionResult`]; [`InvocationReport`] keeps the
//! per-kind detail.
//!
//! ## Example
//!
//! ```
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! use profile_rollup_api::{ActionRunner, FlowSettings, Uploader};
//! use profile_rollup_core::MemoryStore;
//! use serde_json::json;
//!
//! let uploader = Uploader::new(MemoryStore::new("aggregates"), FlowSettings::default());
//! let result = uploader
//!     .run(&json!({"traits": {"smi_uid": "u1"}, "segments": ["vip"]}))
//!     .await;
//! assert!(result.is_success());
//! # });
//! ```

pub mod config;
pub mod fetch;
pub mod flow;
pub mod manifest;
pub mod outcome;
pub mod payload;
pub mod persist;
pub mod probe;
pub mod report;
pub mod uploader;

#[cfg(feature = "aws")]
pub mod aws;

pub use config::UploaderConfig;
pub use flow::{run_flow, FlowSettings, FlowWrite, ProbeStrategy, WritePolicy};
pub use manifest::{register, PluginManifest};
pub use outcome::ActionResult;
pub use payload::InboundPayload;
pub use report::{FlowStatus, InvocationReport};
pub use uploader::{ActionRunner, Uploader};

#[cfg(feature = "aws")]
pub use aws::S3Uploader;

pub use profile_rollup_core::{Result, RollupError};
