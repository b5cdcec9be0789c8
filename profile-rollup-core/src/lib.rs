//! Core types for profile-rollup
//!
//! Daily aggregate documents collect one record per inbound profile event.
//! This crate holds everything that does not depend on a concrete object
//! store:
//!
//! - **Keys** ([`key`]): `{YYYY-MM-DD}_{kind}.json` derivation
//! - **Records and documents** ([`record`], [`document`]): wire shapes and the
//!   append-only merge
//! - **Object store seam** ([`store`]): the trait the S3 backend implements,
//!   plus [`MemoryStore`] for tests
//! - **Transient buffers** ([`buffer`]): temp-file spooling of fetched objects
//!   and the [`Reaper`] that releases them
//!
//! ## Example
//!
//! ```
//! use profile_rollup_core::{merge, DocumentKind, ObjectKey, ProfileRecord};
//! use chrono::NaiveDate;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
//! let key = ObjectKey::for_date(date, DocumentKind::Segments);
//! assert_eq!(key.as_str(), "2024-05-17_segments.json");
//!
//! let record = ProfileRecord::segments("u1", vec!["vip".to_string()]);
//! let doc = merge(None, &record).unwrap();
//! assert_eq!(doc.len(), 1);
//! ```

pub mod buffer;
pub mod document;
pub mod error;
pub mod key;
pub mod record;
pub mod store;

pub use buffer::{BufferId, Reaped, Reaper, TransientBuffer};
pub use document::{merge, AggregateDocument, DocumentError};
pub use error::{Result, RollupError};
pub use key::{DateBasis, DocumentKind, ObjectKey};
pub use record::ProfileRecord;
pub use store::{
    MemoryStore, ObjectStore, PutCondition, PutOutcome, StoreError, StoreResult, StoredObject,
};
