//! Profile records appended to aggregate documents

use crate::key::DocumentKind;
use serde::{Deserialize, Serialize};

/// One appended unit of profile data
///
/// Serialized untagged: the segments variant is
/// `{"smi_uid": "...", "segments": [...]}`, the metadata variant is
/// `{"segments": [...]}`. `subject_id` is accepted as an alias for `smi_uid`
/// when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileRecord {
    Segments {
        #[serde(rename = "smi_uid", alias = "subject_id")]
        subject_id: String,
        segments: Vec<String>,
    },
    Metadata {
        segments: Vec<String>,
    },
}

impl ProfileRecord {
    pub fn segments(subject_id: impl Into<String>, segments: Vec<String>) -> Self {
        Self::Segments {
            subject_id: subject_id.into(),
            segments,
        }
    }

    pub fn metadata(segments: Vec<String>) -> Self {
        Self::Metadata { segments }
    }

    /// The document this record is appended to
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Segments { .. } => DocumentKind::Segments,
            Self::Metadata { .. } => DocumentKind::Metadata,
        }
    }

    pub fn segment_labels(&self) -> &[String] {
        match self {
            Self::Segments { segments, .. } | Self::Metadata { segments } => segments,
        }
    }
}
