//! Per-kind results of one invocation

use crate::flow::FlowWrite;
use crate::outcome::ActionResult;
use profile_rollup_core::{DocumentKind, Reaped, RollupError};
use std::path::PathBuf;

/// What happened to one document kind
#[derive(Debug)]
pub enum FlowStatus {
    Written(FlowWrite),
    Failed(RollupError),
    /// Not attempted because an earlier step failed
    Skipped,
}

impl FlowStatus {
    pub fn is_written(&self) -> bool {
        matches!(self, FlowStatus::Written(_))
    }

    pub fn written(&self) -> Option<&FlowWrite> {
        match self {
            FlowStatus::Written(write) => Some(write),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&RollupError> {
        match self {
            FlowStatus::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<profile_rollup_core::Result<FlowWrite>> for FlowStatus {
    fn from(result: profile_rollup_core::Result<FlowWrite>) -> Self {
        match result {
            Ok(write) => FlowStatus::Written(write),
            Err(err) => FlowStatus::Failed(err),
        }
    }
}

/// Everything one invocation did
#[derive(Debug)]
pub struct InvocationReport {
    pub segments: FlowStatus,
    pub metadata: FlowStatus,
    /// Transient buffers released at the end
    pub released_buffers: Vec<PathBuf>,
    pub cleanup_error: Option<RollupError>,
}

impl InvocationReport {
    /// An invocation stopped before any store I/O
    pub fn rejected(err: RollupError) -> Self {
        Self {
            segments: FlowStatus::Failed(err),
            metadata: FlowStatus::Skipped,
            released_buffers: Vec::new(),
            cleanup_error: None,
        }
    }

    /// Assemble the report once both flows ran and buffers were reaped
    ///
    /// Paths released before a failed release are still reported.
    pub fn finish(segments: FlowStatus, metadata: FlowStatus, reaped: Reaped) -> Self {
        let cleanup_error = if reaped.is_clean() {
            None
        } else {
            Some(RollupError::cleanup(reaped.failures.join("; ")))
        };
        Self {
            segments,
            metadata,
            released_buffers: reaped.released,
            cleanup_error,
        }
    }

    pub fn status(&self, kind: DocumentKind) -> &FlowStatus {
        match kind {
            DocumentKind::Segments => &self.segments,
            DocumentKind::Metadata => &self.metadata,
        }
    }

    /// The error the host is told about
    ///
    /// Flow failures take precedence over cleanup failures.
    pub fn error(&self) -> Option<&RollupError> {
        self.segments
            .error()
            .or_else(|| self.metadata.error())
            .or(self.cleanup_error.as_ref())
    }

    pub fn is_success(&self) -> bool {
        self.error().is_none() && self.segments.is_written() && self.metadata.is_written()
    }

    /// Collapse into the single host-facing outcome
    pub fn to_result(&self) -> ActionResult {
        match self.error() {
            Some(err) => ActionResult::error(err),
            None if self.is_success() => ActionResult::success(),
            None => ActionResult::error("invocation did not complete"),
        }
    }
}
