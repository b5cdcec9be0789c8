//! Object key derivation
//!
//! Every aggregate document lives at `{YYYY-MM-DD}_{kind}.json`. Two calls on
//! the same calendar day for the same kind produce the same key.

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which aggregate document a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Per-subject segment memberships
    Segments,
    /// Segment labels only, no subject identifier
    Metadata,
}

impl DocumentKind {
    /// Processing order within one invocation
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Segments, DocumentKind::Metadata];

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Segments => "segments",
            DocumentKind::Metadata => "metadata",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "segments" => Ok(DocumentKind::Segments),
            "metadata" => Ok(DocumentKind::Metadata),
            other => Err(format!(
                "unknown document kind '{other}' (expected 'segments' or 'metadata')"
            )),
        }
    }
}

/// Which clock decides the calendar date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateBasis {
    #[default]
    Utc,
    /// Host-local time zone
    Local,
}

impl DateBasis {
    /// Current calendar date on this clock
    pub fn today(self) -> NaiveDate {
        match self {
            DateBasis::Utc => Utc::now().date_naive(),
            DateBasis::Local => Local::now().date_naive(),
        }
    }
}

/// Key of a daily aggregate document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn for_date(date: NaiveDate, kind: DocumentKind) -> Self {
        Self(format!("{}_{}.json", date.format("%Y-%m-%d"), kind))
    }

    /// Key for today's document of `kind`
    pub fn today(kind: DocumentKind, basis: DateBasis) -> Self {
        Self::for_date(basis.today(), kind)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
