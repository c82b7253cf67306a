//! Domain types shared by the index, the resolver and the CLI.
//!
//! Index keys stay `String`-backed: they are compared and hashed as raw
//! bytes, never as filesystem paths.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A sync-root-relative document path, used as the index lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentKey(pub String);

impl DocumentKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for DocumentKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DocumentKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One key/value pair stored in an index bucket.
///
/// `value` currently repeats the relative path held in `key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub key: String,
    pub value: String,
}

impl IndexEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// How the remote-sync client names exported copies of a source document,
/// and which report status letters mark a document as modified.
///
/// A source document `/dir/name` is exported to
/// `/dir/name<suffix>/name.<extension>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConvention {
    #[serde(default = "default_suffix")]
    pub suffix: String,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_markers")]
    pub markers: Vec<String>,
}

impl Default for ExportConvention {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
            extension: default_extension(),
            markers: default_markers(),
        }
    }
}

impl ExportConvention {
    /// Whether `marker` is one of the configured modified-status letters.
    pub fn is_modified_marker(&self, marker: char) -> bool {
        self.markers
            .iter()
            .any(|m| m.len() == marker.len_utf8() && m.starts_with(marker))
    }
}

fn default_suffix() -> String {
    "_exports".to_string()
}

fn default_extension() -> String {
    "docx".to_string()
}

fn default_markers() -> Vec<String> {
    vec!["M".to_string()]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
