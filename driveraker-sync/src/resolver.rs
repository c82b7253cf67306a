//! Change-set resolution: which documents must be processed this run.
//!
//! ## `resolve`: per-run protocol
//!
//! 1. Normalize every listed path to its sync-root-relative key.
//! 2. Dedup: drop keys the index already holds; insert and keep the rest.
//! 3. Parse the modified report into exported-document paths.
//! 4. Merge: new documents first, then modified ones, first key wins.
//! 5. Persist the index once (`resolve_and_persist` only).
//!
//! The index is borrowed mutably for the whole call, so a second resolve
//! cannot start before the first has finished.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use driveraker_core::{Config, ConfigError, DocumentKey, ExportConvention, HashIndex};

use crate::error::SyncError;
use crate::report;

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// Per-run resolver input. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncRun {
    /// Absolute paths of every exported document, in listing order.
    pub full_listing: Vec<String>,
    /// Free-form status text from the remote-sync client.
    pub modified_report: String,
}

impl SyncRun {
    pub fn new(full_listing: Vec<String>, modified_report: impl Into<String>) -> Self {
        Self {
            full_listing,
            modified_report: modified_report.into(),
        }
    }

    /// Build both inputs from the sync client's combined stdout.
    pub fn from_sync_output(output: &str) -> Self {
        Self {
            full_listing: report::parse_exported_paths(output),
            modified_report: output.to_string(),
        }
    }
}

/// One document to hand to the conversion pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItem {
    /// Sync-root-relative key.
    pub key: DocumentKey,
    /// Absolute path as listed or derived.
    pub path: PathBuf,
}

/// Everything one resolve produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    /// Listed documents the index had never seen, in listing order.
    pub new_documents: Vec<WorkItem>,
    /// Documents named by the modified report, in report order.
    pub modified_documents: Vec<WorkItem>,
    /// `new_documents ++ modified_documents`, de-duplicated by key.
    pub work_set: Vec<WorkItem>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.work_set.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.work_set.iter().map(|item| item.path.as_path())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.work_set.iter().map(|item| item.key.as_str())
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Strip `sync_root` from `path` to get its index key.
///
/// The root only matches on a path-component boundary. A path outside the
/// root (or equal to it) is returned unchanged.
pub fn normalize_key(path: &str, sync_root: &str) -> DocumentKey {
    if sync_root.is_empty() {
        return DocumentKey::from(path);
    }
    let Some(rest) = path.strip_prefix(sync_root) else {
        return DocumentKey::from(path);
    };
    if rest.is_empty() {
        return DocumentKey::from(path);
    }
    if sync_root.ends_with('/') {
        return DocumentKey::from(rest);
    }
    match rest.strip_prefix('/') {
        Some(relative) if !relative.is_empty() => DocumentKey::from(relative),
        _ => DocumentKey::from(path),
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Turns a [`SyncRun`] into a [`ChangeSet`] and keeps a [`HashIndex`] current.
#[derive(Debug, Clone)]
pub struct ChangeSetResolver {
    sync_root: String,
    convention: ExportConvention,
}

impl ChangeSetResolver {
    pub fn new(sync_root: impl Into<String>, convention: ExportConvention) -> Self {
        Self {
            sync_root: sync_root.into(),
            convention,
        }
    }

    /// Fails when `sync_root` is not valid UTF-8; listed paths never are.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let sync_root = config.sync_root.to_str().ok_or_else(|| {
            ConfigError::Invalid(format!(
                "sync_root is not valid UTF-8: {}",
                config.sync_root.display()
            ))
        })?;
        Ok(Self::new(sync_root, config.export.clone()))
    }

    pub fn sync_root(&self) -> &str {
        &self.sync_root
    }

    /// Steps 1–4: compute the change set and record new keys in `index`.
    ///
    /// Does not touch the filesystem.
    pub fn resolve(&self, run: &SyncRun, index: &mut HashIndex) -> ChangeSet {
        let mut new_documents = Vec::new();
        for path in &run.full_listing {
            let key = normalize_key(path, &self.sync_root);
            if index.contains(key.as_str()) {
                tracing::debug!("known: {key}");
                continue;
            }
            index.insert(key.as_str(), key.as_str());
            tracing::debug!("new: {key}");
            new_documents.push(WorkItem {
                key,
                path: PathBuf::from(path),
            });
        }

        let modified_documents: Vec<WorkItem> =
            report::parse_modified_report(&run.modified_report, &self.convention)
                .into_iter()
                .map(|path| {
                    let key = normalize_key(&path, &self.sync_root);
                    tracing::debug!("modified: {key}");
                    WorkItem {
                        key,
                        path: PathBuf::from(path),
                    }
                })
                .collect();

        let work_set = merge(&new_documents, &modified_documents);
        tracing::info!(
            "resolved {} new + {} modified -> {} to process",
            new_documents.len(),
            modified_documents.len(),
            work_set.len()
        );

        ChangeSet {
            new_documents,
            modified_documents,
            work_set,
        }
    }

    /// Steps 1–5: resolve, then save `index` to `index_path`.
    ///
    /// Resolution runs against a copy of `index` that replaces it only once
    /// the save succeeds. A failed save returns the error, drops the change
    /// set and leaves `index` as it was, so a retry sees the same documents
    /// as new.
    pub fn resolve_and_persist(
        &self,
        run: &SyncRun,
        index: &mut HashIndex,
        index_path: &Path,
    ) -> Result<ChangeSet, SyncError> {
        let mut staged = index.clone();
        let change_set = self.resolve(run, &mut staged);
        staged.save_to_file(index_path)?;
        *index = staged;
        Ok(change_set)
    }
}

fn merge(new_documents: &[WorkItem], modified_documents: &[WorkItem]) -> Vec<WorkItem> {
    let mut seen = HashSet::new();
    new_documents
        .iter()
        .chain(modified_documents)
        .filter(|item| seen.insert(item.key.clone()))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
