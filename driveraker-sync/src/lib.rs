//! # driveraker-sync
//!
//! Change-set resolution over the persistent sync index.
//!
//! Call [`ChangeSetResolver::resolve_and_persist`] with a [`SyncRun`] to get
//! the documents to process this run, or [`pipeline::run`] to do the same
//! against the configured index file.

pub mod error;
pub mod pipeline;
pub mod report;
pub mod resolver;

pub use error::SyncError;
pub use pipeline::RunSummary;
pub use resolver::{normalize_key, ChangeSet, ChangeSetResolver, SyncRun, WorkItem};
