//! Error types for driveraker-sync.

use std::path::PathBuf;

use thiserror::Error;

use driveraker_core::{ConfigError, IndexError};

/// All errors that can abort a sync run.
///
/// Report parsing never fails; an unreadable report simply contributes no
/// modified documents.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The index could not be loaded or saved. `Corrupt` lands here and is
    /// fatal: dedup state cannot be trusted.
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// An error from the configuration file.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// An I/O error reading run inputs, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
