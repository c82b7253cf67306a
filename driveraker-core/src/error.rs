//! Error types for driveraker-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from [`HashIndex`](crate::index::HashIndex)
/// lookups and snapshot persistence.
#[derive(Debug, Error)]
pub enum IndexError {
    /// `require` on a key that was never inserted.
    #[error("key not found in index: {key}")]
    NotFound { key: String },

    /// The snapshot file exists but does not describe a well-formed index.
    /// Never repaired automatically; the operator decides whether to discard it.
    #[error("corrupt index at {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (save path).
    #[error("index JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// All errors that can arise from configuration loading and init.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`: cannot locate `~/.driveraker/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The config file did not exist at the expected path.
    #[error("config not found at {path}; run `driveraker init` first")]
    ConfigNotFound { path: PathBuf },

    /// The file parsed but holds values the resolver cannot work with.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Convenience constructor for [`IndexError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> IndexError {
    IndexError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`IndexError::Corrupt`].
pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> IndexError {
    IndexError::Corrupt {
        path: path.into(),
        reason: reason.into(),
    }
}
