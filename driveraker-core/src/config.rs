//! YAML configuration for a driveraker installation.
//!
//! # Storage layout
//!
//! ```text
//! ~/.driveraker/
//!   config.yaml   (mode 0600, created by `driveraker init`)
//!   index.json    (default index snapshot location)
//! ```
//!
//! Every function takes an explicit `home`; tests pass a `TempDir`, the CLI
//! passes [`home`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::index::{DEFAULT_FILL_FACTOR, MAX_FILL_FACTOR};
use crate::types::ExportConvention;

/// Index sizing knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSettings {
    #[serde(default = "default_fill_factor")]
    pub fill_factor: usize,
    /// Bucket count for a brand-new index. `None` derives it from the first
    /// run's listing size.
    #[serde(default)]
    pub initial_buckets: Option<usize>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            fill_factor: DEFAULT_FILL_FACTOR,
            initial_buckets: None,
        }
    }
}

impl IndexSettings {
    /// Bucket hint for a fresh index that will first see `listing_len` documents.
    pub fn bucket_hint(&self, listing_len: usize) -> usize {
        self.initial_buckets
            .unwrap_or(listing_len / self.fill_factor.max(1))
            .max(1)
    }
}

/// Root of `config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Local directory the remote store is mirrored into; stripped from
    /// listed paths to form index keys.
    pub sync_root: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_directory: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_directory: Option<PathBuf>,
    /// Snapshot location; defaults to `~/.driveraker/index.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_path: Option<PathBuf>,
    #[serde(default)]
    pub index: IndexSettings,
    #[serde(default)]
    pub export: ExportConvention,
}

impl Config {
    pub fn new(sync_root: impl Into<PathBuf>) -> Self {
        Self {
            sync_root: sync_root.into(),
            remote_directory: None,
            post_directory: None,
            production_directory: None,
            index_path: None,
            index: IndexSettings::default(),
            export: ExportConvention::default(),
        }
    }

    /// The configured snapshot path, or the default under `home`.
    pub fn index_path_at(&self, home: &Path) -> PathBuf {
        self.index_path
            .clone()
            .unwrap_or_else(|| default_index_path_at(home))
    }

    /// Reject values the resolver cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync_root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("sync_root must not be empty".into()));
        }
        if self.sync_root.to_str().is_none() {
            return Err(ConfigError::Invalid("sync_root must be valid UTF-8".into()));
        }
        if !(1..=MAX_FILL_FACTOR).contains(&self.index.fill_factor) {
            return Err(ConfigError::Invalid(format!(
                "index.fill_factor must be between 1 and {MAX_FILL_FACTOR}"
            )));
        }
        if self.index.initial_buckets == Some(0) {
            return Err(ConfigError::Invalid(
                "index.initial_buckets must be at least 1".into(),
            ));
        }
        for marker in &self.export.markers {
            let mut chars = marker.chars();
            let single_letter = matches!(
                (chars.next(), chars.next()),
                (Some(c), None) if c.is_ascii_alphabetic()
            );
            if !single_letter {
                return Err(ConfigError::Invalid(format!(
                    "export.markers entries must be single letters, got '{marker}'"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.driveraker/`
pub fn root_at(home: &Path) -> PathBuf {
    home.join(".driveraker")
}

/// `<home>/.driveraker/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    root_at(home).join("config.yaml")
}

/// `<home>/.driveraker/index.json`: pure, no I/O.
pub fn default_index_path_at(home: &Path) -> PathBuf {
    root_at(home).join("index.json")
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load and validate `<home>/.driveraker/config.yaml`.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    let config: Config =
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })?;
    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save `config` to `<home>/.driveraker/config.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, config: &Config) -> Result<(), ConfigError> {
    config.validate()?;
    let dir = root_at(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    let path = config_path_at(home);
    let tmp_path = path.with_file_name("config.yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// 4. Init
// ---------------------------------------------------------------------------

/// Write a config for `config` unless one already exists.
///
/// Idempotent: if the file already exists, loads and returns it unchanged.
pub fn init_at(home: &Path, config: Config) -> Result<Config, ConfigError> {
    if config_path_at(home).exists() {
        return load_at(home);
    }
    save_at(home, &config)?;
    Ok(config)
}

/// The current user's home directory.
pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn default_fill_factor() -> usize {
    DEFAULT_FILL_FACTOR
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
