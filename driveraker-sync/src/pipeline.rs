//! Shared run pipeline used by the CLI: load → resolve → persist.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use driveraker_core::{Config, HashIndex};

use crate::error::{io_err, SyncError};
use crate::resolver::{ChangeSet, ChangeSetResolver, SyncRun};

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u128,
    pub index_path: PathBuf,
    /// `false` in dry-run mode.
    pub persisted: bool,
    pub entries_before: usize,
    pub entries_after: usize,
    pub buckets_before: usize,
    pub buckets_after: usize,
    pub change_set: ChangeSet,
}

impl RunSummary {
    pub fn resized(&self) -> bool {
        self.buckets_after != self.buckets_before
    }
}

/// Run the resolver against the index configured for `home`.
///
/// A missing index is created, sized from the listing. A corrupt one aborts
/// the run. With `dry_run` the index is resolved in memory and never saved.
pub fn run(
    home: &Path,
    config: &Config,
    sync_run: &SyncRun,
    dry_run: bool,
) -> Result<RunSummary, SyncError> {
    let started_at = Utc::now();
    let clock = Instant::now();

    let index_path = config.index_path_at(home);
    let hint = config.index.bucket_hint(sync_run.full_listing.len());
    let mut index = HashIndex::load_from_file(&index_path, hint, config.index.fill_factor)?;
    let entries_before = index.len();
    let buckets_before = index.bucket_count();

    let resolver = ChangeSetResolver::from_config(config)?;
    let change_set = if dry_run {
        tracing::info!("[dry-run] index will not be saved");
        resolver.resolve(sync_run, &mut index)
    } else {
        resolver.resolve_and_persist(sync_run, &mut index, &index_path)?
    };

    Ok(RunSummary {
        started_at,
        duration_ms: clock.elapsed().as_millis(),
        index_path,
        persisted: !dry_run,
        entries_before,
        entries_after: index.len(),
        buckets_before,
        buckets_after: index.bucket_count(),
        change_set,
    })
}

/// Read a run input file, mapping failures to [`SyncError::Io`].
pub fn read_input(path: &Path) -> Result<String, SyncError> {
    std::fs::read_to_string(path).map_err(|e| io_err(path, e))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn config_for(root: &Path) -> Config {
        let mut config = Config::new(root);
        config.index.fill_factor = 2;
        config
    }

    #[test]
    fn first_run_creates_index_sized_from_listing() {
        let home = TempDir::new().expect("home");
        let config = config_for(Path::new("/root/"));
        let listing: Vec<String> = (0..8).map(|i| format!("/root/{i}.docx")).collect();

        let summary = run(home.path(), &config, &SyncRun::new(listing, ""), false).expect("run");
        assert_eq!(summary.entries_before, 0);
        assert_eq!(summary.entries_after, 8);
        assert_eq!(summary.buckets_before, 4);
        assert!(!summary.resized());
        assert!(summary.persisted);
        assert!(summary.index_path.exists());
    }

    #[test]
    fn dry_run_does_not_write_index() {
        let home = TempDir::new().expect("home");
        let config = config_for(Path::new("/root/"));
        let sync_run = SyncRun::new(vec!["/root/a.docx".into()], "");

        let summary = run(home.path(), &config, &sync_run, true).expect("run");
        assert_eq!(summary.change_set.work_set.len(), 1);
        assert!(!summary.persisted);
        assert!(!summary.index_path.exists(), "dry-run must not create the index");
    }

    #[test]
    fn corrupt_index_aborts_run() {
        let home = TempDir::new().expect("home");
        let config = config_for(Path::new("/root/"));
        let path = config.index_path_at(home.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ nope").unwrap();

        let err = run(home.path(), &config, &SyncRun::default(), false).unwrap_err();
        assert!(
            matches!(
                err,
                SyncError::Index(driveraker_core::IndexError::Corrupt { .. })
            ),
            "got: {err}"
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ nope", "never repaired");
    }

    #[test]
    fn oversized_fill_factor_does_not_abort_run() {
        let home = TempDir::new().expect("home");
        let mut config = config_for(Path::new("/root/"));
        config.index.fill_factor = usize::MAX / 2;
        config.index.initial_buckets = Some(4);
        let sync_run = SyncRun::new(vec!["/root/a.docx".into()], "");

        let summary = run(home.path(), &config, &sync_run, false).expect("run");
        assert_eq!(summary.change_set.work_set.len(), 1);
        assert_eq!(summary.buckets_after, 4);
    }

    #[test]
    fn read_input_missing_file_is_io_error() {
        let home = TempDir::new().expect("home");
        let err = read_input(&home.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
        assert!(err.to_string().contains("missing.txt"));
    }
}
