//! JSON snapshot persistence for [`HashIndex`].
//!
//! On-disk shape:
//!
//! ```text
//! {
//!   "size": 2,
//!   "bucketCount": 2,
//!   "capacity": 20,
//!   "buckets": [ [ {"key": "a.docx", "value": "a.docx"} ], null ]
//! }
//! ```
//!
//! Empty buckets are written as `null`; both `null` and `[]` are accepted on
//! load. Writes use the `.tmp` + rename pattern so a failed save leaves the
//! previous snapshot intact.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{corrupt, io_err, IndexError};
use crate::index::{checksum, Bucket, HashIndex};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
    size: usize,
    bucket_count: usize,
    capacity: usize,
    buckets: Vec<Option<&'a Bucket>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotFile {
    size: usize,
    bucket_count: usize,
    capacity: usize,
    buckets: Vec<Option<Bucket>>,
}

impl HashIndex {
    /// Serialize the index to `path`, replacing any previous snapshot.
    pub fn save_to_file(&self, path: &Path) -> Result<(), IndexError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }

        let snapshot = SnapshotRef {
            size: self.size,
            bucket_count: self.bucket_count,
            capacity: self.capacity,
            buckets: self
                .buckets
                .iter()
                .map(|b| if b.is_empty() { None } else { Some(b) })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&snapshot)?;

        let tmp = tmp_path(path);
        std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(path, e));
        }
        tracing::info!("saved index ({} entries) to {}", self.size, path.display());
        Ok(())
    }

    /// Load the snapshot at `path`.
    ///
    /// A missing file yields a fresh index sized from `bucket_hint` and
    /// `fill_factor`. A file that exists but does not describe a well-formed
    /// index is [`IndexError::Corrupt`]; the fill factor of a loaded index is
    /// `capacity / bucketCount` from the file.
    pub fn load_from_file(
        path: &Path,
        bucket_hint: usize,
        fill_factor: usize,
    ) -> Result<Self, IndexError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(
                    "no index at {}; starting empty with {} bucket(s)",
                    path.display(),
                    bucket_hint.max(1)
                );
                return Ok(Self::with_fill_factor(bucket_hint, fill_factor));
            }
            Err(e) => return Err(io_err(path, e)),
        };

        let file: SnapshotFile =
            serde_json::from_str(&contents).map_err(|e| corrupt(path, e.to_string()))?;
        let index = Self::from_snapshot(file).map_err(|reason| corrupt(path, reason))?;
        tracing::info!(
            "loaded index ({} entries, {} buckets) from {}",
            index.size,
            index.bucket_count,
            path.display()
        );
        Ok(index)
    }

    fn from_snapshot(file: SnapshotFile) -> Result<Self, String> {
        let SnapshotFile {
            size,
            bucket_count,
            capacity,
            buckets,
        } = file;

        if bucket_count == 0 {
            return Err("bucketCount must be at least 1".to_string());
        }
        if buckets.len() != bucket_count {
            return Err(format!(
                "bucketCount is {bucket_count} but {} buckets are stored",
                buckets.len()
            ));
        }
        if capacity == 0 || capacity % bucket_count != 0 {
            return Err(format!(
                "capacity {capacity} is not a positive multiple of bucketCount {bucket_count}"
            ));
        }

        let buckets: Vec<Bucket> = buckets.into_iter().map(Option::unwrap_or_default).collect();

        let mut seen = HashSet::new();
        for (slot, bucket) in buckets.iter().enumerate() {
            for entry in bucket {
                let expected = checksum(&entry.key) as usize % bucket_count;
                if expected != slot {
                    return Err(format!(
                        "key '{}' stored in bucket {slot}, expected bucket {expected}",
                        entry.key
                    ));
                }
                if !seen.insert(entry.key.as_str()) {
                    return Err(format!("key '{}' stored more than once", entry.key));
                }
            }
        }

        if seen.len() != size {
            return Err(format!(
                "size is {size} but {} entries are stored",
                seen.len()
            ));
        }
        if size > capacity {
            return Err(format!("size {size} exceeds capacity {capacity}"));
        }

        Ok(Self {
            size,
            bucket_count,
            capacity,
            fill_factor: capacity / bucket_count,
            buckets,
        })
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_fresh_index() {
        let tmp = TempDir::new().unwrap();
        let index = HashIndex::load_from_file(&tmp.path().join("index.json"), 3, 5).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.bucket_count(), 3);
        assert_eq!(index.capacity(), 15);
    }

    #[test]
    fn roundtrip_save_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("index.json");
        let mut index = HashIndex::with_fill_factor(2, 4);
        for key in ["a.docx", "b.docx", "posts/c.docx"] {
            index.insert(key, key);
        }
        index.save_to_file(&path).unwrap();

        let loaded = HashIndex::load_from_file(&path, 99, 99).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.bucket_count(), 2);
        assert_eq!(loaded.capacity(), 8);
        assert_eq!(loaded.fill_factor(), 4);
        assert_eq!(loaded.get("posts/c.docx"), Some("posts/c.docx"));
    }

    #[test]
    fn empty_buckets_are_written_as_null() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("index.json");
        HashIndex::new(3).save_to_file(&path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["size"], 0);
        assert_eq!(raw["bucketCount"], 3);
        assert_eq!(raw["capacity"], 30);
        assert_eq!(raw["buckets"], serde_json::json!([null, null, null]));
    }

    #[test]
    fn tmp_file_cleaned_up_after_save() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("index.json");
        HashIndex::new(1).save_to_file(&path).unwrap();
        assert!(path.exists());
        assert!(!tmp_path(&path).exists(), "tmp file should be renamed away");
    }

    #[cfg(unix)]
    #[test]
    fn tmp_path_keeps_non_utf8_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"/data/ind\xffex.json"));
        assert_eq!(
            tmp_path(path).as_os_str().as_bytes(),
            b"/data/ind\xffex.json.tmp"
        );
    }

    #[test]
    fn empty_array_bucket_is_accepted() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("index.json");
        std::fs::write(
            &path,
            r#"{"size":0,"bucketCount":2,"capacity":20,"buckets":[[],null]}"#,
        )
        .unwrap();
        let index = HashIndex::load_from_file(&path, 1, 10).unwrap();
        assert_eq!(index.bucket_count(), 2);
    }

    #[test]
    fn unreadable_path_is_io_error() {
        let tmp = TempDir::new().unwrap();
        // A directory where a file is expected.
        let err = HashIndex::load_from_file(tmp.path(), 1, 10).unwrap_err();
        assert!(matches!(err, IndexError::Io { .. }), "got: {err}");
    }
}
