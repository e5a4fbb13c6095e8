//! Pluggable flat key-value persistence media.
//!
//! The medium contract is deliberately minimal: synchronous get/set of whole
//! string values by key. A table occupies exactly one key, so a medium that
//! guarantees atomic single-key writes gives readers a consistent (possibly
//! stale) snapshot. A medium without that guarantee can corrupt a table on a
//! crash mid-write; the engine documents this, it does not patch it.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};

/// Synchronous flat key-value persistence.
pub trait KvMedium {
    /// Reads the value stored under `key`; `None` when the key is absent.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
}

/// In-memory medium for tests and ephemeral databases.
///
/// An optional byte capacity emulates the quota failure of browser-local
/// storage: a set that would push the total size of keys plus values past
/// the limit fails with a capacity error and leaves the entry untouched.
#[derive(Debug, Default)]
pub struct MemoryMedium {
    entries: HashMap<String, String>,
    capacity: Option<usize>,
    used: usize,
}

impl MemoryMedium {
    /// Unbounded in-memory medium.
    pub fn new() -> Self {
        Self::default()
    }

    /// In-memory medium with a byte capacity over keys plus values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Total bytes currently held.
    pub fn used_bytes(&self) -> usize {
        self.used
    }
}

impl KvMedium for MemoryMedium {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let old = self.entries.get(key).map(String::len).unwrap_or(0);
        let key_cost = if self.entries.contains_key(key) {
            0
        } else {
            key.len()
        };
        let projected = self.used - old + value.len() + key_cost;

        if let Some(capacity) = self.capacity {
            if projected > capacity {
                return Err(StorageError::capacity_exceeded(format!(
                    "writing {} bytes under '{}' exceeds the {}-byte capacity",
                    value.len(),
                    key,
                    capacity
                )));
            }
        }

        self.entries.insert(key.to_string(), value.to_string());
        self.used = projected;
        Ok(())
    }
}

/// File-backed medium: one file per key under a data directory.
///
/// Writes go through a temp file followed by a rename, so a single-key
/// write is atomic on the filesystems this targets.
#[derive(Debug)]
pub struct FileMedium {
    dir: PathBuf,
}

impl FileMedium {
    /// Opens the medium rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            StorageError::write_failed(
                format!("failed to create data directory '{}'", dir.display()),
                e,
            )
        })?;
        Ok(Self { dir })
    }

    fn file_for_key(&self, key: &str) -> PathBuf {
        self.dir.join(sanitize_key(key))
    }
}

impl KvMedium for FileMedium {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.file_for_key(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::read_failed(
                format!("failed to read '{}'", path.display()),
                e,
            )),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.file_for_key(key);
        let tmp = temp_path(&path);

        fs::write(&tmp, value).map_err(|e| {
            StorageError::write_failed(format!("failed to write '{}'", tmp.display()), e)
        })?;
        fs::rename(&tmp, &path).map_err(|e| {
            StorageError::write_failed(
                format!("failed to move '{}' into place", tmp.display()),
                e,
            )
        })
    }
}

/// Maps a key to a safe file name. Keys are namespaced table names, so this
/// only has to neutralize separators and other non-portable characters.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
