//! Key-value persistence for board snapshots.
//!
//! The board keeps its state in a handful of string blobs (see the `*_KEY`
//! constants). Anything that can durably get and set strings can back it:
//! `FileStore` writes one file per key into a data directory, `MemoryStore`
//! keeps everything in memory for tests and throwaway sessions.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Key holding the ordered `[id, task]` pairs.
pub const TASKS_KEY: &str = "taskflow-tasks";
/// Key holding the ordered `[id, project]` pairs.
pub const PROJECTS_KEY: &str = "taskflow-projects";
/// Key holding the id of the selected project.
pub const CURRENT_PROJECT_KEY: &str = "taskflow-current-project";
/// Key holding the theme preference.
pub const THEME_KEY: &str = "theme";

/// Opaque string store used by the board for persistence.
pub trait Storage {
    /// Read a value. `Ok(None)` means the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// In-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory-backed store: key `k` lives in `<dir>/k.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(FileStore { dir: dir.to_path_buf() })
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { key: key.to_string(), source }),
        }
    }

    /// Atomic-ish write via temp + rename.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let io = |source| StorageError::Io { key: key.to_string(), source };
        let mut f = File::create(&tmp).map_err(io)?;
        f.write_all(value.as_bytes()).map_err(io)?;
        f.flush().map_err(io)?;
        fs::rename(&tmp, &path).map_err(io)?;
        Ok(())
    }
}
