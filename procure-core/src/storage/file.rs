//! File-backed slot storage.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{KeyValueStore, Slot, StorageError};

/// Stores each slot as one file in a data directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Creates a new storage instance rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the full path for a slot.
    pub fn path(&self, slot: Slot) -> PathBuf {
        self.data_dir.join(slot.filename())
    }

    /// Checks if a slot exists on disk.
    pub fn exists(&self, slot: Slot) -> bool {
        self.path(slot).exists()
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, slot: Slot) -> Result<Option<String>, StorageError> {
        let path = self.path(slot);

        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(path, e)),
        }
    }

    /// Creates the data directory if it doesn't exist.
    fn set(&self, slot: Slot, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| StorageError::Io(self.data_dir.clone(), e))?;

        let path = self.path(slot);
        fs::write(&path, value).map_err(|e| StorageError::Io(path, e))?;
        tracing::debug!("Wrote {} bytes to {}", value.len(), slot);

        Ok(())
    }

    fn remove(&self, slot: Slot) -> Result<(), StorageError> {
        let path = self.path(slot);

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(path, e)),
        }
    }
}
