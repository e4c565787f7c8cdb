//! Persistent key-value storage for procurement state.
//!
//! State lives in a handful of independent string slots, each rewritten
//! whenever its owning state changes:
//! - `procurement_records.json`: JSON array of records
//! - `last_supplier`: plain supplier name
//! - `preset_colors.json`: JSON array of color labels
//! - `wechat_webhook`: plain webhook URL
//! - `target_group_name`: plain group label
//!
//! There is no transaction across slots; each write is last-write-wins.

mod file;
mod memory;
mod slot;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use slot::Slot;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing a slot.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error for {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] io::Error),

    #[error("Failed to encode {0}: {1}")]
    Encode(Slot, #[source] serde_json::Error),
}

/// A string-keyed store holding one value per [`Slot`].
pub trait KeyValueStore {
    /// Reads a slot. Returns `Ok(None)` if the slot has never been written.
    fn get(&self, slot: Slot) -> Result<Option<String>, StorageError>;

    /// Overwrites a slot.
    fn set(&self, slot: Slot, value: &str) -> Result<(), StorageError>;

    /// Removes a slot. Removing an absent slot is not an error.
    fn remove(&self, slot: Slot) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, slot: Slot) -> Result<Option<String>, StorageError> {
        (**self).get(slot)
    }

    fn set(&self, slot: Slot, value: &str) -> Result<(), StorageError> {
        (**self).set(slot, value)
    }

    fn remove(&self, slot: Slot) -> Result<(), StorageError> {
        (**self).remove(slot)
    }
}

/// Reads a JSON slot, treating unreadable or malformed content as absent.
pub(crate) fn read_json<T, S>(storage: &S, slot: Slot) -> Option<T>
where
    T: serde::de::DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = match storage.get(slot) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", slot, e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring malformed {}: {}", slot, e);
            None
        }
    }
}

/// Serializes a value as JSON and writes it to a slot.
pub(crate) fn write_json<T, S>(storage: &S, slot: Slot, value: &T) -> Result<(), StorageError>
where
    T: serde::Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value).map_err(|e| StorageError::Encode(slot, e))?;
    storage.set(slot, &json)
}

/// Reads a plain-text slot, treating read failures as absent.
pub(crate) fn read_text<S>(storage: &S, slot: Slot) -> Option<String>
where
    S: KeyValueStore + ?Sized,
{
    match storage.get(slot) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", slot, e);
            None
        }
    }
}
