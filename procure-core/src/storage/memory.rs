//! In-memory slot storage.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{KeyValueStore, Slot, StorageError};

/// Keeps slots in memory. Clones share the same underlying map, so a test can
/// hand one clone to the code under test and inspect another.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    slots: Rc<RefCell<HashMap<Slot, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots currently written.
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, slot: Slot) -> Result<Option<String>, StorageError> {
        Ok(self.slots.borrow().get(&slot).cloned())
    }

    fn set(&self, slot: Slot, value: &str) -> Result<(), StorageError> {
        self.slots.borrow_mut().insert(slot, value.to_string());
        Ok(())
    }

    fn remove(&self, slot: Slot) -> Result<(), StorageError> {
        self.slots.borrow_mut().remove(&slot);
        Ok(())
    }
}
