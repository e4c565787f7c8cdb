//! The ordered record collection, mirrored to storage on every mutation.

use chrono::{DateTime, Local, NaiveDate};

use crate::models::ProcurementRecord;
use crate::storage::{read_json, write_json, KeyValueStore, Slot, StorageError};

/// Owns the procurement records, newest first.
///
/// Every mutation rewrites the full collection to the records slot. If the
/// write fails the in-memory change is kept and the error is returned.
pub struct RecordStore<S: KeyValueStore> {
    storage: S,
    records: Vec<ProcurementRecord>,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Loads the collection from storage.
    ///
    /// A missing or malformed slot yields an empty collection.
    pub fn load(storage: S) -> Self {
        let records: Vec<ProcurementRecord> =
            read_json(&storage, Slot::Records).unwrap_or_default();
        tracing::debug!("Loaded {} record(s)", records.len());
        Self { storage, records }
    }

    /// Read-only snapshot of all records.
    pub fn records(&self) -> &[ProcurementRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ProcurementRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Finds the single record whose id starts with `prefix`.
    ///
    /// Returns `None` when nothing matches or the prefix is ambiguous.
    pub fn find_by_prefix(&self, prefix: &str) -> Option<&ProcurementRecord> {
        if let Some(exact) = self.get(prefix) {
            return Some(exact);
        }
        let mut matches = self.records.iter().filter(|r| r.id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(only), None) if !prefix.is_empty() => Some(only),
            _ => None,
        }
    }

    /// Records created on a local calendar date, in collection order.
    pub fn on_date(&self, date: NaiveDate) -> Vec<&ProcurementRecord> {
        self.records
            .iter()
            .filter(|r| r.local_date() == Some(date))
            .collect()
    }

    /// Inserts a record, or replaces the record with the same id in place.
    ///
    /// Returns `true` if an existing record was replaced.
    pub fn add(&mut self, record: ProcurementRecord) -> Result<bool, StorageError> {
        let replaced = match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                *existing = record;
                true
            }
            None => {
                self.records.insert(0, record);
                false
            }
        };
        self.persist()?;
        Ok(replaced)
    }

    /// Removes the record with `id`, if present.
    pub fn remove(&mut self, id: &str) -> Result<Option<ProcurementRecord>, StorageError> {
        let Some(index) = self.records.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        let removed = self.records.remove(index);
        self.persist()?;
        Ok(Some(removed))
    }

    /// Removes every record created on the local calendar date of `now`.
    ///
    /// Returns the number of records removed.
    pub fn clear_today(&mut self, now: DateTime<Local>) -> Result<usize, StorageError> {
        let today = now.date_naive();
        let before = self.records.len();
        self.records.retain(|r| r.local_date() != Some(today));
        let removed = before - self.records.len();
        if removed > 0 {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Drops every record and the persisted slot.
    pub fn clear_all(&mut self) -> Result<usize, StorageError> {
        let removed = self.records.len();
        self.records.clear();
        self.storage.remove(Slot::Records)?;
        Ok(removed)
    }

    fn persist(&self) -> Result<(), StorageError> {
        write_json(&self.storage, Slot::Records, &self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StoreAllocation, StoreId, Unit};
    use crate::storage::{FileStore, MemoryStore};
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    fn record(id: &str, timestamp: i64) -> ProcurementRecord {
        ProcurementRecord {
            id: id.to_string(),
            timestamp,
            supplier: "华南布行".to_string(),
            model: format!("M-{}", id),
            color: "黑色".to_string(),
            unit: Unit::Piece,
            cost_price: 10.0,
            sell_price: 20.0,
            image: String::new(),
            detail_allocations: vec![
                StoreAllocation::new(StoreId::new(1).unwrap()).with_item("黑色", 2)
            ],
        }
    }

    fn local_ms(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        Local
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .earliest()
            .unwrap()
            .timestamp_millis()
    }

    fn ids(store: &RecordStore<MemoryStore>) -> Vec<&str> {
        store.records().iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_add_prepends_new_records() {
        let mut store = RecordStore::load(MemoryStore::new());

        assert!(!store.add(record("a", 1)).unwrap());
        assert!(!store.add(record("b", 2)).unwrap());
        assert!(!store.add(record("c", 3)).unwrap());

        assert_eq!(ids(&store), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_add_existing_replaces_in_place() {
        let mut store = RecordStore::load(MemoryStore::new());
        store.add(record("a", 1)).unwrap();
        store.add(record("b", 2)).unwrap();
        store.add(record("c", 3)).unwrap();

        let mut edited = record("b", 2);
        edited.model = "edited".to_string();
        assert!(store.add(edited).unwrap());

        assert_eq!(store.len(), 3);
        assert_eq!(ids(&store), vec!["c", "b", "a"]);
        assert_eq!(store.get("b").unwrap().model, "edited");
    }

    #[test]
    fn test_remove_at_most_one() {
        let mut store = RecordStore::load(MemoryStore::new());
        store.add(record("a", 1)).unwrap();
        store.add(record("b", 2)).unwrap();

        let removed = store.remove("a").unwrap();
        assert_eq!(removed.map(|r| r.id), Some("a".to_string()));
        assert_eq!(ids(&store), vec!["b"]);

        assert!(store.remove("missing").unwrap().is_none());
        assert_eq!(ids(&store), vec!["b"]);
    }

    #[test]
    fn test_add_remove_sequence_id_set() {
        let mut store = RecordStore::load(MemoryStore::new());
        let mut expected = BTreeSet::new();

        let ops: &[(&str, bool)] = &[
            ("a", true),
            ("b", true),
            ("a", true),
            ("c", true),
            ("b", false),
            ("d", true),
            ("b", false),
            ("c", true),
            ("a", false),
        ];
        for (i, (id, add)) in ops.iter().enumerate() {
            if *add {
                store.add(record(id, i as i64)).unwrap();
                expected.insert(id.to_string());
            } else {
                store.remove(id).unwrap();
                expected.remove(*id);
            }
        }

        let actual: BTreeSet<String> = store.records().iter().map(|r| r.id.clone()).collect();
        assert_eq!(actual, expected);
        assert_eq!(store.len(), expected.len());
    }

    #[test]
    fn test_clear_today_uses_local_calendar_date() {
        let mut store = RecordStore::load(MemoryStore::new());
        store
            .add(record("yesterday-late", local_ms(2025, 3, 9, 23, 59)))
            .unwrap();
        store
            .add(record("today-early", local_ms(2025, 3, 10, 0, 1)))
            .unwrap();
        store
            .add(record("today-noon", local_ms(2025, 3, 10, 12, 0)))
            .unwrap();

        let now = Local
            .with_ymd_and_hms(2025, 3, 10, 18, 30, 0)
            .earliest()
            .unwrap();
        let removed = store.clear_today(now).unwrap();

        assert_eq!(removed, 2);
        assert_eq!(ids(&store), vec!["yesterday-late"]);
    }

    #[test]
    fn test_clear_today_nothing_to_remove() {
        let storage = MemoryStore::new();
        let mut store = RecordStore::load(storage.clone());
        store.add(record("old", local_ms(2024, 1, 1, 9, 0))).unwrap();

        let now = Local.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).earliest().unwrap();
        assert_eq!(store.clear_today(now).unwrap(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_on_date() {
        let mut store = RecordStore::load(MemoryStore::new());
        store.add(record("a", local_ms(2025, 5, 1, 8, 0))).unwrap();
        store.add(record("b", local_ms(2025, 5, 2, 8, 0))).unwrap();
        store.add(record("c", local_ms(2025, 5, 1, 20, 0))).unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let found: Vec<&str> = store.on_date(date).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(found, vec!["c", "a"]);
    }

    #[test]
    fn test_find_by_prefix() {
        let mut store = RecordStore::load(MemoryStore::new());
        store.add(record("abc123", 1)).unwrap();
        store.add(record("abd456", 2)).unwrap();

        assert_eq!(store.find_by_prefix("abc").unwrap().id, "abc123");
        assert!(store.find_by_prefix("ab").is_none());
        assert!(store.find_by_prefix("zzz").is_none());
        assert!(store.find_by_prefix("").is_none());
        assert_eq!(store.find_by_prefix("abd456").unwrap().id, "abd456");
    }

    #[test]
    fn test_persist_and_reload_preserves_order() {
        let storage = MemoryStore::new();
        let mut store = RecordStore::load(storage.clone());
        store.add(record("a", 1)).unwrap();
        store.add(record("b", 2)).unwrap();
        store.add(record("c", 3)).unwrap();
        store.remove("b").unwrap();

        let reloaded = RecordStore::load(storage);
        assert_eq!(reloaded.records(), store.records());
    }

    #[test]
    fn test_file_backed_roundtrip() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut store = RecordStore::load(FileStore::new(temp_dir.path()));
        store.add(record("a", 1)).unwrap();
        store.add(record("b", 2)).unwrap();

        let reloaded = RecordStore::load(FileStore::new(temp_dir.path()));
        assert_eq!(reloaded.records(), store.records());
    }

    #[test]
    fn test_corrupt_slot_loads_empty() {
        let storage = MemoryStore::new();
        storage.set(Slot::Records, "{not json").unwrap();

        let store = RecordStore::load(storage);
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_all_removes_slot() {
        let storage = MemoryStore::new();
        let mut store = RecordStore::load(storage.clone());
        store.add(record("a", 1)).unwrap();
        store.add(record("b", 2)).unwrap();

        assert_eq!(store.clear_all().unwrap(), 2);
        assert!(store.is_empty());
        assert!(storage.get(Slot::Records).unwrap().is_none());
    }
}
