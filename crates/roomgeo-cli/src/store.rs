//! In-memory `LocationStore` backing the `batch` command.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Mutex, PoisonError};

use roomgeo_core::{LocationRecord, LocationUpdate};
use roomgeo_geocoder::LocationStore;

#[derive(Debug)]
pub(crate) struct UnknownRecord(String);

impl fmt::Display for UnknownRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record {} is not in the records file", self.0)
    }
}

/// Collects persisted updates by record id. They are written back to the
/// records with [`MemoryStore::apply_to`] once the batch has finished.
pub(crate) struct MemoryStore {
    known_ids: HashSet<String>,
    updates: Mutex<HashMap<String, LocationUpdate>>,
}

impl MemoryStore {
    pub(crate) fn for_records(records: &[LocationRecord]) -> Self {
        Self {
            known_ids: records.iter().map(|r| r.id.clone()).collect(),
            updates: Mutex::new(HashMap::new()),
        }
    }

    /// Applies every collected update to its record and returns how many
    /// records changed.
    pub(crate) fn apply_to(&self, records: &mut [LocationRecord]) -> usize {
        let updates = self.updates.lock().unwrap_or_else(PoisonError::into_inner);
        let mut applied = 0;
        for record in records.iter_mut() {
            if let Some(update) = updates.get(&record.id) {
                record.apply_update(update);
                applied += 1;
            }
        }
        applied
    }
}

impl LocationStore for MemoryStore {
    type Error = UnknownRecord;

    async fn persist(&self, record_id: &str, update: &LocationUpdate) -> Result<(), UnknownRecord> {
        if !self.known_ids.contains(record_id) {
            return Err(UnknownRecord(record_id.to_owned()));
        }
        self.updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(record_id.to_owned(), update.clone());
        Ok(())
    }
}
