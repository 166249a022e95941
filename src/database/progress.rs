//! Progress records per collection.
//!
//! Reads never fail: unreadable or corrupt data is logged and treated as "no
//! progress". Writes that fail are logged and swallowed. The store keeps
//! what it has read and written in a session cache, so the current session
//! keeps seeing its own updates even when they could not be persisted; they
//! are lost on restart.

use super::{KeyValueStore, keys};
use crate::models::progress_record::{MigrationContext, StoredProgress, migrate};
use crate::models::{ProgressMap, ProgressRecord};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct ProgressStore {
    cache: HashMap<String, ProgressMap>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records for a collection, migrating older stored shapes on first
    /// read.
    pub fn get<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        collection_id: &str,
        ctx: &MigrationContext,
    ) -> &ProgressMap {
        self.cache
            .entry(collection_id.to_string())
            .or_insert_with(|| load(store, collection_id, ctx))
    }

    pub fn record<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        collection_id: &str,
        phrase_id: &str,
        ctx: &MigrationContext,
    ) -> Option<ProgressRecord> {
        self.get(store, collection_id, ctx).get(phrase_id).cloned()
    }

    /// Replaces every record of a collection with a single write. Returns
    /// whether the write reached storage.
    pub fn set<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        collection_id: &str,
        progress: ProgressMap,
    ) -> bool {
        let saved = persist(store, &keys::progress(collection_id), &progress);
        self.cache.insert(collection_id.to_string(), progress);
        saved
    }

    /// Read-modify-write of one phrase's record.
    pub fn put_record<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        collection_id: &str,
        phrase_id: &str,
        record: ProgressRecord,
        ctx: &MigrationContext,
    ) -> bool {
        let mut progress = self.get(store, collection_id, ctx).clone();
        progress.insert(phrase_id.to_string(), record);
        self.set(store, collection_id, progress)
    }

    /// Deletes all records of a collection.
    pub fn reset<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, collection_id: &str) {
        if let Err(e) = store.delete(&keys::progress(collection_id)) {
            warn!(collection = collection_id, error = %e, "Failed to delete progress");
        }
        self.cache.insert(collection_id.to_string(), ProgressMap::new());
    }
}

fn load<S: KeyValueStore + ?Sized>(
    store: &mut S,
    collection_id: &str,
    ctx: &MigrationContext,
) -> ProgressMap {
    let key = keys::progress(collection_id);
    let raw = match store.read(&key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return ProgressMap::new(),
        Err(e) => {
            warn!(collection = collection_id, error = %e, "Failed to read progress");
            return ProgressMap::new();
        }
    };

    let value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(collection = collection_id, error = %e, "Failed to parse progress");
            return ProgressMap::new();
        }
    };

    let entries = match StoredProgress::classify(value) {
        Some(StoredProgress::Records(entries)) => entries,
        Some(StoredProgress::LegacyFlags) => {
            info!(collection = collection_id, "Discarding legacy boolean progress");
            return ProgressMap::new();
        }
        None => {
            warn!(collection = collection_id, "Progress is not an object, ignoring");
            return ProgressMap::new();
        }
    };

    let mut progress = ProgressMap::new();
    let mut needs_save = false;
    for (phrase_id, value) in &entries {
        match migrate(value, ctx) {
            Some(migrated) => {
                needs_save |= migrated.changed;
                progress.insert(phrase_id.clone(), migrated.record);
            }
            None => {
                debug!(collection = collection_id, phrase = %phrase_id, "Dropping unreadable record");
                needs_save = true;
            }
        }
    }

    if needs_save {
        info!(collection = collection_id, records = progress.len(), "Migrated progress");
        persist(store, &key, &progress);
    }
    progress
}

fn persist<S: KeyValueStore + ?Sized>(store: &mut S, key: &str, progress: &ProgressMap) -> bool {
    let json = match serde_json::to_string(progress) {
        Ok(json) => json,
        Err(e) => {
            warn!(key, error = %e, "Failed to serialize progress");
            return false;
        }
    };
    match store.write(key, &json) {
        Ok(()) => true,
        Err(e) => {
            warn!(key, error = %e, "Failed to save progress, keeping it for this session only");
            false
        }
    }
}
