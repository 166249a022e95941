//! Phrases the learner has hidden from a collection.
use super::{KeyValueStore, keys};
use crate::error::StorageError;
use std::collections::BTreeSet;
use tracing::warn;

pub fn hidden<S: KeyValueStore + ?Sized>(store: &S, collection_id: &str) -> BTreeSet<String> {
    match store.read(&keys::hidden(collection_id)) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(collection = collection_id, error = %e, "Failed to parse hidden phrases");
            BTreeSet::new()
        }),
        Ok(None) => BTreeSet::new(),
        Err(e) => {
            warn!(collection = collection_id, error = %e, "Failed to read hidden phrases");
            BTreeSet::new()
        }
    }
}

pub fn hide<S: KeyValueStore + ?Sized>(store: &mut S, collection_id: &str, phrase_id: &str) {
    let mut set = hidden(store, collection_id);
    if set.insert(phrase_id.to_string()) {
        save(store, collection_id, &set);
    }
}

pub fn unhide<S: KeyValueStore + ?Sized>(store: &mut S, collection_id: &str, phrase_id: &str) {
    let mut set = hidden(store, collection_id);
    if set.remove(phrase_id) {
        save(store, collection_id, &set);
    }
}

fn save<S: KeyValueStore + ?Sized>(store: &mut S, collection_id: &str, set: &BTreeSet<String>) {
    let result = serde_json::to_string(set)
        .map_err(StorageError::from)
        .and_then(|json| store.write(&keys::hidden(collection_id), &json));
    if let Err(e) = result {
        warn!(collection = collection_id, error = %e, "Failed to save hidden phrases");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    #[test]
    fn test_hide_and_unhide() {
        let mut store = MemoryStore::new();
        hide(&mut store, "travel", "p2");
        hide(&mut store, "travel", "p1");

        let set = hidden(&store, "travel");
        assert!(set.contains("p1") && set.contains("p2"));
        assert!(hidden(&store, "food").is_empty());

        unhide(&mut store, "travel", "p1");
        assert_eq!(
            store.read("langlearn_hidden_travel").unwrap().as_deref(),
            Some(r#"["p2"]"#)
        );
    }
}
