//! Storage for vocabulary mastery.
use super::{KeyValueStore, keys};
use crate::error::StorageError;
use crate::models::Phrase;
use crate::models::vocabulary::{self, VocabMastery};
use tracing::warn;

pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> VocabMastery {
    match store.read(keys::VOCAB_MASTERY) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to parse vocabulary mastery");
            VocabMastery::new()
        }),
        Ok(None) => VocabMastery::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read vocabulary mastery");
            VocabMastery::new()
        }
    }
}

pub fn save<S: KeyValueStore + ?Sized>(store: &mut S, mastery: &VocabMastery) {
    let result = serde_json::to_string(mastery)
        .map_err(StorageError::from)
        .and_then(|json| store.write(keys::VOCAB_MASTERY, &json));
    if let Err(e) = result {
        warn!(error = %e, "Failed to save vocabulary mastery");
    }
}

/// Loads, updates and saves mastery for the words of one answered phrase.
pub fn record_answer<S: KeyValueStore + ?Sized>(
    store: &mut S,
    phrase: &Phrase,
    correct: bool,
    collection_id: &str,
) {
    if phrase.vocabulary.is_none() {
        return;
    }
    let mut mastery = load(store);
    if vocabulary::record_answer(&mut mastery, phrase, correct, collection_id) {
        save(store, &mastery);
    }
}
