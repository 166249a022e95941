//! Starred phrases, kept as one list per language.
use super::{KeyValueStore, keys};
use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Reference to a starred phrase in its base collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarredPhrase {
    #[serde(rename = "setId")]
    pub collection_id: String,
    #[serde(rename = "phraseId")]
    pub phrase_id: String,
}

impl StarredPhrase {
    pub fn new(collection_id: &str, phrase_id: &str) -> Self {
        Self {
            collection_id: collection_id.to_string(),
            phrase_id: phrase_id.to_string(),
        }
    }
}

pub fn starred<S: KeyValueStore + ?Sized>(store: &S, language: &str) -> Vec<StarredPhrase> {
    let key = keys::review_set(language);
    match store.read(&key) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(language, error = %e, "Failed to parse starred list");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(language, error = %e, "Failed to read starred list");
            Vec::new()
        }
    }
}

fn save<S: KeyValueStore + ?Sized>(store: &mut S, language: &str, list: &[StarredPhrase]) {
    let key = keys::review_set(language);
    let result = serde_json::to_string(list)
        .map_err(StorageError::from)
        .and_then(|json| store.write(&key, &json));
    if let Err(e) = result {
        warn!(language, error = %e, "Failed to save starred list");
    }
}

pub fn is_starred<S: KeyValueStore + ?Sized>(
    store: &S,
    language: &str,
    collection_id: &str,
    phrase_id: &str,
) -> bool {
    let target = StarredPhrase::new(collection_id, phrase_id);
    starred(store, language).contains(&target)
}

pub fn star<S: KeyValueStore + ?Sized>(
    store: &mut S,
    language: &str,
    collection_id: &str,
    phrase_id: &str,
) {
    let mut list = starred(store, language);
    let entry = StarredPhrase::new(collection_id, phrase_id);
    if !list.contains(&entry) {
        list.push(entry);
        save(store, language, &list);
    }
}

pub fn unstar<S: KeyValueStore + ?Sized>(
    store: &mut S,
    language: &str,
    collection_id: &str,
    phrase_id: &str,
) {
    let target = StarredPhrase::new(collection_id, phrase_id);
    let mut list = starred(store, language);
    list.retain(|entry| entry != &target);
    save(store, language, &list);
}

/// Languages that currently have at least one starred phrase.
pub fn starred_languages<S: KeyValueStore + ?Sized>(store: &S) -> Vec<String> {
    let found = match store.keys_with_prefix(keys::REVIEW_SET_PREFIX) {
        Ok(found) => found,
        Err(e) => {
            warn!(error = %e, "Failed to list starred lists");
            return Vec::new();
        }
    };

    found
        .iter()
        .filter_map(|key| key.strip_prefix(keys::REVIEW_SET_PREFIX))
        .filter(|language| !starred(store, language).is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    #[test]
    fn test_star_is_idempotent() {
        let mut store = MemoryStore::new();
        star(&mut store, "de", "travel", "p1");
        star(&mut store, "de", "travel", "p1");

        assert_eq!(starred(&store, "de"), vec![StarredPhrase::new("travel", "p1")]);
        assert!(is_starred(&store, "de", "travel", "p1"));
        assert!(!is_starred(&store, "pl", "travel", "p1"));
    }

    #[test]
    fn test_unstar() {
        let mut store = MemoryStore::new();
        star(&mut store, "de", "travel", "p1");
        star(&mut store, "de", "food", "p1");
        unstar(&mut store, "de", "travel", "p1");

        assert_eq!(starred(&store, "de"), vec![StarredPhrase::new("food", "p1")]);
    }

    #[test]
    fn test_stored_shape() {
        let mut store = MemoryStore::new();
        star(&mut store, "de", "travel", "p1");

        assert_eq!(
            store.read("langlearn_review_set_de").unwrap().as_deref(),
            Some(r#"[{"setId":"travel","phraseId":"p1"}]"#)
        );
    }

    #[test]
    fn test_starred_languages_skips_empty_lists() {
        let mut store = MemoryStore::new();
        star(&mut store, "de", "travel", "p1");
        star(&mut store, "pl", "greetings", "p2");
        unstar(&mut store, "pl", "greetings", "p2");

        assert_eq!(starred_languages(&store), vec!["de".to_string()]);
    }
}
