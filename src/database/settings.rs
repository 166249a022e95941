//! Loading and saving settings. Each setting is its own plain-string key.
use super::{KeyValueStore, keys};
use crate::models::{ExerciseMode, Settings};
use tracing::warn;

fn read_value<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Option<String> {
    store.read(key).unwrap_or_else(|e| {
        warn!(key, error = %e, "Failed to read setting");
        None
    })
}

fn read_bool<S: KeyValueStore + ?Sized>(store: &S, key: &str, default: bool) -> bool {
    match read_value(store, key).as_deref() {
        Some("true") => true,
        Some("false") => false,
        _ => default,
    }
}

/// Loads settings, falling back to the default for every missing or
/// unreadable value.
pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Settings {
    let defaults = Settings::default();

    let required_streak = read_value(store, keys::REQUIRED_STREAK)
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(defaults.required_streak);

    let exercise_mode = if read_bool(store, keys::EXERCISE_MODE, true) {
        ExerciseMode::ActiveRecall
    } else {
        ExerciseMode::ShowAnswer
    };

    Settings {
        required_streak,
        immediate_retry: read_bool(store, keys::IMMEDIATE_RETRY, defaults.immediate_retry),
        exercise_mode,
        reverse_mode: read_bool(store, keys::REVERSE_MODE, defaults.reverse_mode),
    }
}

pub fn save<S: KeyValueStore + ?Sized>(store: &mut S, settings: &Settings) {
    let active_recall = settings.exercise_mode == ExerciseMode::ActiveRecall;
    let values = [
        (keys::REQUIRED_STREAK, settings.required_streak.to_string()),
        (keys::IMMEDIATE_RETRY, settings.immediate_retry.to_string()),
        (keys::EXERCISE_MODE, active_recall.to_string()),
        (keys::REVERSE_MODE, settings.reverse_mode.to_string()),
    ];
    for (key, value) in values {
        if let Err(e) = store.write(key, &value) {
            warn!(key, error = %e, "Failed to save setting");
        }
    }
}

pub fn last_collection<S: KeyValueStore + ?Sized>(store: &S) -> Option<String> {
    read_value(store, keys::LAST_COLLECTION).filter(|id| !id.is_empty())
}

pub fn save_last_collection<S: KeyValueStore + ?Sized>(store: &mut S, collection_id: &str) {
    if let Err(e) = store.write(keys::LAST_COLLECTION, collection_id) {
        warn!(collection = collection_id, error = %e, "Failed to save last collection");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    #[test]
    fn test_defaults_when_empty() {
        let store = MemoryStore::new();
        assert_eq!(load(&store), Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            required_streak: 3,
            immediate_retry: false,
            exercise_mode: ExerciseMode::ShowAnswer,
            reverse_mode: true,
        };

        save(&mut store, &settings);

        assert_eq!(load(&store), settings);
    }

    #[test]
    fn test_garbage_values_fall_back() {
        let mut store = MemoryStore::new();
        store.insert_raw("langlearn_required_streak", "lots");
        store.insert_raw("langlearn_immediate_retry", "maybe");

        let settings = load(&store);
        assert_eq!(settings.required_streak, 2);
        assert!(settings.immediate_retry);
    }

    #[test]
    fn test_last_collection() {
        let mut store = MemoryStore::new();
        assert_eq!(last_collection(&store), None);

        save_last_collection(&mut store, "mixed_de");
        assert_eq!(last_collection(&store).as_deref(), Some("mixed_de"));
    }
}
