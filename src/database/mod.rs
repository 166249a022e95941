//! Persistence behind a narrow key-value interface.
//!
//! Everything the engine stores is a JSON (or plain string) value under a
//! deterministic key, so any backend that can read, write and delete strings
//! works. `db::SqliteStore` is the durable backend, `memory::MemoryStore` is
//! used in tests and for sessions that should not survive a restart.

pub mod db;
pub mod hidden;
pub mod memory;
pub mod progress;
pub mod review;
pub mod settings;
pub mod vocab;

pub use db::SqliteStore;
pub use memory::MemoryStore;
pub use progress::ProgressStore;

use crate::error::StorageResult;

pub trait KeyValueStore {
    fn read(&self, key: &str) -> StorageResult<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> StorageResult<()>;
    fn delete(&mut self, key: &str) -> StorageResult<()>;
    fn keys_with_prefix(&self, prefix: &str) -> StorageResult<Vec<String>>;
}

/// Key naming scheme for everything the engine persists.
pub mod keys {
    pub const LAST_COLLECTION: &str = "langlearn_last_set";
    pub const EXERCISE_MODE: &str = "langlearn_speech_enabled";
    pub const REQUIRED_STREAK: &str = "langlearn_required_streak";
    pub const IMMEDIATE_RETRY: &str = "langlearn_immediate_retry";
    pub const REVERSE_MODE: &str = "langlearn_reverse_mode";
    pub const VOCAB_MASTERY: &str = "langlearn_vocab_mastery";
    pub const REVIEW_SET_PREFIX: &str = "langlearn_review_set_";

    pub fn progress(collection_id: &str) -> String {
        format!("langlearn_progress_{collection_id}")
    }

    pub fn review_set(language: &str) -> String {
        format!("{REVIEW_SET_PREFIX}{language}")
    }

    pub fn hidden(collection_id: &str) -> String {
        format!("langlearn_hidden_{collection_id}")
    }
}
