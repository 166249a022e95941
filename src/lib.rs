pub mod answer;
pub mod assembler;
pub mod catalog;
pub mod clock;
pub mod database;
pub mod engine;
pub mod error;
pub mod models;
pub mod scheduling;

pub use catalog::{Catalog, CatalogProvider};
pub use clock::{Clock, ManualClock, SystemClock};
pub use database::{KeyValueStore, MemoryStore, SqliteStore};
pub use engine::{Engine, Next, SessionState, StarToggle, SubmitOutcome};
pub use error::{CatalogError, EngineError, Error, StorageError};
pub use models::{
    BaseCollection, Collection, CollectionKind, CollectionPhrase, CollectionStats, ExerciseMode,
    Phrase, ProgressRecord, Settings,
};
