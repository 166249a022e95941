//! Error types shared across the crate.
//!
//! Storage failures are recoverable: callers log them and carry on with the
//! in-memory state. `EngineError` is reserved for contract violations by the
//! caller, such as submitting an answer with no phrase loaded.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Collection '{0}' is defined more than once")]
    DuplicateCollection(String),

    #[error("Collection id '{0}' starts with a prefix reserved for computed collections")]
    ReservedCollectionId(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No collection is loaded")]
    NoCollectionLoaded,

    #[error("No phrase is loaded")]
    NoPhraseLoaded,

    #[error("The catalog has no collections")]
    EmptyCatalog,

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("'{0}' is a computed collection, not a catalog collection")]
    NotABaseCollection(String),

    #[error("Unknown phrase '{phrase}' in collection '{collection}'")]
    UnknownPhrase { collection: String, phrase: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Anything that can stop the command-line front end.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
