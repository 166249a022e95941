//! Collections of phrases: base collections from the catalog and the
//! virtual ones (mixed practice, starred review) computed from them.
use super::Phrase;
use serde::{Deserialize, Serialize};

const MIXED_PREFIX: &str = "mixed_";
const REVIEW_PREFIX: &str = "review_";

/// A collection as it appears in the catalog.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BaseCollection {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub language: String,
    pub phrases: Vec<Phrase>,
}

impl BaseCollection {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { &self.id } else { &self.name }
    }

    pub fn phrase(&self, phrase_id: &str) -> Option<&Phrase> {
        self.phrases.iter().find(|p| p.id == phrase_id)
    }
}

/// Which assembler produced a collection, parsed from its id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CollectionKind {
    Plain(String),
    MixedPractice(String),
    ReviewSet(String),
}

impl CollectionKind {
    /// Whether `id` uses a prefix reserved for computed collections.
    pub fn is_reserved_id(id: &str) -> bool {
        id.starts_with(MIXED_PREFIX) || id.starts_with(REVIEW_PREFIX)
    }

    pub fn from_id(id: &str) -> Self {
        if let Some(language) = id.strip_prefix(REVIEW_PREFIX) {
            CollectionKind::ReviewSet(language.to_string())
        } else if let Some(language) = id.strip_prefix(MIXED_PREFIX) {
            CollectionKind::MixedPractice(language.to_string())
        } else {
            CollectionKind::Plain(id.to_string())
        }
    }

    pub fn id(&self) -> String {
        match self {
            CollectionKind::Plain(id) => id.clone(),
            CollectionKind::MixedPractice(language) => format!("{MIXED_PREFIX}{language}"),
            CollectionKind::ReviewSet(language) => format!("{REVIEW_PREFIX}{language}"),
        }
    }
}

/// A phrase inside an assembled collection, tagged with the base collection
/// whose progress record it reads and writes.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionPhrase {
    pub phrase: Phrase,
    pub source_collection_id: String,
}

impl CollectionPhrase {
    pub fn new(phrase: Phrase, source_collection_id: impl Into<String>) -> Self {
        Self {
            phrase,
            source_collection_id: source_collection_id.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.phrase.id
    }
}

#[derive(Clone, Debug)]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub language: String,
    pub kind: CollectionKind,
    pub phrases: Vec<CollectionPhrase>,
}

impl Collection {
    pub fn is_mixed_practice(&self) -> bool {
        matches!(self.kind, CollectionKind::MixedPractice(_))
    }

    pub fn is_review_set(&self) -> bool {
        matches!(self.kind, CollectionKind::ReviewSet(_))
    }

    pub fn is_virtual(&self) -> bool {
        self.is_mixed_practice() || self.is_review_set()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectionStats {
    pub total: usize,
    pub learned: usize,
    pub remaining: usize,
}
