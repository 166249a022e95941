//! The phrase catalog: read-only base collections, static for a session.

pub mod json;

use crate::error::CatalogError;
use crate::models::{BaseCollection, CollectionKind};
use std::collections::HashSet;

pub trait CatalogProvider {
    fn collection(&self, id: &str) -> Option<&BaseCollection>;
    /// Collection ids in catalog order.
    fn collection_ids(&self) -> Vec<String>;
}

/// Catalog held in memory, in the order collections were given.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    collections: Vec<BaseCollection>,
}

impl Catalog {
    pub fn new(collections: Vec<BaseCollection>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for collection in &collections {
            if CollectionKind::is_reserved_id(&collection.id) {
                return Err(CatalogError::ReservedCollectionId(collection.id.clone()));
            }
            if !seen.insert(collection.id.as_str()) {
                return Err(CatalogError::DuplicateCollection(collection.id.clone()));
            }
        }
        Ok(Self { collections })
    }

    pub fn collections(&self) -> &[BaseCollection] {
        &self.collections
    }
}

impl CatalogProvider for Catalog {
    fn collection(&self, id: &str) -> Option<&BaseCollection> {
        self.collections.iter().find(|c| c.id == id)
    }

    fn collection_ids(&self) -> Vec<String> {
        self.collections.iter().map(|c| c.id.clone()).collect()
    }
}
