//! Loading a catalog from JSON.
//! The file holds an array of collections, each with its phrases.

use super::Catalog;
use crate::error::CatalogError;
use crate::models::BaseCollection;
use std::fs;
use std::path::Path;
use tracing::info;

/// Reads a catalog file. Fails if the file is missing, is not valid JSON, or
/// defines a collection id twice.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, CatalogError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let catalog = parse_catalog(&contents)?;

    info!(
        path = %path.display(),
        collections = catalog.collections().len(),
        "Catalog loaded"
    );
    Ok(catalog)
}

pub fn parse_catalog(contents: &str) -> Result<Catalog, CatalogError> {
    let collections: Vec<BaseCollection> = serde_json::from_str(contents)?;
    Catalog::new(collections)
}
