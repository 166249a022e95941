//! Builds the phrase list for a collection id.
//!
//! Plain collections come straight from the catalog. Mixed practice pulls the
//! unlearned or overdue phrases of every collection in a language. Review
//! sets resolve the learner's starred phrases. Every phrase is tagged with
//! the base collection that owns its progress record, and hidden phrases are
//! always left out.

use crate::catalog::CatalogProvider;
use crate::database::progress::ProgressStore;
use crate::database::{KeyValueStore, hidden, review};
use crate::models::progress_record::{MigrationContext, is_unlearned};
use crate::models::{Collection, CollectionKind, CollectionPhrase};
use tracing::debug;

pub struct CollectionAssembler<'a, C: ?Sized, S: ?Sized> {
    pub catalog: &'a C,
    pub store: &'a mut S,
    pub progress: &'a mut ProgressStore,
    pub ctx: MigrationContext,
}

impl<C: CatalogProvider + ?Sized, S: KeyValueStore + ?Sized> CollectionAssembler<'_, C, S> {
    /// Returns `None` when the collection does not exist or, for the virtual
    /// kinds, when it would be empty.
    pub fn assemble(&mut self, kind: &CollectionKind) -> Option<Collection> {
        let collection = match kind {
            CollectionKind::Plain(id) => self.plain(id),
            CollectionKind::MixedPractice(language) => self.mixed_practice(language),
            CollectionKind::ReviewSet(language) => self.review_set(language),
        };
        if let Some(collection) = &collection {
            debug!(
                collection = %collection.id,
                phrases = collection.phrases.len(),
                "Assembled collection"
            );
        }
        collection
    }

    fn plain(&mut self, id: &str) -> Option<Collection> {
        let base = self.catalog.collection(id)?;
        let hidden = hidden::hidden(&*self.store, id);
        let phrases = base
            .phrases
            .iter()
            .filter(|p| !hidden.contains(&p.id))
            .map(|p| CollectionPhrase::new(p.clone(), id))
            .collect();

        Some(Collection {
            id: id.to_string(),
            name: base.display_name().to_string(),
            language: base.language.clone(),
            kind: CollectionKind::Plain(id.to_string()),
            phrases,
        })
    }

    fn mixed_practice(&mut self, language: &str) -> Option<Collection> {
        let mut phrases = Vec::new();
        for id in self.catalog.collection_ids() {
            let Some(base) = self.catalog.collection(&id) else {
                continue;
            };
            if base.language != language {
                continue;
            }

            let hidden = hidden::hidden(&*self.store, &id);
            let progress = self.progress.get(&mut *self.store, &id, &self.ctx);
            for phrase in &base.phrases {
                if hidden.contains(&phrase.id) {
                    continue;
                }
                let record = progress.get(&phrase.id);
                let due = record.is_some_and(|r| r.is_due(self.ctx.now));
                if is_unlearned(record, self.ctx.required_streak) || due {
                    phrases.push(CollectionPhrase::new(phrase.clone(), id.as_str()));
                }
            }
        }

        if phrases.is_empty() {
            return None;
        }
        let kind = CollectionKind::MixedPractice(language.to_string());
        Some(Collection {
            id: kind.id(),
            name: format!("Mixed practice: {language}"),
            language: language.to_string(),
            kind,
            phrases,
        })
    }

    fn review_set(&mut self, language: &str) -> Option<Collection> {
        let mut phrases = Vec::new();
        for entry in review::starred(&*self.store, language) {
            let Some(base) = self.catalog.collection(&entry.collection_id) else {
                continue;
            };
            if hidden::hidden(&*self.store, &entry.collection_id).contains(&entry.phrase_id) {
                continue;
            }
            if let Some(phrase) = base.phrase(&entry.phrase_id) {
                phrases.push(CollectionPhrase::new(phrase.clone(), entry.collection_id.as_str()));
            }
        }

        if phrases.is_empty() {
            return None;
        }
        let kind = CollectionKind::ReviewSet(language.to_string());
        Some(Collection {
            id: kind.id(),
            name: format!("Review: {language}"),
            language: language.to_string(),
            kind,
            phrases,
        })
    }
}
