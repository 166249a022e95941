//! The caller-facing engine.
//!
//! `Engine` owns the collaborators (storage, catalog, clock, random source)
//! and the process-wide caches. Everything about the learner's current
//! session lives in a `SessionState` owned by the caller and passed into each
//! operation, so a UI layer can keep as many sessions as it likes.
//!
//! Typical flow: `open_collection`, then repeatedly `load_next` and `submit`.

use crate::answer;
use crate::assembler::CollectionAssembler;
use crate::catalog::CatalogProvider;
use crate::clock::{Clock, SystemClock};
use crate::database::progress::ProgressStore;
use crate::database::{KeyValueStore, hidden, review, settings as stored_settings, vocab};
use crate::error::EngineError;
use crate::models::progress_record::{MigrationContext, is_unlearned};
use crate::models::vocabulary::{WeakWord, weak_vocabulary};
use crate::models::{
    Collection, CollectionKind, CollectionPhrase, CollectionStats, ProgressRecord, RetryOutcome,
    RetrySession, Settings, sm2,
};
use crate::scheduling::{
    GLOBAL_REMINDER_RATIO, OverdueCache, OverduePhrase, overdue_priority, pick_reminder,
    select_next,
};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

pub type EngineResult<T> = Result<T, EngineError>;

/// What the learner is doing right now.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    collection: Option<Collection>,
    current: Option<CollectionPhrase>,
    retry: RetrySession,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collection(&self) -> Option<&Collection> {
        self.collection.as_ref()
    }

    pub fn current_phrase(&self) -> Option<&CollectionPhrase> {
        self.current.as_ref()
    }

    pub fn retry(&self) -> &RetrySession {
        &self.retry
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Next {
    Phrase(CollectionPhrase),
    /// Every phrase in the collection is learned.
    AllLearned,
}

/// A progress update written for one answer.
#[derive(Clone, Debug, PartialEq)]
pub struct Recorded {
    pub record: ProgressRecord,
    /// False when storage rejected the write; the update then only lasts for
    /// this session.
    pub persisted: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// A normal answer: progress was updated.
    Recorded {
        recorded: Recorded,
        retry_started: bool,
    },
    /// An answer during immediate retry: practice only, progress untouched.
    Practiced(RetryOutcome),
}

#[derive(Clone, Debug, PartialEq)]
pub enum StarToggle {
    Starred,
    Unstarred,
    /// Unstarred from inside the review set; the set was rebuilt and this
    /// is what comes next.
    RemovedFromReview(Next),
}

/// One entry of the collection index.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionEntry {
    pub id: String,
    pub name: String,
    pub language: String,
    pub kind: CollectionKind,
}

pub struct Engine<S, C> {
    store: S,
    catalog: C,
    clock: Box<dyn Clock>,
    rng: StdRng,
    settings: Settings,
    progress: ProgressStore,
    overdue: OverdueCache,
}

impl<S: KeyValueStore, C: CatalogProvider> Engine<S, C> {
    /// Creates an engine with the system clock, an entropy-seeded random
    /// source and settings loaded from `store`.
    pub fn new(store: S, catalog: C) -> Self {
        let settings = stored_settings::load(&store);
        Self {
            store,
            catalog,
            clock: Box::new(SystemClock),
            rng: StdRng::from_os_rng(),
            settings,
            progress: ProgressStore::new(),
            overdue: OverdueCache::new(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn ctx(&self) -> MigrationContext {
        MigrationContext {
            required_streak: self.settings.required_streak,
            now: self.clock.now(),
        }
    }

    /// Saves new settings. Turning immediate retry on or off, or switching
    /// exercise mode, abandons any retry in progress.
    pub fn update_settings(&mut self, state: &mut SessionState, settings: Settings) {
        if settings.immediate_retry != self.settings.immediate_retry
            || settings.exercise_mode != self.settings.exercise_mode
        {
            state.retry.clear();
        }
        stored_settings::save(&mut self.store, &settings);
        self.settings = settings;
    }

    fn assemble(&mut self, kind: &CollectionKind) -> Option<Collection> {
        let ctx = self.ctx();
        CollectionAssembler {
            catalog: &self.catalog,
            store: &mut self.store,
            progress: &mut self.progress,
            ctx,
        }
        .assemble(kind)
    }

    fn first_base_collection(&mut self) -> EngineResult<Collection> {
        let first = self
            .catalog
            .collection_ids()
            .into_iter()
            .next()
            .ok_or(EngineError::EmptyCatalog)?;
        self.assemble(&CollectionKind::Plain(first.clone()))
            .ok_or(EngineError::UnknownCollection(first))
    }

    /// Assembles `kind`, or the first catalog collection when a computed
    /// collection turns out empty.
    fn assemble_or_fallback(&mut self, kind: &CollectionKind) -> EngineResult<Collection> {
        match (self.assemble(kind), kind) {
            (Some(collection), _) => Ok(collection),
            (None, CollectionKind::Plain(id)) => Err(EngineError::UnknownCollection(id.clone())),
            (None, _) => {
                info!(collection = %kind.id(), "Collection is empty, falling back");
                self.first_base_collection()
            }
        }
    }

    /// Makes `collection_id` the active collection and returns the id that
    /// was actually opened.
    pub fn open_collection(
        &mut self,
        state: &mut SessionState,
        collection_id: &str,
    ) -> EngineResult<String> {
        let collection = self.assemble_or_fallback(&CollectionKind::from_id(collection_id))?;
        let id = collection.id.clone();

        info!(collection = %id, phrases = collection.phrases.len(), "Opened collection");
        stored_settings::save_last_collection(&mut self.store, &id);
        state.collection = Some(collection);
        state.current = None;
        state.retry.clear();
        Ok(id)
    }

    /// Reopens the collection from the previous session, or the first one.
    pub fn open_last(&mut self, state: &mut SessionState) -> EngineResult<String> {
        if let Some(last) = stored_settings::last_collection(&self.store) {
            match self.open_collection(state, &last) {
                Ok(id) => return Ok(id),
                Err(e) => warn!(collection = %last, error = %e, "Cannot reopen last collection"),
            }
        }
        let first = self
            .catalog
            .collection_ids()
            .into_iter()
            .next()
            .ok_or(EngineError::EmptyCatalog)?;
        self.open_collection(state, &first)
    }

    /// Progress record of a phrase, read from its source collection.
    pub fn record_of(&mut self, phrase: &CollectionPhrase) -> Option<ProgressRecord> {
        let ctx = self.ctx();
        self.progress
            .record(&mut self.store, &phrase.source_collection_id, phrase.id(), &ctx)
    }

    /// Phrases of `collection` still to practice, in collection order: the
    /// unlearned ones, plus learned ones due for review in mixed practice.
    pub fn pending_phrases(&mut self, collection: &Collection) -> Vec<CollectionPhrase> {
        let required = self.settings.required_streak;
        let now = self.clock.now();
        let include_due = collection.is_mixed_practice();
        collection
            .phrases
            .iter()
            .filter(|p| {
                let record = self.record_of(p);
                is_unlearned(record.as_ref(), required)
                    || (include_due && record.is_some_and(|r| r.is_due(now)))
            })
            .cloned()
            .collect()
    }

    pub fn collection_stats(&mut self, collection: &Collection) -> CollectionStats {
        let total = collection.phrases.len();
        let remaining = self.pending_phrases(collection).len();
        CollectionStats {
            total,
            learned: total - remaining,
            remaining,
        }
    }

    /// Stats of the active collection.
    pub fn stats(&mut self, state: &SessionState) -> EngineResult<CollectionStats> {
        let collection = state.collection.as_ref().ok_or(EngineError::NoCollectionLoaded)?;
        Ok(self.collection_stats(collection))
    }

    /// Stats of any collection id. An empty computed collection has all
    /// counts at zero.
    pub fn stats_for(&mut self, collection_id: &str) -> EngineResult<CollectionStats> {
        let kind = CollectionKind::from_id(collection_id);
        match (self.assemble(&kind), kind) {
            (Some(collection), _) => Ok(self.collection_stats(&collection)),
            (None, CollectionKind::Plain(id)) => Err(EngineError::UnknownCollection(id)),
            (None, _) => Ok(CollectionStats::default()),
        }
    }

    /// Overdue phrases of `language` outside `exclude_collection_id`, most
    /// overdue first.
    fn global_overdue(
        &mut self,
        language: &str,
        exclude_collection_id: &str,
        now: DateTime<Utc>,
    ) -> Vec<OverduePhrase> {
        let ctx = self.ctx();
        let Self {
            store,
            catalog,
            progress,
            overdue,
            ..
        } = self;

        overdue.overdue_excluding(language, exclude_collection_id, now, || {
            let mut found = Vec::new();
            for id in catalog.collection_ids() {
                let Some(base) = catalog.collection(&id) else {
                    continue;
                };
                if base.language != language {
                    continue;
                }
                let hidden = hidden::hidden(&*store, &id);
                let records = progress.get(&mut *store, &id, &ctx);
                for phrase in &base.phrases {
                    if hidden.contains(&phrase.id) {
                        continue;
                    }
                    let due = records.get(&phrase.id).and_then(|r| r.next_review_date);
                    if let Some(due) = due.filter(|&due| now >= due) {
                        found.push(OverduePhrase {
                            phrase: CollectionPhrase::new(phrase.clone(), id.as_str()),
                            priority: overdue_priority(due, now),
                        });
                    }
                }
            }
            found
        })
    }

    fn choose(
        &mut self,
        collection: &Collection,
        candidates: &[CollectionPhrase],
    ) -> Option<CollectionPhrase> {
        let now = self.clock.now();

        if !collection.is_virtual() {
            let overdue = self.global_overdue(&collection.language, &collection.id, now);
            if !overdue.is_empty() && self.rng.random::<f64>() < GLOBAL_REMINDER_RATIO {
                if let Some(reminder) = pick_reminder(&overdue, &mut self.rng) {
                    debug!(
                        phrase = reminder.id(),
                        source = %reminder.source_collection_id,
                        "Showing reminder from another collection"
                    );
                    return Some(reminder.clone());
                }
            }
        }

        let ctx = self.ctx();
        let Self {
            store,
            progress,
            rng,
            ..
        } = self;
        select_next(
            candidates,
            |c| progress.record(&mut *store, &c.source_collection_id, c.id(), &ctx),
            now,
            rng,
        )
        .cloned()
    }

    /// Picks the phrase to show next and makes it current. During immediate
    /// retry the retried phrase comes back without consulting the scheduler.
    pub fn load_next(&mut self, state: &mut SessionState) -> EngineResult<Next> {
        if self.settings.retry_enabled() {
            if let Some(phrase) = state.retry.current() {
                state.current = Some(phrase.clone());
                return Ok(Next::Phrase(phrase.clone()));
            }
        }

        let collection = state.collection.as_ref().ok_or(EngineError::NoCollectionLoaded)?;
        let pending = self.pending_phrases(collection);
        let picked = if pending.is_empty() {
            None
        } else {
            self.choose(collection, &pending)
        };

        state.current = picked.clone();
        Ok(match picked {
            Some(phrase) => {
                debug!(phrase = phrase.id(), source = %phrase.source_collection_id, "Next phrase");
                Next::Phrase(phrase)
            }
            None => Next::AllLearned,
        })
    }

    /// Applies one answer to a phrase's stored progress.
    pub fn record_answer(
        &mut self,
        collection_id: &str,
        phrase_id: &str,
        correct: bool,
    ) -> EngineResult<Recorded> {
        let base = self
            .catalog
            .collection(collection_id)
            .ok_or_else(|| match CollectionKind::from_id(collection_id) {
                CollectionKind::Plain(_) => EngineError::UnknownCollection(collection_id.to_string()),
                _ => EngineError::NotABaseCollection(collection_id.to_string()),
            })?;
        if base.phrase(phrase_id).is_none() {
            return Err(EngineError::UnknownPhrase {
                collection: collection_id.to_string(),
                phrase: phrase_id.to_string(),
            });
        }

        let ctx = self.ctx();
        let current = self
            .progress
            .record(&mut self.store, collection_id, phrase_id, &ctx)
            .unwrap_or_default();
        let record = sm2::apply_answer(&current, correct, ctx.now);
        let persisted =
            self.progress
                .put_record(&mut self.store, collection_id, phrase_id, record.clone(), &ctx);

        debug!(
            collection = collection_id,
            phrase = phrase_id,
            correct,
            streak = record.correct_streak,
            interval = record.interval,
            "Recorded answer"
        );
        Ok(Recorded { record, persisted })
    }

    /// Submits the learner's answer for the current phrase.
    pub fn submit(&mut self, state: &mut SessionState, correct: bool) -> EngineResult<SubmitOutcome> {
        let phrase = state.current.clone().ok_or(EngineError::NoPhraseLoaded)?;

        if self.settings.retry_enabled() && state.retry.is_active() {
            return Ok(SubmitOutcome::Practiced(state.retry.record(correct)));
        }

        let recorded = self.record_answer(&phrase.source_collection_id, phrase.id(), correct)?;
        vocab::record_answer(
            &mut self.store,
            &phrase.phrase,
            correct,
            &phrase.source_collection_id,
        );

        let retry_started = !correct && self.settings.retry_enabled();
        if retry_started {
            state.retry.begin(phrase);
        }
        Ok(SubmitOutcome::Recorded {
            recorded,
            retry_started,
        })
    }

    /// Checks a typed or recognized response against the current phrase.
    pub fn check_response(&self, state: &SessionState, response: &str) -> EngineResult<bool> {
        let phrase = state.current.as_ref().ok_or(EngineError::NoPhraseLoaded)?;
        Ok(answer::check_answer(&phrase.phrase, response, self.settings.reverse_mode))
    }

    /// Deletes all progress of a catalog collection. The active collection is
    /// rebuilt, since computed collections depend on progress.
    pub fn reset_collection(
        &mut self,
        state: &mut SessionState,
        collection_id: &str,
    ) -> EngineResult<()> {
        self.base_language(collection_id)?;
        self.progress.reset(&mut self.store, collection_id);
        info!(collection = collection_id, "Progress reset");

        if state.collection.is_some() {
            self.rebuild(state)?;
        }
        Ok(())
    }

    fn base_language(&self, collection_id: &str) -> EngineResult<String> {
        match CollectionKind::from_id(collection_id) {
            CollectionKind::Plain(_) => self
                .catalog
                .collection(collection_id)
                .map(|c| c.language.clone())
                .ok_or_else(|| EngineError::UnknownCollection(collection_id.to_string())),
            _ => Err(EngineError::NotABaseCollection(collection_id.to_string())),
        }
    }

    pub fn is_starred(&self, collection_id: &str, phrase_id: &str) -> bool {
        match self.base_language(collection_id) {
            Ok(language) => review::is_starred(&self.store, &language, collection_id, phrase_id),
            Err(_) => false,
        }
    }

    /// Stars or unstars a phrase. Returns whether it is starred afterwards.
    pub fn toggle_star(&mut self, collection_id: &str, phrase_id: &str) -> EngineResult<bool> {
        let language = self.base_language(collection_id)?;
        if review::is_starred(&self.store, &language, collection_id, phrase_id) {
            review::unstar(&mut self.store, &language, collection_id, phrase_id);
            Ok(false)
        } else {
            review::star(&mut self.store, &language, collection_id, phrase_id);
            Ok(true)
        }
    }

    /// Toggles the star on the current phrase. Inside a review set this
    /// always removes it, rebuilds the set and moves on.
    pub fn toggle_current_star(&mut self, state: &mut SessionState) -> EngineResult<StarToggle> {
        let phrase = state.current.clone().ok_or(EngineError::NoPhraseLoaded)?;
        let collection = state.collection.as_ref().ok_or(EngineError::NoCollectionLoaded)?;

        if collection.is_review_set() {
            let language = collection.language.clone();
            review::unstar(
                &mut self.store,
                &language,
                &phrase.source_collection_id,
                phrase.id(),
            );
            let next = self.rebuild_and_advance(state)?;
            return Ok(StarToggle::RemovedFromReview(next));
        }

        if self.toggle_star(&phrase.source_collection_id, phrase.id())? {
            Ok(StarToggle::Starred)
        } else {
            Ok(StarToggle::Unstarred)
        }
    }

    /// Hides the current phrase from its collection and moves on.
    pub fn hide_current(&mut self, state: &mut SessionState) -> EngineResult<Next> {
        let phrase = state.current.clone().ok_or(EngineError::NoPhraseLoaded)?;
        hidden::hide(&mut self.store, &phrase.source_collection_id, phrase.id());
        info!(
            collection = %phrase.source_collection_id,
            phrase = phrase.id(),
            "Phrase hidden"
        );
        self.rebuild_and_advance(state)
    }

    /// Brings a hidden phrase back. An open collection is rebuilt so the
    /// phrase can be picked again.
    pub fn unhide(
        &mut self,
        state: &mut SessionState,
        collection_id: &str,
        phrase_id: &str,
    ) -> EngineResult<()> {
        self.base_language(collection_id)?;
        hidden::unhide(&mut self.store, collection_id, phrase_id);
        info!(collection = collection_id, phrase = phrase_id, "Phrase unhidden");

        if state.collection.is_some() {
            self.rebuild(state)?;
        }
        Ok(())
    }

    /// Reassembles the active collection. The current phrase is dropped, and
    /// a retry is abandoned if its phrase is no longer part of the collection.
    fn rebuild(&mut self, state: &mut SessionState) -> EngineResult<()> {
        let kind = state
            .collection
            .as_ref()
            .map(|c| c.kind.clone())
            .ok_or(EngineError::NoCollectionLoaded)?;
        let collection = self.assemble_or_fallback(&kind)?;

        let retry_still_valid = state
            .retry
            .current()
            .is_some_and(|p| collection.phrases.contains(p));
        if !retry_still_valid {
            state.retry.clear();
        }
        if collection.id != kind.id() {
            stored_settings::save_last_collection(&mut self.store, &collection.id);
        }
        state.collection = Some(collection);
        state.current = None;
        Ok(())
    }

    fn rebuild_and_advance(&mut self, state: &mut SessionState) -> EngineResult<Next> {
        self.rebuild(state)?;
        self.load_next(state)
    }

    /// Catalog collections grouped by language, each group followed by its
    /// mixed practice entry (when the language has several collections) and
    /// its review entry (when something is starred).
    pub fn list_collections(&self) -> Vec<CollectionEntry> {
        let mut languages: Vec<String> = Vec::new();
        for id in self.catalog.collection_ids() {
            if let Some(base) = self.catalog.collection(&id) {
                if !languages.contains(&base.language) {
                    languages.push(base.language.clone());
                }
            }
        }
        let starred = review::starred_languages(&self.store);

        let mut entries = Vec::new();
        for language in languages {
            let mut count = 0;
            for id in self.catalog.collection_ids() {
                let Some(base) = self.catalog.collection(&id) else {
                    continue;
                };
                if base.language == language {
                    count += 1;
                    entries.push(CollectionEntry {
                        id: base.id.clone(),
                        name: base.display_name().to_string(),
                        language: language.clone(),
                        kind: CollectionKind::Plain(base.id.clone()),
                    });
                }
            }
            if count > 1 {
                let kind = CollectionKind::MixedPractice(language.clone());
                entries.push(CollectionEntry {
                    id: kind.id(),
                    name: format!("Mixed practice: {language}"),
                    language: language.clone(),
                    kind,
                });
            }
            if starred.contains(&language) {
                let kind = CollectionKind::ReviewSet(language.clone());
                entries.push(CollectionEntry {
                    id: kind.id(),
                    name: format!("Review: {language}"),
                    language: language.clone(),
                    kind,
                });
            }
        }
        entries
    }

    pub fn weak_vocabulary(&self, min_contexts: usize) -> Vec<WeakWord> {
        weak_vocabulary(&vocab::load(&self.store), min_contexts)
    }
}
