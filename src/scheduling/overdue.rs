//! Global reminders: overdue phrases from the learner's other collections in
//! the same language occasionally replace the normal pick.
//!
//! Finding them means scanning every collection of the language, so the
//! result is cached per language for a short time. The cache is only ever
//! refreshed by expiry; answers given in the meantime do not invalidate it.

use super::selection::weighted_choice;
use crate::models::CollectionPhrase;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::debug;

/// Chance that a pick in a plain collection becomes a reminder.
pub const GLOBAL_REMINDER_RATIO: f64 = 0.2;
/// How many of the most overdue phrases a reminder is drawn from.
pub const REMINDER_POOL_SIZE: usize = 10;
const CACHE_TTL_SECONDS: i64 = 30;

#[derive(Clone, Debug, PartialEq)]
pub struct OverduePhrase {
    pub phrase: CollectionPhrase,
    pub priority: f64,
}

#[derive(Debug)]
struct CacheEntry {
    language: String,
    phrases: Vec<OverduePhrase>,
    computed_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct OverdueCache {
    entry: Option<CacheEntry>,
}

impl OverdueCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_fresh(&self, language: &str, now: DateTime<Utc>) -> bool {
        self.entry.as_ref().is_some_and(|entry| {
            let age = now - entry.computed_at;
            entry.language == language
                && age >= Duration::zero()
                && age < Duration::seconds(CACHE_TTL_SECONDS)
        })
    }

    /// Overdue phrases of `language`, most overdue first, leaving out those
    /// from `exclude_collection_id`. `compute` runs only when the cached
    /// list is missing, for another language, or expired.
    pub fn overdue_excluding(
        &mut self,
        language: &str,
        exclude_collection_id: &str,
        now: DateTime<Utc>,
        compute: impl FnOnce() -> Vec<OverduePhrase>,
    ) -> Vec<OverduePhrase> {
        if !self.is_fresh(language, now) {
            let mut phrases = compute();
            phrases.sort_by(|a, b| b.priority.total_cmp(&a.priority));
            debug!(language, overdue = phrases.len(), "Refreshed overdue cache");
            self.entry = Some(CacheEntry {
                language: language.to_string(),
                phrases,
                computed_at: now,
            });
        }

        self.entry
            .as_ref()
            .map(|entry| {
                entry
                    .phrases
                    .iter()
                    .filter(|p| p.phrase.source_collection_id != exclude_collection_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Draws one reminder from the most overdue phrases, weighted by how overdue
/// each one is. Expects `overdue` sorted most overdue first.
pub fn pick_reminder<'a, R: Rng + ?Sized>(
    overdue: &'a [OverduePhrase],
    rng: &mut R,
) -> Option<&'a CollectionPhrase> {
    let pool: Vec<(&CollectionPhrase, f64)> = overdue
        .iter()
        .take(REMINDER_POOL_SIZE)
        .map(|o| (&o.phrase, o.priority))
        .collect();
    weighted_choice(&pool, rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Phrase;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::cell::Cell;

    fn overdue(id: &str, collection: &str, priority: f64) -> OverduePhrase {
        OverduePhrase {
            phrase: CollectionPhrase::new(
                Phrase {
                    id: id.to_string(),
                    prompt: id.to_string(),
                    answer: id.to_string(),
                    accepted: Vec::new(),
                    vocabulary: None,
                },
                collection,
            ),
            priority,
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_sorted_and_filtered() {
        let mut cache = OverdueCache::new();
        let result = cache.overdue_excluding("de", "travel", start(), || {
            vec![
                overdue("a", "food", 510.0),
                overdue("b", "travel", 900.0),
                overdue("c", "work", 700.0),
            ]
        });

        let ids: Vec<&str> = result.iter().map(|o| o.phrase.id()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn test_cache_expires_after_ttl() {
        let mut cache = OverdueCache::new();
        let computed = Cell::new(0);
        let compute = || {
            computed.set(computed.get() + 1);
            vec![overdue("a", "food", 600.0)]
        };

        cache.overdue_excluding("de", "travel", start(), compute);
        cache.overdue_excluding("de", "travel", start() + Duration::seconds(29), compute);
        assert_eq!(computed.get(), 1);

        cache.overdue_excluding("de", "travel", start() + Duration::seconds(30), compute);
        assert_eq!(computed.get(), 2);
    }

    #[test]
    fn test_cache_keyed_by_language() {
        let mut cache = OverdueCache::new();
        cache.overdue_excluding("de", "travel", start(), || vec![overdue("a", "food", 600.0)]);

        let polish = cache.overdue_excluding("pl", "greetings", start(), Vec::new);
        assert!(polish.is_empty());
    }

    #[test]
    fn test_exclusion_applied_on_cached_read() {
        let mut cache = OverdueCache::new();
        cache.overdue_excluding("de", "travel", start(), || {
            vec![overdue("a", "food", 600.0), overdue("b", "travel", 600.0)]
        });

        let from_food = cache.overdue_excluding("de", "food", start(), Vec::new);
        assert_eq!(from_food.len(), 1);
        assert_eq!(from_food[0].phrase.id(), "b");
    }

    #[test]
    fn test_pick_reminder_uses_top_ten() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut list: Vec<OverduePhrase> = (0..10)
            .map(|i| overdue(&format!("top{i}"), "food", 1000.0))
            .collect();
        list.push(overdue("eleventh", "food", 1000.0));

        for _ in 0..500 {
            let picked = pick_reminder(&list, &mut rng).unwrap();
            assert_ne!(picked.id(), "eleventh");
        }
        assert!(pick_reminder(&[], &mut rng).is_none());
    }
}
