//! Weighted random choice.
use super::priority::priority;
use crate::models::{CollectionPhrase, ProgressRecord};
use chrono::{DateTime, Utc};
use rand::Rng;

/// Picks an item with probability proportional to its weight. Falls back to
/// a uniform pick when no weight is positive.
pub fn weighted_choice<'a, T, R: Rng + ?Sized>(
    items: &'a [(T, f64)],
    rng: &mut R,
) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }

    let total: f64 = items.iter().map(|(_, weight)| weight.max(0.0)).sum();
    if !(total > 0.0 && total.is_finite()) {
        let index = rng.random_range(0..items.len());
        return Some(&items[index].0);
    }

    let mut remaining = rng.random::<f64>() * total;
    for (item, weight) in items {
        remaining -= weight.max(0.0);
        if remaining <= 0.0 {
            return Some(item);
        }
    }
    // Rounding left a sliver over.
    Some(&items[0].0)
}

/// Chooses the next phrase among candidates, weighted by priority.
pub fn select_next<'a, R: Rng + ?Sized>(
    candidates: &'a [CollectionPhrase],
    mut record_of: impl FnMut(&CollectionPhrase) -> Option<ProgressRecord>,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Option<&'a CollectionPhrase> {
    let weighted: Vec<(&CollectionPhrase, f64)> = candidates
        .iter()
        .map(|candidate| {
            let record = record_of(candidate);
            (candidate, priority(record.as_ref(), now))
        })
        .collect();

    weighted_choice(&weighted, rng).copied()
}
