//! Per-phrase learning progress and the schema migrations for older
//! stored shapes.
//!
//! Stored progress for one collection is a JSON object keyed by phrase id.
//! Three historical shapes exist:
//! - boolean flags (`{"p1": true}`) from before attempts were counted; these
//!   carry too little information and are discarded,
//! - records without `totalAttempts`/`successCount` (pre-counter),
//! - records without `interval`/`easeFactor`/`nextReviewDate` (pre-schedule).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const DEFAULT_EASE_FACTOR: f64 = 2.5;
pub const MIN_EASE_FACTOR: f64 = 1.3;
pub const DEFAULT_REQUIRED_STREAK: u32 = 2;

/// Interval given to records that were already learned before scheduling
/// fields existed.
const MIGRATED_LEARNED_INTERVAL: u32 = 6;

pub type ProgressMap = BTreeMap<String, ProgressRecord>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub correct_streak: u32,
    pub total_attempts: u32,
    pub success_count: u32,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_seen: Option<DateTime<Utc>>,
    pub interval: u32,
    pub ease_factor: f64,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub next_review_date: Option<DateTime<Utc>>,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            correct_streak: 0,
            total_attempts: 0,
            success_count: 0,
            last_seen: None,
            interval: 1,
            ease_factor: DEFAULT_EASE_FACTOR,
            next_review_date: None,
        }
    }
}

impl ProgressRecord {
    pub fn is_mastered(&self, required_streak: u32) -> bool {
        self.correct_streak >= required_streak
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_date.is_some_and(|due| now >= due)
    }
}

/// Whether a phrase with this (possibly missing) record still needs practice.
pub fn is_unlearned(record: Option<&ProgressRecord>, required_streak: u32) -> bool {
    record.is_none_or(|r| !r.is_mastered(required_streak))
}

/// Values needed to back-fill fields that older shapes lack.
#[derive(Clone, Copy, Debug)]
pub struct MigrationContext {
    pub required_streak: u32,
    pub now: DateTime<Utc>,
}

/// Top-level classification of a stored progress blob.
#[derive(Debug)]
pub enum StoredProgress {
    LegacyFlags,
    Records(serde_json::Map<String, Value>),
}

impl StoredProgress {
    /// Returns `None` when the blob is not a JSON object at all.
    pub fn classify(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) if map.values().any(Value::is_boolean) => {
                Some(StoredProgress::LegacyFlags)
            }
            Value::Object(map) => Some(StoredProgress::Records(map)),
            _ => None,
        }
    }
}

/// Every field optional, so any historical record shape deserializes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    correct_streak: Option<u32>,
    total_attempts: Option<u32>,
    success_count: Option<u32>,
    last_seen: Option<i64>,
    interval: Option<u32>,
    ease_factor: Option<f64>,
    next_review_date: Option<i64>,
}

/// Result of migrating a single stored entry.
#[derive(Debug, PartialEq)]
pub struct Migrated {
    pub record: ProgressRecord,
    /// True when the stored form differs from the current schema and
    /// should be written back.
    pub changed: bool,
}

/// Brings one stored entry up to the current schema. Returns `None` for
/// entries that cannot be interpreted as a record.
pub fn migrate(value: &Value, ctx: &MigrationContext) -> Option<Migrated> {
    if !value.is_object() {
        return None;
    }
    let raw: RawRecord = serde_json::from_value(value.clone()).ok()?;

    let mut changed = false;
    let correct_streak = raw.correct_streak.unwrap_or(0);
    let last_seen = raw.last_seen.and_then(DateTime::from_timestamp_millis);

    // Pre-counter: only the streak was stored.
    let (total_attempts, success_count) = match (raw.total_attempts, raw.success_count) {
        (Some(total), Some(success)) => (total, success),
        (Some(total), None) => {
            changed = true;
            (total, correct_streak.min(total))
        }
        (None, _) => {
            changed = true;
            (correct_streak, correct_streak)
        }
    };

    // Pre-schedule: no interval stored yet.
    let (interval, ease_factor, next_review_date) = match raw.interval {
        Some(interval) => {
            let ease_factor = match raw.ease_factor {
                Some(ef) if ef >= MIN_EASE_FACTOR => ef,
                Some(_) => {
                    changed = true;
                    MIN_EASE_FACTOR
                }
                None => {
                    changed = true;
                    DEFAULT_EASE_FACTOR
                }
            };
            if interval == 0 {
                changed = true;
            }
            let next = raw.next_review_date.and_then(DateTime::from_timestamp_millis);
            (interval.max(1), ease_factor, next)
        }
        None => {
            changed = true;
            if correct_streak >= ctx.required_streak {
                let base = last_seen.unwrap_or(ctx.now);
                (
                    MIGRATED_LEARNED_INTERVAL,
                    DEFAULT_EASE_FACTOR,
                    Some(base + Duration::days(i64::from(MIGRATED_LEARNED_INTERVAL))),
                )
            } else {
                (1, DEFAULT_EASE_FACTOR, None)
            }
        }
    };

    Some(Migrated {
        record: ProgressRecord {
            correct_streak,
            total_attempts,
            success_count,
            last_seen,
            interval,
            ease_factor,
            next_review_date,
        },
        changed,
    })
}
