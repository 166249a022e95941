//! Selection priority of a phrase given its progress record.
//!
//! Rough bands, from most to least urgent:
//! - never answered: 1000
//! - overdue: 500..=1000, growing 10 per overdue day
//! - not yet due: 0.1..10, rising as the due date approaches
//! - records without a review date: (1 - success rate) * ln(hours since seen + 1)

use crate::models::ProgressRecord;
use chrono::{DateTime, Utc};

pub const NEW_PHRASE_PRIORITY: f64 = 1000.0;
pub const OVERDUE_BASE_PRIORITY: f64 = 500.0;
pub const OVERDUE_MAX_BONUS: f64 = 500.0;
const OVERDUE_PRIORITY_PER_DAY: f64 = 10.0;
const NOT_DUE_CEILING: f64 = 10.0;
const NOT_DUE_FLOOR: f64 = 0.1;

const MS_PER_HOUR: f64 = 60.0 * 60.0 * 1000.0;
const MS_PER_DAY: f64 = 24.0 * MS_PER_HOUR;

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MS_PER_DAY
}

pub fn overdue_priority(next_review_date: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let overdue_days = days_between(next_review_date, now).max(0.0);
    OVERDUE_BASE_PRIORITY + (overdue_days * OVERDUE_PRIORITY_PER_DAY).min(OVERDUE_MAX_BONUS)
}

pub fn priority(record: Option<&ProgressRecord>, now: DateTime<Utc>) -> f64 {
    let Some(record) = record.filter(|r| r.total_attempts > 0) else {
        return NEW_PHRASE_PRIORITY;
    };

    let Some(next_review_date) = record.next_review_date else {
        // Records from before scheduling existed.
        let success_rate = f64::from(record.success_count) / f64::from(record.total_attempts);
        let last_seen_ms = record.last_seen.map_or(0, |t| t.timestamp_millis());
        let hours_since_seen = (now.timestamp_millis() - last_seen_ms) as f64 / MS_PER_HOUR;
        return ((1.0 - success_rate) * (hours_since_seen.max(0.0) + 1.0).ln()).max(0.0);
    };

    if now >= next_review_date {
        return overdue_priority(next_review_date, now);
    }

    let days_until_due = days_between(now, next_review_date);
    (NOT_DUE_CEILING - days_until_due).max(NOT_DUE_FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
    }

    fn legacy(success_count: u32, total_attempts: u32) -> ProgressRecord {
        ProgressRecord {
            correct_streak: 0,
            total_attempts,
            success_count,
            last_seen: Some(now() - Duration::hours(48)),
            next_review_date: None,
            ..ProgressRecord::default()
        }
    }

    fn scheduled(due_in: Duration) -> ProgressRecord {
        ProgressRecord {
            total_attempts: 3,
            success_count: 2,
            correct_streak: 1,
            last_seen: Some(now() - Duration::days(1)),
            next_review_date: Some(now() + due_in),
            ..ProgressRecord::default()
        }
    }

    #[test]
    fn test_new_phrase_priority() {
        assert_eq!(priority(None, now()), NEW_PHRASE_PRIORITY);
        assert_eq!(priority(Some(&ProgressRecord::default()), now()), NEW_PHRASE_PRIORITY);
    }

    #[test]
    fn test_legacy_priority_falls_with_success() {
        let low = priority(Some(&legacy(1, 4)), now());
        let high = priority(Some(&legacy(3, 4)), now());

        assert!(high < low);
        // (1 - 0.25) * ln(49)
        assert!((low - 0.75 * 49f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn test_overdue_priority_bounds() {
        for days in [0, 1, 7, 30, 49, 50, 51, 365, 5000] {
            let due = now() - Duration::days(days);
            let p = overdue_priority(due, now());
            assert!((500.0..=1000.0).contains(&p), "{days} days -> {p}");
        }
        assert_eq!(overdue_priority(now() - Duration::days(50), now()), 1000.0);
        assert_eq!(overdue_priority(now(), now()), 500.0);
        assert_eq!(overdue_priority(now() - Duration::days(3), now()), 530.0);
    }

    #[test]
    fn test_due_record_uses_overdue_priority() {
        let record = scheduled(Duration::days(-2));
        assert_eq!(priority(Some(&record), now()), 520.0);

        let due_now = scheduled(Duration::zero());
        assert_eq!(priority(Some(&due_now), now()), 500.0);
    }

    #[test]
    fn test_not_due_priority() {
        assert_eq!(priority(Some(&scheduled(Duration::days(4))), now()), 6.0);
        assert_eq!(priority(Some(&scheduled(Duration::days(30))), now()), 0.1);
        assert!(priority(Some(&scheduled(Duration::days(365))), now()) > 0.0);
    }

    #[test]
    fn test_new_phrase_dominates() {
        let records = [
            scheduled(Duration::days(-10_000)),
            scheduled(Duration::days(-1)),
            scheduled(Duration::days(1)),
            legacy(0, 10),
        ];
        for record in &records {
            assert!(priority(Some(record), now()) <= NEW_PHRASE_PRIORITY);
        }
    }
}
