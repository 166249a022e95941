//! SM-2 (SuperMemo 2) spaced repetition update.
//!
//! Answers are binary, so quality uses a fixed two-level mapping:
//! - correct = 4 (good), wrong = 1 (fail)
//! - Quality below 3: interval resets to 1 day
//! - Quality 3 and above: 1 day → 6 days, then interval × ease factor
//! - The ease factor is adjusted after every answer and never drops below 1.3

use super::ProgressRecord;
use super::progress_record::MIN_EASE_FACTOR;
use chrono::{DateTime, Duration, Utc};

pub const QUALITY_CORRECT: u8 = 4;
pub const QUALITY_WRONG: u8 = 1;

pub fn quality_for(correct: bool) -> u8 {
    if correct { QUALITY_CORRECT } else { QUALITY_WRONG }
}

/// Standard SM-2 ease update: EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))
pub fn next_ease_factor(ease_factor: f64, quality: u8) -> f64 {
    let q = f64::from(quality.min(5));
    let updated = ease_factor + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02));
    updated.max(MIN_EASE_FACTOR)
}

/// Next interval in days. Uses the ease factor from before this answer.
pub fn next_interval(interval: u32, ease_factor: f64, quality: u8) -> u32 {
    if quality < 3 {
        1
    } else if interval <= 1 {
        6
    } else {
        (f64::from(interval) * ease_factor).round() as u32
    }
}

/// Applies one answer to a record: counters, streak, interval, ease factor
/// and the next review date.
pub fn apply_answer(record: &ProgressRecord, correct: bool, now: DateTime<Utc>) -> ProgressRecord {
    let mut next = record.clone();
    let quality = quality_for(correct);

    next.total_attempts += 1;
    if correct {
        next.correct_streak += 1;
        next.success_count += 1;
    } else {
        next.correct_streak = 0;
    }
    next.last_seen = Some(now);

    next.interval = next_interval(record.interval, record.ease_factor, quality);
    next.ease_factor = next_ease_factor(record.ease_factor, quality);
    next.next_review_date = Some(now + Duration::days(i64::from(next.interval)));

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_first_correct_answer() {
        let next = apply_answer(&ProgressRecord::default(), true, now());

        assert_eq!(next.interval, 6);
        // q = 4 leaves the ease factor where it was
        assert!((next.ease_factor - 2.5).abs() < 1e-9);
        assert_eq!(next.correct_streak, 1);
        assert_eq!(next.total_attempts, 1);
        assert_eq!(next.success_count, 1);
        assert_eq!(next.last_seen, Some(now()));
        assert_eq!(next.next_review_date, Some(now() + Duration::days(6)));
    }

    #[test]
    fn test_second_correct_answer() {
        let first = apply_answer(&ProgressRecord::default(), true, now());
        let second = apply_answer(&first, true, now());

        // round(6 * 2.5) = 15
        assert_eq!(second.interval, 15);
        assert!((second.ease_factor - 2.5).abs() < 1e-9);
        assert_eq!(second.correct_streak, 2);
    }

    #[test]
    fn test_wrong_answer_resets_interval() {
        let record = ProgressRecord {
            correct_streak: 4,
            total_attempts: 5,
            success_count: 4,
            interval: 40,
            ..ProgressRecord::default()
        };

        let next = apply_answer(&record, false, now());
        assert_eq!(next.interval, 1);
        assert_eq!(next.correct_streak, 0);
        assert_eq!(next.success_count, 4);
        assert_eq!(next.total_attempts, 6);
        // 2.5 + (0.1 - 4 * (0.08 + 4 * 0.02)) = 1.96
        assert!((next.ease_factor - 1.96).abs() < 1e-9);
        assert_eq!(next.next_review_date, Some(now() + Duration::days(1)));
    }

    #[test]
    fn test_ef_floor() {
        let mut record = ProgressRecord::default();
        for _ in 0..20 {
            record = apply_answer(&record, false, now());
            assert!(record.ease_factor >= MIN_EASE_FACTOR);
        }
        assert_eq!(record.ease_factor, MIN_EASE_FACTOR);
    }

    #[test]
    fn test_quality_mapping() {
        assert_eq!(quality_for(true), 4);
        assert_eq!(quality_for(false), 1);
    }
}
