//! Immediate retry: after a miss, the same phrase is repeated until it has
//! been answered correctly twice. Retry answers are practice only and never
//! touch stored progress.

use super::CollectionPhrase;

/// Correct answers needed to leave retry.
pub const RETRY_SUCCESS_TARGET: u32 = 2;
/// Misses tolerated before the retry counters start over.
pub const RETRY_FAILURE_TOLERANCE: u32 = 1;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum RetrySession {
    #[default]
    Idle,
    Active {
        phrase: CollectionPhrase,
        success_count: u32,
        failure_count: u32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryOutcome {
    /// Still retrying the same phrase.
    Continuing,
    /// Enough correct answers; back to normal scheduling.
    Satisfied,
}

impl RetrySession {
    /// Starts retrying `phrase`, replacing any retry in progress.
    pub fn begin(&mut self, phrase: CollectionPhrase) {
        *self = RetrySession::Active {
            phrase,
            success_count: 0,
            failure_count: 0,
        };
    }

    pub fn current(&self) -> Option<&CollectionPhrase> {
        match self {
            RetrySession::Idle => None,
            RetrySession::Active { phrase, .. } => Some(phrase),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, RetrySession::Active { .. })
    }

    /// Records an answer given during retry. Does nothing when idle.
    pub fn record(&mut self, correct: bool) -> RetryOutcome {
        let RetrySession::Active {
            success_count,
            failure_count,
            ..
        } = self
        else {
            return RetryOutcome::Satisfied;
        };

        if correct {
            *success_count += 1;
            if *success_count >= RETRY_SUCCESS_TARGET {
                self.clear();
                return RetryOutcome::Satisfied;
            }
        } else {
            *failure_count += 1;
            if *failure_count > RETRY_FAILURE_TOLERANCE {
                *success_count = 0;
                *failure_count = 0;
            }
        }
        RetryOutcome::Continuing
    }

    pub fn clear(&mut self) {
        *self = RetrySession::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Phrase;

    fn phrase() -> CollectionPhrase {
        CollectionPhrase::new(
            Phrase {
                id: "p1".to_string(),
                prompt: "please".to_string(),
                answer: "proszę".to_string(),
                accepted: Vec::new(),
                vocabulary: None,
            },
            "polish",
        )
    }

    #[test]
    fn test_two_correct_answers_end_retry() {
        let mut retry = RetrySession::default();
        retry.begin(phrase());

        assert_eq!(retry.record(true), RetryOutcome::Continuing);
        assert_eq!(retry.record(true), RetryOutcome::Satisfied);
        assert_eq!(retry, RetrySession::Idle);
        assert!(retry.current().is_none());
    }

    #[test]
    fn test_one_interleaved_failure_is_tolerated() {
        let mut retry = RetrySession::default();
        retry.begin(phrase());

        assert_eq!(retry.record(true), RetryOutcome::Continuing);
        assert_eq!(retry.record(false), RetryOutcome::Continuing);
        assert_eq!(retry.record(true), RetryOutcome::Satisfied);
        assert!(!retry.is_active());
    }

    #[test]
    fn test_second_failure_resets_counters() {
        let mut retry = RetrySession::default();
        retry.begin(phrase());

        retry.record(true);
        retry.record(false);
        retry.record(false);

        assert_eq!(
            retry,
            RetrySession::Active {
                phrase: phrase(),
                success_count: 0,
                failure_count: 0,
            }
        );
        assert_eq!(retry.record(true), RetryOutcome::Continuing);
        assert_eq!(retry.record(true), RetryOutcome::Satisfied);
    }

    #[test]
    fn test_clear_returns_to_idle() {
        let mut retry = RetrySession::default();
        retry.begin(phrase());
        retry.clear();
        assert!(!retry.is_active());
    }
}
