//! Learner settings that change how phrases are scheduled and checked.
use super::progress_record::DEFAULT_REQUIRED_STREAK;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExerciseMode {
    /// The learner produces the answer (typed or spoken) and it is checked.
    #[default]
    ActiveRecall,
    /// The learner reveals the answer and grades themselves.
    ShowAnswer,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Consecutive correct answers needed before a phrase counts as learned.
    pub required_streak: u32,
    pub immediate_retry: bool,
    pub exercise_mode: ExerciseMode,
    pub reverse_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            required_streak: DEFAULT_REQUIRED_STREAK,
            immediate_retry: true,
            exercise_mode: ExerciseMode::ActiveRecall,
            reverse_mode: false,
        }
    }
}

impl Settings {
    /// Retry only makes sense when the learner actually has to recall.
    pub fn retry_enabled(&self) -> bool {
        self.immediate_retry && self.exercise_mode == ExerciseMode::ActiveRecall
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_requires_active_recall() {
        let mut settings = Settings::default();
        assert!(settings.retry_enabled());

        settings.exercise_mode = ExerciseMode::ShowAnswer;
        assert!(!settings.retry_enabled());

        settings.exercise_mode = ExerciseMode::ActiveRecall;
        settings.immediate_retry = false;
        assert!(!settings.retry_enabled());
    }
}
