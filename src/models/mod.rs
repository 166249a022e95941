pub mod collection;
pub mod phrase;
pub mod progress_record;
pub mod retry_session;
pub mod settings;
pub mod sm2;
pub mod vocabulary;

pub use collection::{BaseCollection, Collection, CollectionKind, CollectionPhrase, CollectionStats};
pub use phrase::{Phrase, VocabularyItem};
pub use progress_record::{ProgressMap, ProgressRecord};
pub use retry_session::{RetryOutcome, RetrySession};
pub use settings::{ExerciseMode, Settings};
