//! Deciding which phrase comes next.

pub mod overdue;
pub mod priority;
pub mod selection;

pub use overdue::{GLOBAL_REMINDER_RATIO, OverdueCache, OverduePhrase, pick_reminder};
pub use priority::{NEW_PHRASE_PRIORITY, overdue_priority, priority};
pub use selection::{select_next, weighted_choice};
