mod exercise;
pub mod history;
mod state;

pub use exercise::{Exercise, ExerciseId, ExercisePatch, Progress};
pub use history::{group_by_day, HistoryDay, HistoryEntry};
pub use state::{SessionState, MAX_HISTORY_ENTRIES};
