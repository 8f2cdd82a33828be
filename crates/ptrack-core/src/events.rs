use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::ExerciseId;
use crate::timer::TimerKind;

/// Every state change in a session produces an Event.
/// The host drains them after each operation and tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ExerciseAdded {
        exercise: ExerciseId,
        name: String,
    },
    ExerciseUpdated {
        exercise: ExerciseId,
    },
    ExerciseRemoved {
        exercise: ExerciseId,
        name: String,
    },
    /// Became the most recently engaged exercise.
    ExerciseActivated {
        exercise: ExerciseId,
    },
    RepAdded {
        exercise: ExerciseId,
        current_reps: u32,
    },
    RepRemoved {
        exercise: ExerciseId,
        current_reps: u32,
    },
    SetCompleted {
        exercise: ExerciseId,
        current_set: u32,
    },
    /// All sets done; a history entry was written.
    ExerciseCompleted {
        exercise: ExerciseId,
        name: String,
        at: DateTime<Utc>,
    },
    ExerciseReset {
        exercise: ExerciseId,
    },
    /// Finished on the user's behalf because another exercise was reset.
    ExerciseForceCompleted {
        exercise: ExerciseId,
    },
    TimerStarted {
        exercise: ExerciseId,
        kind: TimerKind,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    TimerTick {
        exercise: ExerciseId,
        kind: TimerKind,
        remaining_secs: u32,
        display: String,
    },
    TimerCompleted {
        exercise: ExerciseId,
        kind: TimerKind,
        at: DateTime<Utc>,
    },
    /// Hold dropped because nothing could display it.
    TimerAborted {
        exercise: ExerciseId,
        at: DateTime<Utc>,
    },
    TimerCancelled {
        exercise: ExerciseId,
        kind: TimerKind,
    },
    HistoryEntryRemoved {
        index: usize,
        name: String,
    },
    HistoryCleared,
    HistoryEditToggled {
        editing: bool,
    },
    WakeLockAcquired,
    WakeLockReleased,
}
