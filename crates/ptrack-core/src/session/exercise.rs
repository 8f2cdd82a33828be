use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::ExerciseDefinition;

/// Stable identity of an exercise, independent of its list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseId(Uuid);

impl ExerciseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ExerciseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One user-defined movement target and its progress through the session.
///
/// `current_set` runs from 1 to `target_sets + 1`; the last value means all
/// sets are done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    #[serde(default)]
    pub id: ExerciseId,
    pub name: String,
    pub target_reps: u32,
    pub target_sets: u32,
    /// Seconds per rep; 0 means reps are counted immediately.
    #[serde(default)]
    pub hold_time: u32,
    #[serde(default = "first_set")]
    pub current_set: u32,
    #[serde(default)]
    pub current_reps: u32,
    /// Most recently engaged through a hold.
    #[serde(default)]
    pub active: bool,
}

fn first_set() -> u32 {
    1
}

/// Where an exercise stands, as shown on its card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Progress {
    NotStarted,
    InProgress,
    Complete,
}

impl Exercise {
    pub fn new(definition: ExerciseDefinition) -> Self {
        Self {
            id: ExerciseId::new(),
            name: definition.name,
            target_reps: definition.target_reps,
            target_sets: definition.target_sets,
            hold_time: definition.hold_time,
            current_set: 1,
            current_reps: 0,
            active: false,
        }
    }

    pub fn has_hold(&self) -> bool {
        self.hold_time > 0
    }

    pub fn is_complete(&self) -> bool {
        self.current_set > self.target_sets
    }

    pub fn reps_complete(&self) -> bool {
        self.current_reps >= self.target_reps
    }

    /// Started but not finished: a rep counted or a set behind it.
    pub fn in_progress(&self) -> bool {
        !self.is_complete() && (self.current_reps > 0 || self.current_set > 1)
    }

    pub fn progress(&self) -> Progress {
        if self.is_complete() {
            Progress::Complete
        } else if self.in_progress() {
            Progress::InProgress
        } else {
            Progress::NotStarted
        }
    }

    /// Set number to show; a finished exercise shows its last set.
    pub fn displayed_set(&self) -> u32 {
        self.current_set.min(self.target_sets)
    }

    pub(crate) fn force_complete(&mut self) {
        self.current_set = self.target_sets.saturating_add(1);
        self.current_reps = 0;
    }
}

/// Field-wise update merged into an existing exercise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExercisePatch {
    pub name: Option<String>,
    pub target_reps: Option<u32>,
    pub target_sets: Option<u32>,
    pub hold_time: Option<u32>,
    pub current_set: Option<u32>,
    pub current_reps: Option<u32>,
    pub active: Option<bool>,
}

impl ExercisePatch {
    /// The four editable form fields. Progress is left alone.
    pub fn definition(definition: ExerciseDefinition) -> Self {
        Self {
            name: Some(definition.name),
            target_reps: Some(definition.target_reps),
            target_sets: Some(definition.target_sets),
            hold_time: Some(definition.hold_time),
            ..Self::default()
        }
    }

    pub fn apply(self, exercise: &mut Exercise) {
        if let Some(name) = self.name {
            exercise.name = name;
        }
        if let Some(v) = self.target_reps {
            exercise.target_reps = v;
        }
        if let Some(v) = self.target_sets {
            exercise.target_sets = v;
        }
        if let Some(v) = self.hold_time {
            exercise.hold_time = v;
        }
        if let Some(v) = self.current_set {
            exercise.current_set = v;
        }
        if let Some(v) = self.current_reps {
            exercise.current_reps = v;
        }
        if let Some(v) = self.active {
            exercise.active = v;
        }
    }
}
