//! In-memory session model with save-through persistence.
//!
//! Every mutator writes the affected collection back through the gateway
//! before returning. A failed write is logged by the gateway; the in-memory
//! state stays authoritative for the rest of the session.

use super::exercise::{Exercise, ExerciseId, ExercisePatch};
use super::history::HistoryEntry;
use crate::error::ValidationError;
use crate::storage::{Collection, Gateway};

/// Default cap on stored history entries.
pub const MAX_HISTORY_ENTRIES: usize = 100;

pub struct SessionState {
    gateway: Gateway,
    exercises: Vec<Exercise>,
    history: Vec<HistoryEntry>,
    max_history: usize,
    editing: Option<ExerciseId>,
    editing_history: bool,
}

impl SessionState {
    /// Build from whatever the gateway has stored.
    pub fn load(gateway: Gateway) -> Self {
        let exercises: Vec<Exercise> = gateway.load(Collection::Exercises);
        let history: Vec<HistoryEntry> = gateway.load(Collection::History);
        tracing::debug!(
            exercises = exercises.len(),
            history = history.len(),
            "session state loaded"
        );
        Self {
            gateway,
            exercises,
            history,
            max_history: MAX_HISTORY_ENTRIES,
            editing: None,
            editing_history: false,
        }
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    // ── Exercises ────────────────────────────────────────────────────

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn exercise(&self, index: usize) -> Option<&Exercise> {
        self.exercises.get(index)
    }

    pub fn exercise_by_id(&self, id: ExerciseId) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    pub fn position_of(&self, id: ExerciseId) -> Option<usize> {
        self.exercises.iter().position(|e| e.id == id)
    }

    pub fn set_exercises(&mut self, exercises: Vec<Exercise>) -> bool {
        self.exercises = exercises;
        self.save_exercises()
    }

    pub fn add_exercise(&mut self, exercise: Exercise) -> bool {
        self.exercises.push(exercise);
        self.save_exercises()
    }

    pub fn update_exercise(&mut self, index: usize, patch: ExercisePatch) -> Result<bool, ValidationError> {
        let exercise = self.exercise_slot(index)?;
        patch.apply(exercise);
        Ok(self.save_exercises())
    }

    /// Remove by position; later exercises shift down by one.
    pub fn remove_exercise(&mut self, index: usize) -> Result<Exercise, ValidationError> {
        self.check_exercise_index(index)?;
        let removed = self.exercises.remove(index);
        if self.editing == Some(removed.id) {
            self.editing = None;
        }
        self.save_exercises();
        Ok(removed)
    }

    /// Apply `f` to every exercise in one save.
    pub(crate) fn update_all(&mut self, mut f: impl FnMut(&mut Exercise)) -> bool {
        self.exercises.iter_mut().for_each(&mut f);
        self.save_exercises()
    }

    fn exercise_slot(&mut self, index: usize) -> Result<&mut Exercise, ValidationError> {
        let len = self.exercises.len();
        self.exercises.get_mut(index).ok_or(ValidationError::OutOfBounds {
            collection: "exercises",
            index,
            len,
        })
    }

    fn check_exercise_index(&self, index: usize) -> Result<(), ValidationError> {
        if index < self.exercises.len() {
            Ok(())
        } else {
            Err(ValidationError::OutOfBounds {
                collection: "exercises",
                index,
                len: self.exercises.len(),
            })
        }
    }

    fn save_exercises(&self) -> bool {
        self.gateway.save(Collection::Exercises, &self.exercises)
    }

    // ── History ──────────────────────────────────────────────────────

    /// Newest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn set_history(&mut self, history: Vec<HistoryEntry>) -> bool {
        self.history = history;
        self.save_history()
    }

    /// Prepend an entry stamped now and drop the oldest beyond the cap.
    pub fn add_history_entry(&mut self, name: &str) -> bool {
        self.history.insert(0, HistoryEntry::now(name));
        self.history.truncate(self.max_history);
        self.save_history()
    }

    pub fn remove_history_entry(&mut self, index: usize) -> Result<HistoryEntry, ValidationError> {
        if index >= self.history.len() {
            return Err(ValidationError::OutOfBounds {
                collection: "history",
                index,
                len: self.history.len(),
            });
        }
        let removed = self.history.remove(index);
        if self.history.is_empty() {
            self.editing_history = false;
        }
        self.save_history();
        Ok(removed)
    }

    /// Empty the history and leave edit mode.
    pub fn clear_history(&mut self) -> bool {
        self.history.clear();
        self.editing_history = false;
        self.save_history()
    }

    fn save_history(&self) -> bool {
        self.gateway.save(Collection::History, &self.history)
    }

    // ── Selection ────────────────────────────────────────────────────

    pub fn editing(&self) -> Option<ExerciseId> {
        self.editing
    }

    pub fn set_editing(&mut self, id: Option<ExerciseId>) {
        self.editing = id;
    }

    pub fn editing_history(&self) -> bool {
        self.editing_history
    }

    pub fn toggle_editing_history(&mut self) -> bool {
        self.editing_history = !self.editing_history;
        self.editing_history
    }

    /// Write both collections. Returns whether both writes landed.
    pub fn flush(&self) -> bool {
        let exercises = self.save_exercises();
        let history = self.save_history();
        exercises && history
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::MemoryStore;
    use crate::validation::ExerciseDefinition;

    fn squats() -> Exercise {
        Exercise::new(ExerciseDefinition {
            name: "Squats".into(),
            target_reps: 10,
            target_sets: 3,
            hold_time: 0,
        })
    }

    fn fresh() -> (SessionState, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (SessionState::load(Gateway::new(store.clone())), store)
    }

    #[test]
    fn starts_empty() {
        let (state, _) = fresh();
        assert!(state.exercises().is_empty());
        assert!(state.history().is_empty());
        assert!(state.editing().is_none());
        assert!(!state.editing_history());
    }

    #[test]
    fn add_saves_through() {
        let (mut state, store) = fresh();
        state.add_exercise(squats());
        let raw = store.raw("ptExercises").unwrap();
        assert!(raw.contains("\"Squats\""));
    }

    #[test]
    fn update_merges_fields() {
        let (mut state, _) = fresh();
        state.add_exercise(squats());
        state
            .update_exercise(
                0,
                ExercisePatch {
                    current_reps: Some(4),
                    ..ExercisePatch::default()
                },
            )
            .unwrap();
        assert_eq!(state.exercise(0).unwrap().current_reps, 4);
        assert_eq!(state.exercise(0).unwrap().name, "Squats");
    }

    #[test]
    fn update_out_of_range_is_error() {
        let (mut state, _) = fresh();
        let err = state.update_exercise(3, ExercisePatch::default()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfBounds {
                collection: "exercises",
                index: 3,
                len: 0
            }
        );
    }

    #[test]
    fn remove_shifts_and_clears_edit_selection() {
        let (mut state, _) = fresh();
        state.add_exercise(squats());
        let mut second = squats();
        second.name = "Lunges".into();
        state.add_exercise(second);

        let first_id = state.exercise(0).unwrap().id;
        state.set_editing(Some(first_id));
        state.remove_exercise(0).unwrap();

        assert_eq!(state.exercises().len(), 1);
        assert_eq!(state.exercise(0).unwrap().name, "Lunges");
        assert!(state.editing().is_none());
    }

    #[test]
    fn history_is_capped_newest_first() {
        let (mut state, _) = fresh();
        for i in 0..105 {
            state.add_history_entry(&format!("Exercise {i}"));
        }
        assert_eq!(state.history().len(), 100);
        assert_eq!(state.history()[0].name, "Exercise 104");
        assert_eq!(state.history()[99].name, "Exercise 5");
        assert!(state.history().iter().all(|e| e.name != "Exercise 0"));
    }

    #[test]
    fn custom_history_cap() {
        let (state, _) = fresh();
        let mut state = state.with_max_history(2);
        state.add_history_entry("a");
        state.add_history_entry("b");
        state.add_history_entry("c");
        let names: Vec<&str> = state.history().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b"]);
    }

    #[test]
    fn clearing_history_leaves_edit_mode() {
        let (mut state, store) = fresh();
        state.add_history_entry("Plank");
        assert!(state.toggle_editing_history());
        state.clear_history();
        assert!(state.history().is_empty());
        assert!(!state.editing_history());
        assert_eq!(store.raw("ptHistory").as_deref(), Some("[]"));
    }

    #[test]
    fn removing_last_history_entry_leaves_edit_mode() {
        let (mut state, _) = fresh();
        state.add_history_entry("Plank");
        state.add_history_entry("Bridge");
        state.toggle_editing_history();
        let removed = state.remove_history_entry(0).unwrap();
        assert_eq!(removed.name, "Bridge");
        assert!(state.editing_history());
        state.remove_history_entry(0).unwrap();
        assert!(!state.editing_history());
        assert!(state.remove_history_entry(0).is_err());
    }

    #[test]
    fn reload_sees_saved_state() {
        let store = Arc::new(MemoryStore::new());
        {
            let mut state = SessionState::load(Gateway::new(store.clone()));
            state.add_exercise(squats());
            state.add_history_entry("Squats");
        }
        let state = SessionState::load(Gateway::new(store));
        assert_eq!(state.exercises().len(), 1);
        assert_eq!(state.history()[0].name, "Squats");
    }
}
