//! Session controller.
//!
//! One entry point per user action. Each runs to completion without
//! yielding, persists through [`SessionState`] before returning, and records
//! [`Event`]s for the host to render.
//!
//! ## Invariants
//!
//! - At most one exercise is `active`, and only it may have a hold running.
//!   Engaging an exercise goes through `engage()`, which settles every other
//!   exercise first.
//! - The wake lock is held while any countdown exists and released as soon
//!   as the last one completes, aborts or is cancelled.

use chrono::Utc;
use serde::Serialize;

use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::notify::{NotificationSink, Notifier};
use crate::session::{Exercise, ExerciseId, ExercisePatch, HistoryEntry, SessionState};
use crate::storage::config::{Config, FormDefaults};
use crate::storage::Gateway;
use crate::timer::{format_time, DisplayTargets, TimerCoordinator, TimerKind, TimerOutcome};
use crate::validation::{validate_exercise, ExerciseForm};
use crate::view::ExerciseCard;
use crate::wake::{WakeLock, WakeLockPlatform};

/// Default rest between sets, in seconds.
pub const REST_TIMER_SECONDS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RepOutcome {
    /// Rep count after the change.
    Counted { current_reps: u32 },
    HoldStarted { hold_secs: u32 },
    /// A hold is already running for this exercise; nothing changed.
    AlreadyHolding,
    /// Every set is done; nothing changed.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SetOutcome {
    Resting { current_set: u32, rest_secs: u32 },
    /// Last set done and logged to history.
    ExerciseComplete,
    /// Already finished; nothing changed.
    AlreadyComplete,
    /// A hold is running; its rep belongs to this set. Nothing changed.
    Holding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "id", rename_all = "snake_case")]
pub enum SaveOutcome {
    Added(ExerciseId),
    Updated(ExerciseId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Engagement {
    /// Starting a hold: the exercise becomes the only active one.
    Hold,
    /// Starting over: any other half-done exercise is finished off.
    Reset,
}

pub struct SessionController {
    state: SessionState,
    timers: TimerCoordinator,
    wake: WakeLock,
    rest_secs: u32,
    form_defaults: FormDefaults,
    events: Vec<Event>,
}

impl SessionController {
    pub fn new(state: SessionState, timers: TimerCoordinator, wake: WakeLock) -> Self {
        Self {
            state,
            timers,
            wake,
            rest_secs: REST_TIMER_SECONDS,
            form_defaults: FormDefaults::default(),
            events: Vec::new(),
        }
    }

    /// Wire up a session from stored state and user configuration.
    pub fn from_config(
        gateway: Gateway,
        sink: impl NotificationSink + 'static,
        platform: impl WakeLockPlatform + 'static,
        config: &Config,
    ) -> Self {
        let state = SessionState::load(gateway).with_max_history(config.history.max_entries);
        let timers = TimerCoordinator::new(Notifier::new(sink, &config.notifications));
        let wake = WakeLock::new(platform, config.timers.wake_lock);
        Self {
            rest_secs: config.timers.rest_seconds,
            form_defaults: config.form.clone(),
            ..Self::new(state, timers, wake)
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn timers(&self) -> &TimerCoordinator {
        &self.timers
    }

    pub fn has_active_timers(&self) -> bool {
        self.timers.has_active_timers()
    }

    pub fn is_holding(&self, index: usize) -> bool {
        self.exercise_id(index)
            .is_some_and(|id| self.timers.is_holding(id))
    }

    pub fn wake_lock_held(&self) -> bool {
        self.wake.is_held()
    }

    pub fn exercise_id(&self, index: usize) -> Option<ExerciseId> {
        self.state.exercise(index).map(|e| e.id)
    }

    pub fn editing_index(&self) -> Option<usize> {
        self.state.editing().and_then(|id| self.state.position_of(id))
    }

    pub fn card(&self, index: usize) -> Option<ExerciseCard> {
        self.state
            .exercise(index)
            .map(|e| ExerciseCard::build(index, e, &self.timers))
    }

    pub fn cards(&self) -> Vec<ExerciseCard> {
        self.state
            .exercises()
            .iter()
            .enumerate()
            .map(|(i, e)| ExerciseCard::build(i, e, &self.timers))
            .collect()
    }

    /// Everything that happened since the last call.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Rep / set progress ───────────────────────────────────────────

    /// Count a rep, or start the hold that will count it.
    pub fn add_rep(&mut self, index: usize) -> Result<RepOutcome> {
        let exercise = self.exercise_at(index)?;
        let id = exercise.id;
        let hold_secs = exercise.hold_time;
        let current_reps = exercise.current_reps;
        if exercise.is_complete() {
            return Ok(RepOutcome::Finished);
        }

        if hold_secs == 0 {
            let current_reps = current_reps.saturating_add(1);
            self.state.update_exercise(
                index,
                ExercisePatch {
                    current_reps: Some(current_reps),
                    ..ExercisePatch::default()
                },
            )?;
            self.events.push(Event::RepAdded {
                exercise: id,
                current_reps,
            });
            return Ok(RepOutcome::Counted { current_reps });
        }

        if self.timers.is_holding(id) {
            return Ok(RepOutcome::AlreadyHolding);
        }

        self.engage(id, Engagement::Hold);
        self.request_wake_lock();
        self.timers.start_hold(id, hold_secs);
        self.events.push(Event::TimerStarted {
            exercise: id,
            kind: TimerKind::Hold,
            duration_secs: hold_secs,
            at: Utc::now(),
        });
        Ok(RepOutcome::HoldStarted { hold_secs })
    }

    /// Take back one rep. Never goes below zero, and refused while a hold
    /// is running.
    pub fn subtract_rep(&mut self, index: usize) -> Result<RepOutcome> {
        let exercise = self.exercise_at(index)?;
        let id = exercise.id;
        let current_reps = exercise.current_reps;
        if self.timers.is_holding(id) {
            return Ok(RepOutcome::AlreadyHolding);
        }
        if current_reps == 0 {
            return Ok(RepOutcome::Counted { current_reps: 0 });
        }

        let current_reps = current_reps - 1;
        self.state.update_exercise(
            index,
            ExercisePatch {
                current_reps: Some(current_reps),
                ..ExercisePatch::default()
            },
        )?;
        self.events.push(Event::RepRemoved {
            exercise: id,
            current_reps,
        });
        Ok(RepOutcome::Counted { current_reps })
    }

    /// Close the current set: rest before the next one, or log completion.
    pub fn complete_set(&mut self, index: usize) -> Result<SetOutcome> {
        let exercise = self.exercise_at(index)?;
        if exercise.is_complete() {
            return Ok(SetOutcome::AlreadyComplete);
        }
        let id = exercise.id;
        if self.timers.is_holding(id) {
            return Ok(SetOutcome::Holding);
        }
        let name = exercise.name.clone();
        let target_sets = exercise.target_sets;
        let current_set = exercise.current_set.saturating_add(1);

        self.state.update_exercise(
            index,
            ExercisePatch {
                current_set: Some(current_set),
                current_reps: Some(0),
                ..ExercisePatch::default()
            },
        )?;
        self.events.push(Event::SetCompleted {
            exercise: id,
            current_set,
        });

        if current_set <= target_sets {
            let rest_secs = self.rest_secs;
            self.request_wake_lock();
            self.timers.start_rest(id, rest_secs);
            self.events.push(Event::TimerStarted {
                exercise: id,
                kind: TimerKind::Rest,
                duration_secs: rest_secs,
                at: Utc::now(),
            });
            return Ok(SetOutcome::Resting {
                current_set,
                rest_secs,
            });
        }

        self.state.add_history_entry(&name);
        tracing::info!(exercise = %name, "exercise complete");
        self.events.push(Event::ExerciseCompleted {
            exercise: id,
            name,
            at: Utc::now(),
        });
        Ok(SetOutcome::ExerciseComplete)
    }

    /// Drop the rest countdown of an exercise. Returns whether one ran.
    pub fn skip_rest(&mut self, index: usize) -> Result<bool> {
        let id = self.exercise_at(index)?.id;
        if !self.timers.cancel_rest(id) {
            return Ok(false);
        }
        self.events.push(Event::TimerCancelled {
            exercise: id,
            kind: TimerKind::Rest,
        });
        self.release_wake_lock_if_idle();
        Ok(true)
    }

    /// Start an exercise over. Any other exercise caught half-done is
    /// finished off first so only one is ever mid-progress.
    pub fn reset_exercise(&mut self, index: usize) -> Result<()> {
        let id = self.exercise_at(index)?.id;

        self.engage(id, Engagement::Reset);
        self.cancel_timers(id);
        self.state.update_exercise(
            index,
            ExercisePatch {
                current_set: Some(1),
                current_reps: Some(0),
                ..ExercisePatch::default()
            },
        )?;
        self.events.push(Event::ExerciseReset { exercise: id });
        self.release_wake_lock_if_idle();
        Ok(())
    }

    /// Delete an exercise and its timers. Later positions shift down; timers
    /// and the edit selection follow ids, so nothing is redirected.
    pub fn remove_exercise(&mut self, index: usize) -> Result<Exercise> {
        let id = self.exercise_at(index)?.id;
        self.cancel_timers(id);
        let removed = self.state.remove_exercise(index)?;
        self.events.push(Event::ExerciseRemoved {
            exercise: id,
            name: removed.name.clone(),
        });
        self.release_wake_lock_if_idle();
        Ok(removed)
    }

    // ── Add / edit form ──────────────────────────────────────────────

    /// Open a blank add form.
    pub fn new_exercise_form(&mut self) -> ExerciseForm {
        self.state.set_editing(None);
        ExerciseForm::with_defaults(&self.form_defaults)
    }

    /// Open the edit form for an exercise, pre-filled.
    pub fn begin_edit(&mut self, index: usize) -> Result<ExerciseForm> {
        let exercise = self.exercise_at(index)?;
        let form = ExerciseForm {
            name: exercise.name.clone(),
            target_reps: i64::from(exercise.target_reps),
            target_sets: i64::from(exercise.target_sets),
            hold_time: i64::from(exercise.hold_time),
        };
        let id = exercise.id;
        self.state.set_editing(Some(id));
        Ok(form)
    }

    pub fn cancel_edit(&mut self) {
        self.state.set_editing(None);
    }

    /// Validate and store the form: update the exercise being edited, or
    /// append a new one. Invalid input changes nothing.
    pub fn save_exercise(&mut self, form: &ExerciseForm) -> Result<SaveOutcome> {
        let definition = validate_exercise(form)?;

        let editing = self
            .state
            .editing()
            .and_then(|id| self.state.position_of(id).map(|index| (id, index)));

        let outcome = match editing {
            Some((id, index)) => {
                self.state
                    .update_exercise(index, ExercisePatch::definition(definition))?;
                self.events.push(Event::ExerciseUpdated { exercise: id });
                SaveOutcome::Updated(id)
            }
            None => {
                let exercise = Exercise::new(definition);
                let id = exercise.id;
                let name = exercise.name.clone();
                self.state.add_exercise(exercise);
                self.events.push(Event::ExerciseAdded { exercise: id, name });
                SaveOutcome::Added(id)
            }
        };
        self.state.set_editing(None);
        Ok(outcome)
    }

    // ── History ──────────────────────────────────────────────────────

    pub fn remove_history_entry(&mut self, index: usize) -> Result<HistoryEntry> {
        let removed = self.state.remove_history_entry(index)?;
        self.events.push(Event::HistoryEntryRemoved {
            index,
            name: removed.name.clone(),
        });
        Ok(removed)
    }

    pub fn clear_history(&mut self) {
        self.state.clear_history();
        self.events.push(Event::HistoryCleared);
    }

    pub fn toggle_history_edit_mode(&mut self) -> bool {
        let editing = self.state.toggle_editing_history();
        self.events.push(Event::HistoryEditToggled { editing });
        editing
    }

    // ── Timers ───────────────────────────────────────────────────────

    /// Advance all countdowns by one second and apply what finished.
    pub fn tick(&mut self, targets: &dyn DisplayTargets) {
        let outcomes = self.timers.tick(targets);
        self.apply(outcomes);
    }

    /// Called by presentation once it has rendered: start armed holds that
    /// have a display, drop those that don't.
    pub fn attach_displays(&mut self, targets: &dyn DisplayTargets) {
        let outcomes = self.timers.attach(targets);
        self.apply(outcomes);
    }

    /// The platform may drop the wake lock while in the background.
    pub fn visibility_changed(&mut self, visible: bool) {
        if visible && self.timers.has_active_timers() && self.wake.reacquire() {
            self.events.push(Event::WakeLockAcquired);
        }
    }

    /// Stop every countdown, let the display sleep, and write state out.
    /// Returns whether the final write landed.
    pub fn shutdown(mut self) -> bool {
        self.timers.cancel_all();
        self.wake.release();
        self.state.flush()
    }

    fn apply(&mut self, outcomes: Vec<TimerOutcome>) {
        for outcome in outcomes {
            match outcome {
                TimerOutcome::Tick {
                    exercise,
                    kind,
                    remaining_secs,
                } => self.events.push(Event::TimerTick {
                    exercise,
                    kind,
                    remaining_secs,
                    display: format_time(remaining_secs),
                }),
                TimerOutcome::Completed { exercise, kind } => {
                    self.events.push(Event::TimerCompleted {
                        exercise,
                        kind,
                        at: Utc::now(),
                    });
                    if kind == TimerKind::Hold {
                        self.finish_hold(exercise);
                    }
                    self.release_wake_lock_if_idle();
                }
                TimerOutcome::Aborted { exercise } => {
                    self.events.push(Event::TimerAborted {
                        exercise,
                        at: Utc::now(),
                    });
                    self.release_wake_lock_if_idle();
                }
            }
        }
    }

    fn finish_hold(&mut self, id: ExerciseId) {
        let Some(index) = self.state.position_of(id) else {
            tracing::debug!(%id, "hold finished for removed exercise");
            return;
        };
        let Some(current_reps) = self
            .state
            .exercise(index)
            .map(|e| e.current_reps.saturating_add(1))
        else {
            return;
        };
        let patch = ExercisePatch {
            current_reps: Some(current_reps),
            ..ExercisePatch::default()
        };
        if self.state.update_exercise(index, patch).is_ok() {
            self.events.push(Event::RepAdded {
                exercise: id,
                current_reps,
            });
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn exercise_at(&self, index: usize) -> Result<&Exercise, ValidationError> {
        self.state.exercise(index).ok_or(ValidationError::OutOfBounds {
            collection: "exercises",
            index,
            len: self.state.exercises().len(),
        })
    }

    /// Single place that settles other exercises when one is engaged.
    fn engage(&mut self, id: ExerciseId, engagement: Engagement) {
        let others: Vec<(ExerciseId, bool)> = self
            .state
            .exercises()
            .iter()
            .filter(|e| e.id != id)
            .map(|e| (e.id, e.in_progress()))
            .collect();

        match engagement {
            Engagement::Hold => {
                for (other, _) in &others {
                    if self.timers.cancel_hold(*other) {
                        self.events.push(Event::TimerCancelled {
                            exercise: *other,
                            kind: TimerKind::Hold,
                        });
                    }
                }
                self.state.update_all(|e| e.active = e.id == id);
                self.events.push(Event::ExerciseActivated { exercise: id });
            }
            Engagement::Reset => {
                let settled: Vec<ExerciseId> = others
                    .into_iter()
                    .filter(|(_, in_progress)| *in_progress)
                    .map(|(other, _)| other)
                    .collect();
                if settled.is_empty() {
                    return;
                }
                for other in &settled {
                    self.cancel_timers(*other);
                }
                self.state.update_all(|e| {
                    if settled.contains(&e.id) {
                        e.force_complete();
                    }
                });
                for other in settled {
                    tracing::debug!(exercise = %other, "force-completed on reset");
                    self.events
                        .push(Event::ExerciseForceCompleted { exercise: other });
                }
            }
        }
    }

    fn cancel_timers(&mut self, id: ExerciseId) {
        for kind in self.timers.cancel(id) {
            self.events.push(Event::TimerCancelled { exercise: id, kind });
        }
    }

    fn request_wake_lock(&mut self) {
        if self.wake.request() {
            self.events.push(Event::WakeLockAcquired);
        }
    }

    fn release_wake_lock_if_idle(&mut self) {
        if !self.timers.has_active_timers() && self.wake.release() {
            self.events.push(Event::WakeLockReleased);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::notify::{Cue, RecordingSink};
    use crate::storage::MemoryStore;
    use crate::timer::AlwaysAttached;
    use crate::wake::RecordingWakeLock;

    struct Harness {
        controller: SessionController,
        sink: RecordingSink,
        wake: RecordingWakeLock,
        store: Arc<MemoryStore>,
    }

    fn harness() -> Harness {
        let sink = RecordingSink::new();
        let wake = RecordingWakeLock::new();
        let store = Arc::new(MemoryStore::new());
        let controller = SessionController::from_config(
            Gateway::new(store.clone()),
            sink.clone(),
            wake.clone(),
            &Config::default(),
        );
        Harness {
            controller,
            sink,
            wake,
            store,
        }
    }

    fn form(name: &str, reps: i64, sets: i64, hold: i64) -> ExerciseForm {
        ExerciseForm {
            name: name.into(),
            target_reps: reps,
            target_sets: sets,
            hold_time: hold,
        }
    }

    fn ticks(controller: &mut SessionController, n: usize) {
        for _ in 0..n {
            controller.tick(&AlwaysAttached);
        }
    }

    #[test]
    fn add_rep_without_hold_counts_immediately() {
        let mut h = harness();
        h.controller.save_exercise(&form("Squats", 10, 3, 0)).unwrap();
        assert_eq!(
            h.controller.add_rep(0).unwrap(),
            RepOutcome::Counted { current_reps: 1 }
        );
        assert!(!h.controller.has_active_timers());
        assert_eq!(h.controller.state().exercise(0).unwrap().current_reps, 1);
        assert!(h.store.raw("ptExercises").unwrap().contains("\"currentReps\":1"));
    }

    #[test]
    fn subtract_rep_floors_at_zero() {
        let mut h = harness();
        h.controller.save_exercise(&form("Squats", 10, 3, 0)).unwrap();
        h.controller.add_rep(0).unwrap();
        assert_eq!(
            h.controller.subtract_rep(0).unwrap(),
            RepOutcome::Counted { current_reps: 0 }
        );
        assert_eq!(
            h.controller.subtract_rep(0).unwrap(),
            RepOutcome::Counted { current_reps: 0 }
        );
        assert_eq!(h.controller.state().exercise(0).unwrap().current_reps, 0);
    }

    #[test]
    fn hold_rep_counts_after_countdown() {
        let mut h = harness();
        h.controller.save_exercise(&form("Plank", 1, 3, 30)).unwrap();
        assert_eq!(
            h.controller.add_rep(0).unwrap(),
            RepOutcome::HoldStarted { hold_secs: 30 }
        );
        assert!(h.controller.is_holding(0));
        assert!(h.controller.state().exercise(0).unwrap().active);
        assert_eq!(h.sink.count(Cue::Chime), 1);
        assert!(h.controller.wake_lock_held());

        ticks(&mut h.controller, 29);
        assert_eq!(h.controller.state().exercise(0).unwrap().current_reps, 0);

        ticks(&mut h.controller, 1);
        let exercise = h.controller.state().exercise(0).unwrap();
        assert_eq!(exercise.current_reps, 1);
        assert!(exercise.active);
        assert_eq!(h.sink.count(Cue::Bell), 1);
        assert_eq!(h.sink.vibrations(), 1);
        assert!(!h.controller.wake_lock_held());
        assert_eq!(h.wake.releases(), 1);
    }

    #[test]
    fn running_hold_blocks_set_and_subtract() {
        let mut h = harness();
        h.controller.save_exercise(&form("Plank", 2, 3, 5)).unwrap();
        h.controller.add_rep(0).unwrap();
        ticks(&mut h.controller, 5);
        h.controller.add_rep(0).unwrap();
        assert!(!h.controller.card(0).unwrap().can_complete_set);

        assert_eq!(h.controller.complete_set(0).unwrap(), SetOutcome::Holding);
        assert_eq!(
            h.controller.subtract_rep(0).unwrap(),
            RepOutcome::AlreadyHolding
        );
        let exercise = h.controller.state().exercise(0).unwrap();
        assert_eq!((exercise.current_set, exercise.current_reps), (1, 1));

        ticks(&mut h.controller, 5);
        let exercise = h.controller.state().exercise(0).unwrap();
        assert_eq!((exercise.current_set, exercise.current_reps), (1, 2));
        let id = exercise.id;
        assert!(!h.controller.timers().is_resting(id));

        assert!(matches!(
            h.controller.complete_set(0).unwrap(),
            SetOutcome::Resting { current_set: 2, .. }
        ));
    }

    #[test]
    fn oversized_sets_are_rejected_before_reset() {
        let mut h = harness();
        let err = h
            .controller
            .save_exercise(&form("Huge", 10, 99_999_999_999, 0))
            .unwrap_err();
        assert_eq!(err.to_string(), "Target sets cannot be more than 100");
        h.controller.save_exercise(&form("Most", 10, 100, 0)).unwrap();
        h.controller.save_exercise(&form("Other", 10, 3, 0)).unwrap();
        h.controller.add_rep(0).unwrap();

        h.controller.reset_exercise(1).unwrap();

        let exercise = h.controller.state().exercise(0).unwrap();
        assert_eq!(exercise.current_set, 101);
        assert!(exercise.is_complete());
        assert_eq!(h.controller.state().exercises().len(), 2);
    }

    #[test]
    fn stored_extreme_sets_do_not_overflow() {
        let store = Arc::new(MemoryStore::with_entries([(
            "ptExercises",
            format!(
                r#"[{{"name":"Loaded","targetReps":1,"targetSets":{max},"currentSet":3,"currentReps":1}},
                    {{"name":"Other","targetReps":1,"targetSets":3}}]"#,
                max = u32::MAX
            ),
        )]));
        let mut controller = SessionController::from_config(
            Gateway::new(store),
            RecordingSink::new(),
            RecordingWakeLock::new(),
            &Config::default(),
        );
        controller.reset_exercise(1).unwrap();
        assert_eq!(
            controller.state().exercise(0).unwrap().current_set,
            u32::MAX
        );
    }

    #[test]
    fn skipped_rest_releases_wake_lock() {
        let mut h = harness();
        h.controller.save_exercise(&form("Bridge", 10, 3, 0)).unwrap();
        h.controller.complete_set(0).unwrap();
        assert!(h.controller.has_active_timers());

        assert!(h.controller.skip_rest(0).unwrap());
        assert!(!h.controller.has_active_timers());
        assert_eq!((h.wake.acquisitions(), h.wake.releases()), (1, 1));
        assert!(!h.controller.skip_rest(0).unwrap());
        assert_eq!(h.controller.state().exercise(0).unwrap().current_set, 2);
    }

    #[test]
    fn second_add_rep_while_holding_is_noop() {
        let mut h = harness();
        h.controller.save_exercise(&form("Plank", 1, 3, 30)).unwrap();
        h.controller.add_rep(0).unwrap();
        ticks(&mut h.controller, 5);
        assert_eq!(h.controller.add_rep(0).unwrap(), RepOutcome::AlreadyHolding);
        let id = h.controller.exercise_id(0).unwrap();
        assert_eq!(h.controller.timers().remaining(id, TimerKind::Hold), Some(25));
        assert_eq!(h.sink.count(Cue::Chime), 1);
    }

    #[test]
    fn hold_on_one_exercise_cancels_hold_on_another() {
        let mut h = harness();
        h.controller.save_exercise(&form("Plank", 1, 3, 30)).unwrap();
        h.controller.save_exercise(&form("Wall Sit", 1, 3, 45)).unwrap();
        h.controller.add_rep(0).unwrap();
        h.controller.add_rep(1).unwrap();

        assert!(!h.controller.is_holding(0));
        assert!(h.controller.is_holding(1));
        let active: Vec<bool> = h
            .controller
            .state()
            .exercises()
            .iter()
            .map(|e| e.active)
            .collect();
        assert_eq!(active, vec![false, true]);
    }

    #[test]
    fn complete_set_starts_rest_without_history() {
        let mut h = harness();
        h.controller.save_exercise(&form("Squats", 10, 3, 0)).unwrap();
        h.controller.add_rep(0).unwrap();
        assert_eq!(
            h.controller.complete_set(0).unwrap(),
            SetOutcome::Resting {
                current_set: 2,
                rest_secs: 60
            }
        );
        let exercise = h.controller.state().exercise(0).unwrap();
        assert_eq!(exercise.current_set, 2);
        assert_eq!(exercise.current_reps, 0);
        let id = exercise.id;
        assert!(h.controller.timers().is_resting(id));
        assert!(h.controller.state().history().is_empty());
        assert!(h.controller.wake_lock_held());

        ticks(&mut h.controller, 60);
        assert!(!h.controller.has_active_timers());
        assert!(!h.controller.wake_lock_held());
        assert_eq!(h.sink.count(Cue::Bell), 1);
    }

    #[test]
    fn completing_last_set_logs_history_and_skips_rest() {
        let mut h = harness();
        h.controller.save_exercise(&form("Squats", 10, 1, 0)).unwrap();
        assert_eq!(
            h.controller.complete_set(0).unwrap(),
            SetOutcome::ExerciseComplete
        );
        let exercise = h.controller.state().exercise(0).unwrap();
        assert_eq!(exercise.current_set, 2);
        assert_eq!(exercise.current_reps, 0);
        assert!(!h.controller.has_active_timers());
        assert_eq!(h.controller.state().history().len(), 1);
        assert_eq!(h.controller.state().history()[0].name, "Squats");

        assert_eq!(
            h.controller.complete_set(0).unwrap(),
            SetOutcome::AlreadyComplete
        );
        assert_eq!(h.controller.state().history().len(), 1);
        assert_eq!(h.controller.add_rep(0).unwrap(), RepOutcome::Finished);
    }

    #[test]
    fn reset_finishes_other_in_progress_exercises() {
        let mut h = harness();
        h.controller.save_exercise(&form("Squats", 10, 3, 0)).unwrap();
        h.controller.save_exercise(&form("Lunges", 10, 3, 0)).unwrap();
        h.controller.save_exercise(&form("Bridge", 10, 3, 0)).unwrap();
        h.controller.complete_set(1).unwrap();
        h.controller.add_rep(0).unwrap();

        h.controller.reset_exercise(0).unwrap();

        let exercises = h.controller.state().exercises();
        assert_eq!((exercises[0].current_set, exercises[0].current_reps), (1, 0));
        assert_eq!((exercises[1].current_set, exercises[1].current_reps), (4, 0));
        assert_eq!((exercises[2].current_set, exercises[2].current_reps), (1, 0));
        assert!(!h.controller.has_active_timers());
        assert!(!h.controller.wake_lock_held());
        assert!(h.controller.state().history().is_empty());
    }

    #[test]
    fn remove_does_not_redirect_timers() {
        let mut h = harness();
        h.controller.save_exercise(&form("Squats", 10, 3, 0)).unwrap();
        h.controller.save_exercise(&form("Plank", 1, 3, 5)).unwrap();
        h.controller.add_rep(1).unwrap();

        let removed = h.controller.remove_exercise(0).unwrap();
        assert_eq!(removed.name, "Squats");
        assert!(h.controller.is_holding(0));

        ticks(&mut h.controller, 5);
        assert_eq!(h.controller.state().exercise(0).unwrap().name, "Plank");
        assert_eq!(h.controller.state().exercise(0).unwrap().current_reps, 1);
    }

    #[test]
    fn removing_holding_exercise_releases_wake_lock() {
        let mut h = harness();
        h.controller.save_exercise(&form("Plank", 1, 3, 5)).unwrap();
        h.controller.add_rep(0).unwrap();
        h.controller.remove_exercise(0).unwrap();
        assert!(!h.controller.has_active_timers());
        assert!(!h.controller.wake_lock_held());
    }

    #[test]
    fn invalid_form_changes_nothing() {
        let mut h = harness();
        let err = h.controller.save_exercise(&form("  ", 10, 3, 0)).unwrap_err();
        assert_eq!(err.to_string(), "Please enter an exercise name");
        assert!(h.controller.state().exercises().is_empty());
        assert!(h.store.raw("ptExercises").is_none());
    }

    #[test]
    fn edit_updates_definition_in_place() {
        let mut h = harness();
        h.controller.save_exercise(&form("Squats", 10, 3, 0)).unwrap();
        h.controller.add_rep(0).unwrap();
        let mut edit = h.controller.begin_edit(0).unwrap();
        assert_eq!(h.controller.editing_index(), Some(0));
        assert_eq!(edit.name, "Squats");

        edit.name = "Goblet Squats".into();
        edit.target_reps = 12;
        let outcome = h.controller.save_exercise(&edit).unwrap();
        assert!(matches!(outcome, SaveOutcome::Updated(_)));
        assert_eq!(h.controller.state().exercises().len(), 1);
        let exercise = h.controller.state().exercise(0).unwrap();
        assert_eq!(exercise.name, "Goblet Squats");
        assert_eq!(exercise.target_reps, 12);
        assert_eq!(exercise.current_reps, 1);
        assert_eq!(h.controller.editing_index(), None);
    }

    #[test]
    fn new_form_uses_defaults_and_clears_selection() {
        let mut h = harness();
        h.controller.save_exercise(&form("Squats", 10, 3, 0)).unwrap();
        h.controller.begin_edit(0).unwrap();
        let blank = h.controller.new_exercise_form();
        assert_eq!(blank, form("", 10, 3, 0));
        assert_eq!(h.controller.editing_index(), None);
    }

    #[test]
    fn aborted_hold_counts_nothing() {
        let mut h = harness();
        h.controller.save_exercise(&form("Plank", 1, 3, 5)).unwrap();
        h.controller.add_rep(0).unwrap();
        h.controller.attach_displays(&|_: ExerciseId| false);

        assert!(!h.controller.is_holding(0));
        assert!(!h.controller.wake_lock_held());
        ticks(&mut h.controller, 10);
        assert_eq!(h.controller.state().exercise(0).unwrap().current_reps, 0);
        assert!(h
            .controller
            .take_events()
            .iter()
            .any(|e| matches!(e, Event::TimerAborted { .. })));
    }

    #[test]
    fn visibility_reacquires_only_with_timers() {
        let mut h = harness();
        h.controller.visibility_changed(true);
        assert_eq!(h.wake.acquisitions(), 0);

        h.controller.save_exercise(&form("Squats", 10, 3, 0)).unwrap();
        h.controller.complete_set(0).unwrap();
        assert_eq!(h.wake.acquisitions(), 1);
        h.controller.visibility_changed(false);
        h.controller.visibility_changed(true);
        assert_eq!(h.wake.acquisitions(), 2);
    }

    #[test]
    fn history_passthroughs() {
        let mut h = harness();
        h.controller.save_exercise(&form("Squats", 10, 1, 0)).unwrap();
        h.controller.complete_set(0).unwrap();
        assert!(h.controller.toggle_history_edit_mode());
        let removed = h.controller.remove_history_entry(0).unwrap();
        assert_eq!(removed.name, "Squats");
        assert!(!h.controller.state().editing_history());
        assert!(h.controller.remove_history_entry(0).is_err());
        h.controller.clear_history();
        assert_eq!(h.store.raw("ptHistory").as_deref(), Some("[]"));
    }

    #[test]
    fn unknown_index_is_reported() {
        let mut h = harness();
        assert!(h.controller.add_rep(0).is_err());
        assert!(h.controller.complete_set(2).is_err());
        assert!(h.controller.reset_exercise(1).is_err());
        assert!(h.controller.remove_exercise(0).is_err());
    }

    #[test]
    fn shutdown_flushes() {
        let mut h = harness();
        h.controller.save_exercise(&form("Plank", 1, 3, 5)).unwrap();
        h.controller.add_rep(0).unwrap();
        assert!(h.controller.shutdown());
        assert_eq!(h.wake.releases(), 1);
        assert!(h.store.raw("ptHistory").is_some());
    }
}
