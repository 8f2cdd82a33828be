//! Presentation-ready summary of an exercise card.
//!
//! Captures which actions are available so every host applies the same
//! rules: no reps once finished, nothing that conflicts with a running hold.

use serde::Serialize;

use crate::session::{Exercise, ExerciseId, Progress};
use crate::timer::{TimerCoordinator, TimerKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExerciseCard {
    pub index: usize,
    pub id: ExerciseId,
    pub title: String,
    pub progress: Progress,
    pub active: bool,
    /// e.g. "2 / 3"
    pub sets: String,
    pub sets_done: bool,
    /// e.g. "4 / 10"
    pub reps: String,
    pub reps_done: bool,
    pub rep_button: &'static str,
    pub can_add_rep: bool,
    pub can_subtract_rep: bool,
    pub can_complete_set: bool,
    /// Prominent "Complete Set" shortcut once the reps are in.
    pub suggest_complete_set: bool,
    pub hold_display: Option<String>,
    pub rest_display: Option<String>,
}

impl ExerciseCard {
    pub fn build(index: usize, exercise: &Exercise, timers: &TimerCoordinator) -> Self {
        let complete = exercise.is_complete();
        let holding = timers.is_holding(exercise.id);
        let reps_done = exercise.reps_complete();

        let title = if exercise.has_hold() {
            format!("{} ({}s hold)", exercise.name, exercise.hold_time)
        } else {
            exercise.name.clone()
        };

        Self {
            index,
            id: exercise.id,
            title,
            progress: exercise.progress(),
            active: exercise.active,
            sets: format!("{} / {}", exercise.displayed_set(), exercise.target_sets),
            sets_done: complete,
            reps: format!("{} / {}", exercise.current_reps, exercise.target_reps),
            reps_done,
            rep_button: if exercise.has_hold() { "Start Hold" } else { "+1 Rep" },
            can_add_rep: !complete && !holding,
            can_subtract_rep: !holding,
            can_complete_set: !complete && !holding,
            suggest_complete_set: !complete && reps_done && !holding,
            hold_display: timers.display(exercise.id, TimerKind::Hold),
            rest_display: timers.display(exercise.id, TimerKind::Rest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Notifier, NullSink};
    use crate::storage::config::NotificationsConfig;
    use crate::validation::ExerciseDefinition;

    fn timers() -> TimerCoordinator {
        TimerCoordinator::new(Notifier::new(NullSink, &NotificationsConfig::default()))
    }

    fn exercise(hold_time: u32) -> Exercise {
        Exercise::new(ExerciseDefinition {
            name: "Plank".into(),
            target_reps: 1,
            target_sets: 3,
            hold_time,
        })
    }

    #[test]
    fn fresh_card() {
        let ex = exercise(0);
        let card = ExerciseCard::build(0, &ex, &timers());
        assert_eq!(card.title, "Plank");
        assert_eq!(card.sets, "1 / 3");
        assert_eq!(card.reps, "0 / 1");
        assert_eq!(card.rep_button, "+1 Rep");
        assert!(card.can_add_rep);
        assert!(!card.suggest_complete_set);
        assert_eq!(card.progress, Progress::NotStarted);
    }

    #[test]
    fn holding_disables_conflicting_actions() {
        let ex = exercise(30);
        let mut timers = timers();
        timers.start_hold(ex.id, 30);
        let card = ExerciseCard::build(0, &ex, &timers);
        assert_eq!(card.title, "Plank (30s hold)");
        assert_eq!(card.rep_button, "Start Hold");
        assert!(!card.can_add_rep);
        assert!(!card.can_subtract_rep);
        assert!(!card.can_complete_set);
        assert_eq!(card.hold_display.as_deref(), Some("0:30"));
    }

    #[test]
    fn finished_card_shows_last_set() {
        let mut ex = exercise(0);
        ex.current_set = 4;
        let card = ExerciseCard::build(0, &ex, &timers());
        assert_eq!(card.sets, "3 / 3");
        assert!(card.sets_done);
        assert!(!card.can_add_rep);
        assert_eq!(card.progress, Progress::Complete);
    }

    #[test]
    fn reps_in_suggests_complete_set() {
        let mut ex = exercise(0);
        ex.current_reps = 1;
        let card = ExerciseCard::build(0, &ex, &timers());
        assert!(card.reps_done);
        assert!(card.suggest_complete_set);
    }
}
