//! Per-exercise countdown bookkeeping.
//!
//! Two independent tracks per exercise:
//!
//! ```text
//! rest:  idle -> running -> (expired | cancelled)
//! hold:  idle -> armed -> running -> (expired | cancelled | aborted)
//! ```
//!
//! The coordinator owns no thread. The host calls `tick()` once per second
//! and the coordinator reports what happened as [`TimerOutcome`]s.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::countdown::{Countdown, Step};
use crate::notify::Notifier;
use crate::session::ExerciseId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    Hold,
    Rest,
}

/// Presentation's answer to "is there somewhere to show this countdown?".
pub trait DisplayTargets {
    fn has_hold_display(&self, exercise: ExerciseId) -> bool;
}

/// Every exercise has a display.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysAttached;

impl DisplayTargets for AlwaysAttached {
    fn has_hold_display(&self, _exercise: ExerciseId) -> bool {
        true
    }
}

impl<F: Fn(ExerciseId) -> bool> DisplayTargets for F {
    fn has_hold_display(&self, exercise: ExerciseId) -> bool {
        self(exercise)
    }
}

/// Something the host needs to react to after `tick` or `attach`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerOutcome {
    /// Countdown moved; `remaining_secs` is what to display.
    Tick {
        exercise: ExerciseId,
        kind: TimerKind,
        remaining_secs: u32,
    },
    /// Reached zero. Cues have already fired.
    Completed { exercise: ExerciseId, kind: TimerKind },
    /// Hold had nowhere to display and was dropped without completing.
    Aborted { exercise: ExerciseId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldPhase {
    Armed,
    Running,
}

#[derive(Debug)]
struct HoldTimer {
    phase: HoldPhase,
    countdown: Countdown,
}

/// Snapshot of one running timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveTimer {
    pub exercise: ExerciseId,
    pub kind: TimerKind,
    pub remaining_secs: u32,
}

pub struct TimerCoordinator {
    holds: BTreeMap<ExerciseId, HoldTimer>,
    rests: BTreeMap<ExerciseId, Countdown>,
    notifier: Notifier,
}

impl TimerCoordinator {
    pub fn new(notifier: Notifier) -> Self {
        Self {
            holds: BTreeMap::new(),
            rests: BTreeMap::new(),
            notifier,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn has_active_timers(&self) -> bool {
        !self.holds.is_empty() || !self.rests.is_empty()
    }

    /// Armed or running hold for this exercise.
    pub fn is_holding(&self, exercise: ExerciseId) -> bool {
        self.holds.contains_key(&exercise)
    }

    pub fn is_resting(&self, exercise: ExerciseId) -> bool {
        self.rests.contains_key(&exercise)
    }

    pub fn remaining(&self, exercise: ExerciseId, kind: TimerKind) -> Option<u32> {
        match kind {
            TimerKind::Hold => self.holds.get(&exercise).map(|h| h.countdown.remaining_secs()),
            TimerKind::Rest => self.rests.get(&exercise).map(Countdown::remaining_secs),
        }
    }

    /// `M:SS` for the countdown, if one is running.
    pub fn display(&self, exercise: ExerciseId, kind: TimerKind) -> Option<String> {
        self.remaining(exercise, kind).map(super::format_time)
    }

    pub fn active(&self) -> Vec<ActiveTimer> {
        let holds = self.holds.iter().map(|(id, h)| ActiveTimer {
            exercise: *id,
            kind: TimerKind::Hold,
            remaining_secs: h.countdown.remaining_secs(),
        });
        let rests = self.rests.iter().map(|(id, c)| ActiveTimer {
            exercise: *id,
            kind: TimerKind::Rest,
            remaining_secs: c.remaining_secs(),
        });
        holds.chain(rests).collect()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arm a hold. Returns false (and changes nothing) if one already exists.
    pub fn start_hold(&mut self, exercise: ExerciseId, hold_secs: u32) -> bool {
        if self.holds.contains_key(&exercise) {
            return false;
        }
        self.holds.insert(
            exercise,
            HoldTimer {
                phase: HoldPhase::Armed,
                countdown: Countdown::new(hold_secs),
            },
        );
        self.notifier.chime();
        tracing::debug!(%exercise, hold_secs, "hold timer armed");
        true
    }

    /// Start a rest countdown, replacing any rest already running.
    pub fn start_rest(&mut self, exercise: ExerciseId, rest_secs: u32) {
        if self.rests.insert(exercise, Countdown::new(rest_secs)).is_some() {
            tracing::debug!(%exercise, "rest timer restarted");
        } else {
            tracing::debug!(%exercise, rest_secs, "rest timer started");
        }
    }

    /// Cancel both tracks. Returns the kinds that were running.
    pub fn cancel(&mut self, exercise: ExerciseId) -> Vec<TimerKind> {
        let mut cancelled = Vec::new();
        if self.holds.remove(&exercise).is_some() {
            cancelled.push(TimerKind::Hold);
        }
        if self.rests.remove(&exercise).is_some() {
            cancelled.push(TimerKind::Rest);
        }
        cancelled
    }

    pub fn cancel_hold(&mut self, exercise: ExerciseId) -> bool {
        self.holds.remove(&exercise).is_some()
    }

    pub fn cancel_rest(&mut self, exercise: ExerciseId) -> bool {
        self.rests.remove(&exercise).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.holds.clear();
        self.rests.clear();
    }

    /// Move armed holds to running, or abort those with no display.
    ///
    /// Newly running holds report their full duration.
    pub fn attach(&mut self, targets: &dyn DisplayTargets) -> Vec<TimerOutcome> {
        let mut outcomes = Vec::new();
        let armed: Vec<ExerciseId> = self
            .holds
            .iter()
            .filter(|(_, h)| h.phase == HoldPhase::Armed)
            .map(|(id, _)| *id)
            .collect();

        for exercise in armed {
            if !targets.has_hold_display(exercise) {
                self.holds.remove(&exercise);
                tracing::debug!(%exercise, "hold aborted, no display");
                outcomes.push(TimerOutcome::Aborted { exercise });
                continue;
            }
            if let Some(hold) = self.holds.get_mut(&exercise) {
                hold.phase = HoldPhase::Running;
                outcomes.push(TimerOutcome::Tick {
                    exercise,
                    kind: TimerKind::Hold,
                    remaining_secs: hold.countdown.remaining_secs(),
                });
            }
        }
        outcomes
    }

    /// Advance every countdown by one second.
    ///
    /// Holds still armed are attached first and count this tick, so a hold
    /// of N seconds completes on the Nth tick either way.
    pub fn tick(&mut self, targets: &dyn DisplayTargets) -> Vec<TimerOutcome> {
        let mut outcomes: Vec<TimerOutcome> = self
            .attach(targets)
            .into_iter()
            .filter(|o| matches!(o, TimerOutcome::Aborted { .. }))
            .collect();

        let mut expired = Vec::new();
        for (exercise, hold) in self.holds.iter_mut() {
            match hold.countdown.tick() {
                Step::Running { remaining_secs } => outcomes.push(TimerOutcome::Tick {
                    exercise: *exercise,
                    kind: TimerKind::Hold,
                    remaining_secs,
                }),
                Step::Expired => expired.push((*exercise, TimerKind::Hold)),
            }
        }
        for (exercise, rest) in self.rests.iter_mut() {
            match rest.tick() {
                Step::Running { remaining_secs } => outcomes.push(TimerOutcome::Tick {
                    exercise: *exercise,
                    kind: TimerKind::Rest,
                    remaining_secs,
                }),
                Step::Expired => expired.push((*exercise, TimerKind::Rest)),
            }
        }

        for (exercise, kind) in expired {
            match kind {
                TimerKind::Hold => {
                    self.holds.remove(&exercise);
                }
                TimerKind::Rest => {
                    self.rests.remove(&exercise);
                }
            }
            outcomes.push(TimerOutcome::Tick {
                exercise,
                kind,
                remaining_secs: 0,
            });
            self.notifier.bell();
            self.notifier.vibrate();
            tracing::debug!(%exercise, ?kind, "timer expired");
            outcomes.push(TimerOutcome::Completed { exercise, kind });
        }
        outcomes
    }
}
