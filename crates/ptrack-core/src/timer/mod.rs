mod coordinator;
mod countdown;

pub use coordinator::{
    ActiveTimer, AlwaysAttached, DisplayTargets, TimerCoordinator, TimerKind, TimerOutcome,
};
pub use countdown::{format_time, Countdown};
