//! One-second countdown shared by hold and rest timers.
//!
//! Convention: the display starts at the full duration; each tick
//! decrements, then the caller publishes the new display. The tick that
//! reaches zero reports expiry, so an N-second countdown expires on tick N
//! and shows `0:00` exactly once.

/// Format whole seconds as `M:SS`. Minutes are not padded or capped.
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Result of advancing a countdown by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Running { remaining_secs: u32 },
    Expired,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    remaining_secs: u32,
}

impl Countdown {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            remaining_secs: duration_secs,
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn display(&self) -> String {
        format_time(self.remaining_secs)
    }

    pub fn tick(&mut self) -> Step {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            Step::Expired
        } else {
            Step::Running {
                remaining_secs: self.remaining_secs,
            }
        }
    }
}
