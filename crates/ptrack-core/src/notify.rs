//! Sensory cues fired by countdowns.
//!
//! Cues are fire-and-forget: a sink that cannot play a sound or vibrate
//! logs and carries on. Nothing here returns an error to the caller.

use std::io::Write;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::storage::config::NotificationsConfig;

/// Audio cue kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    /// Single short tone marking the start of a hold.
    Chime,
    /// Three-note tone marking the end of any countdown.
    Bell,
}

/// Output device for cues.
pub trait NotificationSink: Send {
    fn play(&self, cue: Cue);

    /// Request a vibration pattern. Returns false if the device can't vibrate.
    fn vibrate(&self, pattern_ms: &[u64]) -> bool;
}

/// Applies user notification preferences in front of a sink.
pub struct Notifier {
    sink: Box<dyn NotificationSink>,
    sound: bool,
    vibration: bool,
    pattern_ms: Vec<u64>,
}

impl Notifier {
    pub fn new(sink: impl NotificationSink + 'static, config: &NotificationsConfig) -> Self {
        Self {
            sink: Box::new(sink),
            sound: config.sound,
            vibration: config.vibration,
            pattern_ms: config.vibration_pattern_ms.clone(),
        }
    }

    pub fn chime(&self) {
        if self.sound {
            self.sink.play(Cue::Chime);
        }
    }

    pub fn bell(&self) {
        if self.sound {
            self.sink.play(Cue::Bell);
        }
    }

    pub fn vibrate(&self) {
        if !self.vibration {
            return;
        }
        if !self.sink.vibrate(&self.pattern_ms) {
            tracing::debug!("vibration not supported");
        }
    }
}

/// Rings the terminal bell on stderr. Terminals cannot vibrate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn play(&self, cue: Cue) {
        let bells: &[u8] = match cue {
            Cue::Chime => b"\x07",
            Cue::Bell => b"\x07\x07",
        };
        let mut err = std::io::stderr();
        if let Err(e) = err.write_all(bells).and_then(|_| err.flush()) {
            tracing::debug!(?cue, error = %e, "audio not available");
        }
    }

    fn vibrate(&self, _pattern_ms: &[u64]) -> bool {
        false
    }
}

/// Discards every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn play(&self, _cue: Cue) {}

    fn vibrate(&self, _pattern_ms: &[u64]) -> bool {
        false
    }
}

/// What a [`RecordingSink`] observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Played(Cue),
    Vibrated(Vec<u64>),
}

/// Keeps every cue in a shared log. Clones share the log.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    log: Arc<Mutex<Vec<Notification>>>,
    can_vibrate: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            log: Arc::default(),
            can_vibrate: true,
        }
    }

    /// A sink whose device has no vibration motor.
    pub fn without_vibration() -> Self {
        Self {
            log: Arc::default(),
            can_vibrate: false,
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn count(&self, cue: Cue) -> usize {
        self.notifications()
            .iter()
            .filter(|n| **n == Notification::Played(cue))
            .count()
    }

    pub fn vibrations(&self) -> usize {
        self.notifications()
            .iter()
            .filter(|n| matches!(n, Notification::Vibrated(_)))
            .count()
    }

    fn push(&self, notification: Notification) {
        if let Ok(mut log) = self.log.lock() {
            log.push(notification);
        }
    }
}

impl NotificationSink for RecordingSink {
    fn play(&self, cue: Cue) {
        self.push(Notification::Played(cue));
    }

    fn vibrate(&self, pattern_ms: &[u64]) -> bool {
        if self.can_vibrate {
            self.push(Notification::Vibrated(pattern_ms.to_vec()));
        }
        self.can_vibrate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifier_forwards_cues() {
        let sink = RecordingSink::new();
        let notifier = Notifier::new(sink.clone(), &NotificationsConfig::default());
        notifier.chime();
        notifier.bell();
        notifier.vibrate();
        assert_eq!(
            sink.notifications(),
            vec![
                Notification::Played(Cue::Chime),
                Notification::Played(Cue::Bell),
                Notification::Vibrated(vec![200, 100, 200]),
            ]
        );
    }

    #[test]
    fn muted_notifier_stays_silent() {
        let sink = RecordingSink::new();
        let config = NotificationsConfig {
            sound: false,
            vibration: false,
            ..NotificationsConfig::default()
        };
        let notifier = Notifier::new(sink.clone(), &config);
        notifier.chime();
        notifier.bell();
        notifier.vibrate();
        assert!(sink.notifications().is_empty());
    }

    #[test]
    fn missing_vibration_is_swallowed() {
        let sink = RecordingSink::without_vibration();
        let notifier = Notifier::new(sink.clone(), &NotificationsConfig::default());
        notifier.vibrate();
        assert_eq!(sink.vibrations(), 0);
    }
}
