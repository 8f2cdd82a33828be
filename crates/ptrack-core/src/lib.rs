//! # ptrack Core Library
//!
//! This library provides the core logic for ptrack, a physical-therapy
//! exercise tracker. Every operation is available through the standalone
//! `ptrack` CLI; any other front end is a thin layer over the same
//! [`SessionController`].
//!
//! ## Architecture
//!
//! - **Session**: exercises and completion history, written through to
//!   storage after every change
//! - **Timers**: tick-driven hold and rest countdowns; the caller invokes
//!   `tick()` once per second
//! - **Storage**: SQLite key-value store for session data and TOML-based
//!   configuration
//! - **Notifications / Wake lock**: platform seams the host plugs in
//!
//! ## Key Components
//!
//! - [`SessionController`]: one entry point per user action
//! - [`TimerCoordinator`]: countdown bookkeeping keyed by exercise id
//! - [`Gateway`]: JSON persistence of the two collections
//! - [`Config`]: application configuration management

pub mod controller;
pub mod error;
pub mod events;
pub mod notify;
pub mod session;
pub mod storage;
pub mod timer;
pub mod validation;
pub mod view;
pub mod wake;

pub use controller::{RepOutcome, SaveOutcome, SessionController, SetOutcome, REST_TIMER_SECONDS};
pub use error::{ConfigError, CoreError, StorageError, ValidationError, WakeLockError};
pub use events::Event;
pub use notify::{Cue, NotificationSink, Notifier};
pub use session::{Exercise, ExerciseId, HistoryEntry, Progress, SessionState};
pub use storage::{Config, Database, Gateway, MemoryStore};
pub use timer::{format_time, DisplayTargets, TimerCoordinator, TimerKind, TimerOutcome};
pub use validation::{validate_exercise, ExerciseForm};
pub use view::ExerciseCard;
pub use wake::{WakeLock, WakeLockPlatform};
