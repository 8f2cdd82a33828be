//! Screen wake lock handle.
//!
//! One handle per session, mutated only by the controller: acquired when a
//! countdown starts, released once no countdown remains.

use std::sync::{Arc, Mutex};

use crate::error::WakeLockError;

/// Platform facility that keeps the display awake.
pub trait WakeLockPlatform: Send {
    fn acquire(&mut self) -> Result<(), WakeLockError>;
    fn release(&mut self);
}

/// Platform without a wake lock.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWakeLock;

impl WakeLockPlatform for NoWakeLock {
    fn acquire(&mut self) -> Result<(), WakeLockError> {
        Err(WakeLockError::Unsupported)
    }

    fn release(&mut self) {}
}

/// Grants every request. For hosts that stay in the foreground anyway and
/// only need to know whether the session wants the display on.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftWakeLock;

impl WakeLockPlatform for SoftWakeLock {
    fn acquire(&mut self) -> Result<(), WakeLockError> {
        Ok(())
    }

    fn release(&mut self) {}
}

/// Counts platform calls. Clones share the counters.
#[derive(Debug, Default, Clone)]
pub struct RecordingWakeLock {
    calls: Arc<Mutex<(usize, usize)>>,
}

impl RecordingWakeLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquisitions(&self) -> usize {
        self.calls.lock().map(|c| c.0).unwrap_or_default()
    }

    pub fn releases(&self) -> usize {
        self.calls.lock().map(|c| c.1).unwrap_or_default()
    }
}

impl WakeLockPlatform for RecordingWakeLock {
    fn acquire(&mut self) -> Result<(), WakeLockError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.0 += 1;
        }
        Ok(())
    }

    fn release(&mut self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.1 += 1;
        }
    }
}

/// The session's optional wake lock.
pub struct WakeLock {
    platform: Box<dyn WakeLockPlatform>,
    enabled: bool,
    held: bool,
}

impl WakeLock {
    pub fn new(platform: impl WakeLockPlatform + 'static, enabled: bool) -> Self {
        Self {
            platform: Box::new(platform),
            enabled,
            held: false,
        }
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Acquire unless already held. Returns true if newly acquired.
    pub fn request(&mut self) -> bool {
        if self.held {
            return false;
        }
        self.acquire()
    }

    /// Acquire again even if we think we hold it; the platform may have
    /// dropped it while the session was in the background.
    pub fn reacquire(&mut self) -> bool {
        self.held = false;
        self.acquire()
    }

    /// Returns true if a held lock was released.
    pub fn release(&mut self) -> bool {
        if !self.held {
            return false;
        }
        self.platform.release();
        self.held = false;
        tracing::debug!("wake lock released");
        true
    }

    fn acquire(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        match self.platform.acquire() {
            Ok(()) => {
                self.held = true;
                tracing::debug!("wake lock acquired");
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "wake lock unavailable");
                false
            }
        }
    }
}
