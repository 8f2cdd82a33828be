pub mod config;
pub mod exercise;
pub mod history;
pub mod progress;
pub mod render;
pub mod session;

use std::time::Duration;

use ptrack_core::notify::TerminalSink;
use ptrack_core::timer::AlwaysAttached;
use ptrack_core::wake::SoftWakeLock;
use ptrack_core::{Config, Database, Gateway, SessionController};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Controller over the on-disk session, configured from the user's config.
pub fn open_controller() -> Result<SessionController, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let controller =
        SessionController::from_config(Gateway::new(db), TerminalSink, SoftWakeLock, &config);
    tracing::debug!(
        exercises = controller.state().exercises().len(),
        history = controller.state().history().len(),
        "session opened"
    );
    Ok(controller)
}

/// Convert a 1-based exercise or history number to a position.
pub fn position(number: usize) -> Result<usize, String> {
    number
        .checked_sub(1)
        .ok_or_else(|| "numbers start at 1".to_string())
}

/// Drive the countdowns once per second until none remain, printing
/// progress as it goes.
pub fn wait_for_timers(controller: &mut SessionController) -> CmdResult {
    if !controller.has_active_timers() {
        return Ok(());
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // First tick fires immediately.
        interval.tick().await;
        controller.attach_displays(&AlwaysAttached);
        render::print_events(controller);
        while controller.has_active_timers() {
            interval.tick().await;
            controller.tick(&AlwaysAttached);
            render::print_events(controller);
        }
    });
    Ok(())
}

/// Write state out; a failed write was already logged.
pub fn finish(controller: SessionController) -> CmdResult {
    if !controller.shutdown() {
        eprintln!("warning: progress could not be saved");
    }
    Ok(())
}
