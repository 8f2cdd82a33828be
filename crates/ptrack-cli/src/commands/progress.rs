use clap::Subcommand;
use ptrack_core::{format_time, RepOutcome, SetOutcome};

use super::{finish, open_controller, position, render, wait_for_timers, CmdResult};

#[derive(Subcommand)]
pub enum RepAction {
    /// Count a rep; hold exercises run their countdown before it counts
    Add {
        /// Exercise number
        number: usize,
    },
    /// Take back a rep
    Sub {
        /// Exercise number
        number: usize,
    },
}

#[derive(Subcommand)]
pub enum SetAction {
    /// Finish the current set and wait out the rest countdown
    Complete {
        /// Exercise number
        number: usize,
        /// Skip the rest; no rest timer runs
        #[arg(long)]
        no_rest: bool,
    },
}

pub fn run_rep(action: RepAction) -> CmdResult {
    let mut controller = open_controller()?;

    let index = match action {
        RepAction::Add { number } => {
            let index = position(number)?;
            match controller.add_rep(index)? {
                RepOutcome::Counted { .. } | RepOutcome::HoldStarted { .. } => {}
                RepOutcome::AlreadyHolding => println!("Already holding."),
                RepOutcome::Finished => println!("All sets are done."),
            }
            // Hold timers do not outlive this process.
            wait_for_timers(&mut controller)?;
            index
        }
        RepAction::Sub { number } => {
            let index = position(number)?;
            if controller.subtract_rep(index)? == RepOutcome::AlreadyHolding {
                println!("A hold is running; nothing to take back yet.");
            }
            index
        }
    };

    render::print_events(&mut controller);
    if let Some(card) = controller.card(index) {
        render::print_card(&card);
    }
    finish(controller)
}

pub fn run_set(action: SetAction) -> CmdResult {
    let mut controller = open_controller()?;

    let SetAction::Complete { number, no_rest } = action;
    let index = position(number)?;
    match controller.complete_set(index)? {
        SetOutcome::Resting { rest_secs, .. } if no_rest => {
            controller.skip_rest(index)?;
            println!(
                "No rest timer will run. Take {} before the next set.",
                format_time(rest_secs)
            );
        }
        SetOutcome::Resting { .. } => wait_for_timers(&mut controller)?,
        SetOutcome::ExerciseComplete => {}
        SetOutcome::Holding => println!("A hold is running; finish it first."),
        SetOutcome::AlreadyComplete => println!("All sets are done."),
    }

    render::print_events(&mut controller);
    if let Some(card) = controller.card(index) {
        render::print_card(&card);
    }
    finish(controller)
}

pub fn run_reset(number: usize) -> CmdResult {
    let mut controller = open_controller()?;
    let index = position(number)?;
    controller.reset_exercise(index)?;
    render::print_events(&mut controller);
    finish(controller)
}
