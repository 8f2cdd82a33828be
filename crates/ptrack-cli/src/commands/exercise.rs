use clap::Subcommand;
use ptrack_core::{Config, ExerciseForm, SaveOutcome};

use super::{finish, open_controller, position, render, CmdResult};

#[derive(Subcommand)]
pub enum ExerciseAction {
    /// Add an exercise
    Add {
        /// Exercise name
        name: String,
        /// Reps per set (blank or 0 uses the configured default)
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        reps: String,
        /// Number of sets
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        sets: String,
        /// Seconds each rep is held; 0 for no hold
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        hold: String,
    },
    /// Change an exercise's definition; progress is kept
    Edit {
        /// Exercise number
        number: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        reps: Option<i64>,
        #[arg(long, allow_hyphen_values = true)]
        sets: Option<i64>,
        #[arg(long, allow_hyphen_values = true)]
        hold: Option<i64>,
    },
    /// List exercises and their progress
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an exercise
    Remove {
        /// Exercise number
        number: usize,
    },
}

pub fn run(action: ExerciseAction) -> CmdResult {
    let mut controller = open_controller()?;

    match action {
        ExerciseAction::Add {
            name,
            reps,
            sets,
            hold,
        } => {
            let defaults = Config::load_or_default().form;
            let form = ExerciseForm::parse_fields(&name, &reps, &sets, &hold, &defaults);
            controller.new_exercise_form();
            if let SaveOutcome::Added(_) = controller.save_exercise(&form)? {
                let number = controller.state().exercises().len();
                println!("Exercise added: #{number} {}", form.name.trim());
            }
        }
        ExerciseAction::Edit {
            number,
            name,
            reps,
            sets,
            hold,
        } => {
            let index = position(number)?;
            let mut form = controller.begin_edit(index)?;
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(reps) = reps {
                form.target_reps = reps;
            }
            if let Some(sets) = sets {
                form.target_sets = sets;
            }
            if let Some(hold) = hold {
                form.hold_time = hold;
            }
            controller.save_exercise(&form)?;
            println!("Exercise updated: #{number} {}", form.name.trim());
        }
        ExerciseAction::List { json } => {
            let cards = controller.cards();
            if json {
                println!("{}", serde_json::to_string_pretty(&cards)?);
            } else {
                render::print_cards(&cards);
            }
        }
        ExerciseAction::Remove { number } => {
            let removed = controller.remove_exercise(position(number)?)?;
            println!("Exercise removed: {}", removed.name);
        }
    }

    finish(controller)
}
