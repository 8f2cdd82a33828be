use clap::Subcommand;

use super::{finish, open_controller, position, render, CmdResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Show completed exercises, grouped by day
    List {
        /// Number entries so they can be removed
        #[arg(long)]
        numbered: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete one entry
    Remove {
        /// Entry number, as shown by `history list --numbered`
        number: usize,
    },
    /// Delete all entries
    Clear,
}

pub fn run(action: HistoryAction) -> CmdResult {
    let mut controller = open_controller()?;

    match action {
        HistoryAction::List { numbered, json } => {
            let history = controller.state().history();
            if json {
                println!("{}", serde_json::to_string_pretty(history)?);
            } else {
                render::print_history(history, numbered);
            }
        }
        HistoryAction::Remove { number } => {
            let removed = controller.remove_history_entry(position(number)?)?;
            println!("Removed from history: {}", removed.name);
        }
        HistoryAction::Clear => {
            controller.clear_history();
            println!("History cleared");
        }
    }

    finish(controller)
}
