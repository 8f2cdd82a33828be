//! Interactive session: one line per action, countdowns ticking live.

use std::time::Duration;

use ptrack_core::timer::AlwaysAttached;
use ptrack_core::{Config, ExerciseForm, RepOutcome, SessionController, SetOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::{open_controller, position, render, CmdResult};

const HELP: &str = "\
commands:
  list                          show exercises
  add NAME[, REPS, SETS, HOLD]  add an exercise
  edit N NAME, REPS, SETS, HOLD change exercise N
  rep N | sub N                 count / take back a rep
  done N                        complete the current set
  reset N                       start exercise N over
  rm N                          delete exercise N
  history [edit|clear|rm N]     show or change history
  help | quit";

pub fn run() -> CmdResult {
    let mut controller = open_controller()?;
    let defaults = Config::load_or_default().form;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let (tx, mut rx) = mpsc::channel::<String>(16);
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if tx.send(line).await.is_err() {
                    break;
                }
            }
        });

        render::print_cards(&controller.cards());
        println!("type `help` for commands");

        let mut interval = tokio::time::interval(Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if controller.has_active_timers() {
                        controller.tick(&AlwaysAttached);
                        render::print_events(&mut controller);
                    }
                }
                line = rx.recv() => {
                    let Some(line) = line else { break };
                    match handle(&mut controller, &defaults, line.trim()) {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => eprintln!("error: {e}"),
                    }
                    controller.attach_displays(&AlwaysAttached);
                    render::print_events(&mut controller);
                }
            }
        }
    });
    // The stdin reader may still be parked on a blocking read.
    runtime.shutdown_background();

    super::finish(controller)
}

fn number_arg(rest: &str) -> Result<usize, Box<dyn std::error::Error>> {
    let number: usize = rest
        .trim()
        .parse()
        .map_err(|_| format!("expected a number, got '{}'", rest.trim()))?;
    Ok(position(number)?)
}

fn parse_form(raw: &str, defaults: &ptrack_core::storage::config::FormDefaults) -> ExerciseForm {
    let mut parts = raw.split(',').map(str::trim);
    let name = parts.next().unwrap_or_default();
    let reps = parts.next().unwrap_or_default();
    let sets = parts.next().unwrap_or_default();
    let hold = parts.next().unwrap_or_default();
    ExerciseForm::parse_fields(name, reps, sets, hold, defaults)
}

/// Returns `Ok(false)` when the user asked to leave.
fn handle(
    controller: &mut SessionController,
    defaults: &ptrack_core::storage::config::FormDefaults,
    line: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    match command {
        "" => {}
        "help" | "?" => println!("{HELP}"),
        "quit" | "exit" | "q" => return Ok(false),
        "list" | "ls" => render::print_cards(&controller.cards()),
        "add" => {
            controller.new_exercise_form();
            controller.save_exercise(&parse_form(rest, defaults))?;
        }
        "edit" => {
            let (number, fields) = rest.trim().split_once(' ').unwrap_or((rest.trim(), ""));
            let index = number_arg(number)?;
            controller.begin_edit(index)?;
            if let Err(e) = controller.save_exercise(&parse_form(fields, defaults)) {
                controller.cancel_edit();
                return Err(e.into());
            }
        }
        "rep" => {
            controller.add_rep(number_arg(rest)?)?;
        }
        "sub" => {
            if controller.subtract_rep(number_arg(rest)?)? == RepOutcome::AlreadyHolding {
                println!("A hold is running; nothing to take back yet.");
            }
        }
        "done" => {
            if controller.complete_set(number_arg(rest)?)? == SetOutcome::Holding {
                println!("A hold is running; finish it first.");
            }
        }
        "reset" => controller.reset_exercise(number_arg(rest)?)?,
        "rm" => {
            controller.remove_exercise(number_arg(rest)?)?;
        }
        "history" => {
            let (sub, arg) = rest.trim().split_once(' ').unwrap_or((rest.trim(), ""));
            match sub {
                "" => {}
                "edit" => {
                    controller.toggle_history_edit_mode();
                }
                "clear" => controller.clear_history(),
                "rm" => {
                    controller.remove_history_entry(number_arg(arg)?)?;
                }
                other => return Err(format!("unknown history command '{other}'").into()),
            }
            render::print_events(controller);
            render::print_history(
                controller.state().history(),
                controller.state().editing_history(),
            );
        }
        other => return Err(format!("unknown command '{other}', try `help`").into()),
    }
    Ok(true)
}
