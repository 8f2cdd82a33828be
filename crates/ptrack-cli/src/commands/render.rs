//! Terminal rendering of cards, history and events.

use std::io::Write;

use ptrack_core::session::group_by_day;
use ptrack_core::{Event, ExerciseCard, HistoryEntry, Progress, SessionController, TimerKind};

fn marker(progress: Progress) -> &'static str {
    match progress {
        Progress::NotStarted => " ",
        Progress::InProgress => "~",
        Progress::Complete => "✓",
    }
}

pub fn print_card(card: &ExerciseCard) {
    let active = if card.active { "*" } else { " " };
    println!(
        "{:>3}.{active}[{}] {:<28} set {:<7} reps {:<7}",
        card.index + 1,
        marker(card.progress),
        card.title,
        card.sets,
        card.reps,
    );
    if let Some(hold) = &card.hold_display {
        println!("       holding {hold}");
    }
    if let Some(rest) = &card.rest_display {
        println!("       resting {rest}");
    }
    if card.suggest_complete_set {
        println!("       reps done, complete the set");
    }
}

pub fn print_cards(cards: &[ExerciseCard]) {
    if cards.is_empty() {
        println!("No exercises yet. Add one with `ptrack exercise add`.");
        return;
    }
    for card in cards {
        print_card(card);
    }
}

pub fn print_history(history: &[HistoryEntry], editing: bool) {
    if history.is_empty() {
        println!("No completed exercises yet.");
        return;
    }
    for day in group_by_day(history) {
        println!("{}", day.date.format("%A, %B %-d, %Y"));
        for (index, entry) in day.entries {
            let time = entry.completed_at().with_timezone(&chrono::Local);
            if editing {
                println!("  {:>3}. {}  {}", index + 1, time.format("%H:%M"), entry.name);
            } else {
                println!("       {}  {}", time.format("%H:%M"), entry.name);
            }
        }
    }
}

fn kind_label(kind: TimerKind) -> &'static str {
    match kind {
        TimerKind::Hold => "hold",
        TimerKind::Rest => "rest",
    }
}

/// Human line for an event; ticks are drawn in place by [`print_events`].
pub fn describe(event: &Event, controller: &SessionController) -> Option<String> {
    let name = |id| {
        controller
            .state()
            .exercise_by_id(id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| "exercise".to_string())
    };
    let line = match event {
        Event::ExerciseAdded { name, .. } => format!("added {name}"),
        Event::ExerciseUpdated { exercise } => format!("updated {}", name(*exercise)),
        Event::ExerciseRemoved { name, .. } => format!("removed {name}"),
        Event::RepAdded {
            exercise,
            current_reps,
        }
        | Event::RepRemoved {
            exercise,
            current_reps,
        } => format!("{}: {current_reps} reps", name(*exercise)),
        Event::SetCompleted {
            exercise,
            current_set,
        } => format!("{}: now on set {current_set}", name(*exercise)),
        Event::ExerciseCompleted { name, .. } => format!("{name} complete"),
        Event::ExerciseReset { exercise } => format!("{} reset", name(*exercise)),
        Event::ExerciseForceCompleted { exercise } => {
            format!("{} marked complete", name(*exercise))
        }
        Event::TimerStarted {
            exercise,
            kind,
            duration_secs,
            ..
        } => format!(
            "{}: {} {}",
            name(*exercise),
            kind_label(*kind),
            ptrack_core::format_time(*duration_secs)
        ),
        Event::TimerCompleted { exercise, kind, .. } => {
            format!("{}: {} done", name(*exercise), kind_label(*kind))
        }
        Event::TimerAborted { exercise, .. } => format!("{}: hold abandoned", name(*exercise)),
        Event::TimerCancelled { exercise, kind } => {
            format!("{}: {} cancelled", name(*exercise), kind_label(*kind))
        }
        Event::HistoryEntryRemoved { name, .. } => format!("removed {name} from history"),
        Event::HistoryCleared => "history cleared".to_string(),
        Event::HistoryEditToggled { editing } => {
            if *editing {
                "history edit mode on".to_string()
            } else {
                "history edit mode off".to_string()
            }
        }
        Event::ExerciseActivated { .. }
        | Event::TimerTick { .. }
        | Event::WakeLockAcquired
        | Event::WakeLockReleased => return None,
    };
    Some(line)
}

/// Drain and print pending events.
pub fn print_events(controller: &mut SessionController) {
    let mut stdout = std::io::stdout();
    for event in controller.take_events() {
        if let Event::TimerTick {
            kind, display, remaining_secs, ..
        } = &event
        {
            let _ = write!(stdout, "\r  {} {display}   ", kind_label(*kind));
            if *remaining_secs == 0 {
                let _ = writeln!(stdout);
            }
            let _ = stdout.flush();
            continue;
        }
        if let Some(line) = describe(&event, controller) {
            println!("{line}");
        }
    }
}
