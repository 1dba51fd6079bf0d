use std::sync::Arc;

use ansi_term::Colour::{Green, Red, Yellow};
use anyhow::{bail, Result};
use chrono::NaiveDate;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

use crate::{
    planner::{
        error::Candidate,
        normalize::{normalize_show_type, Meal, ShowType},
        nutrients::{FoodInfo, SortMode},
        operations::{FoodAdded, TaskToggle},
        PlannerError,
    },
    server,
    tracker::AppTracker,
    utils::{
        clock::Clock,
        time::{parse_date_arg, parse_iso_date, record_file_name},
    },
};

use super::{output, Commands};

pub fn success(message: impl AsRef<str>) {
    println!("{} {}", Green.paint("[✓]"), message.as_ref());
}

pub fn warning(message: impl AsRef<str>) {
    println!("{} {}", Yellow.paint("[!]"), message.as_ref());
}

pub fn failure(message: impl AsRef<str>) {
    eprintln!("{} {}", Red.paint("[x]"), message.as_ref());
}

/// The day a command works on: `--date` if given, today otherwise.
pub fn target_date(clock: &dyn Clock, date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(date) => parse_date_arg(date, clock.now()),
        None => Ok(clock.today()),
    }
}

/// Splits the free arguments of `show` into a date and a view. A token is an ISO date, a view
/// keyword or a natural language date, in that order of precedence.
pub fn classify_show_args(
    clock: &dyn Clock,
    args: &[String],
) -> Result<(Option<NaiveDate>, ShowType)> {
    let mut date = None;
    let mut show = None;
    for arg in args {
        if let Some(iso) = parse_iso_date(arg) {
            date = Some(iso);
            continue;
        }
        match normalize_show_type(arg) {
            Ok(v) if show.is_none() => show = Some(v),
            Ok(_) => bail!("Only one view can be shown at a time, got '{arg}'"),
            Err(e) => match parse_date_arg(arg, clock.now()) {
                Ok(parsed) => date = Some(parsed),
                Err(_) => return Err(e.into()),
            },
        }
    }
    Ok((date, show.unwrap_or(ShowType::All)))
}

/// Lines typed by the user, shared by the prompt and follow-up questions.
pub type StdinLines = Lines<BufReader<Stdin>>;

pub fn stdin_lines() -> StdinLines {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Asks the user to pick one of `candidates` by its number.
pub async fn choose_candidate<R: AsyncBufRead + Unpin>(
    input: &mut Lines<R>,
    candidates: &[Candidate],
) -> Result<String> {
    println!("Enter the number of the food to log:");
    let line = input.next_line().await?.unwrap_or_default();
    let answer = line.trim();
    answer
        .parse::<usize>()
        .ok()
        .and_then(|choice| candidates.iter().find(|v| v.position == choice))
        .map(|v| v.key.clone())
        .ok_or_else(|| PlannerError::InvalidSelection(answer.to_string()).into())
}

fn report_food(added: &FoodAdded) {
    if added.auto_selected {
        warning(format!("Using '{}'", added.entry.name));
    }
    let entry = &added.entry;
    success(format!(
        "Added {}g {} to {}: protein {:.1}g, fat {:.1}g, carbon {:.1}g",
        entry.weight,
        entry.name,
        added.meal,
        entry.protein,
        entry.fat,
        entry.carbon
    ));
}

async fn add_food(
    tracker: &AppTracker,
    input: &mut StdinLines,
    date: NaiveDate,
    meal: Meal,
    name: &str,
    weight: f64,
) -> Result<()> {
    let added = match tracker.add_food(date, meal, name, weight).await {
        Err(e) => match e.downcast_ref::<PlannerError>() {
            Some(PlannerError::Ambiguous { candidates, .. }) => {
                warning(e.to_string());
                let chosen = choose_candidate(input, candidates).await?;
                tracker.add_food(date, meal, &chosen, weight).await?
            }
            _ => return Err(e),
        },
        Ok(added) => added,
    };
    report_food(&added);
    Ok(())
}

fn report_task_toggle(snippet: &str, toggle: TaskToggle) {
    match toggle {
        TaskToggle::Changed { task, status: true } => {
            success(format!("Marked '{}' in [{}]", task.label, task.section))
        }
        TaskToggle::Changed {
            task,
            status: false,
        } => println!("[ ] Unmarked '{}' in [{}]", task.label, task.section),
        TaskToggle::Unchanged { status, matches } => {
            let state = if status { "checked" } else { "unchecked" };
            warning(format!("All matches for '{snippet}' are already {state}:"));
            for task in matches {
                println!(" - {} [{}]", task.label, task.section);
            }
        }
    }
}

/// Runs one parsed command. `input` answers follow-up questions.
pub async fn execute(
    tracker: &Arc<AppTracker>,
    clock: &Arc<dyn Clock>,
    input: &mut StdinLines,
    date: Option<&str>,
    command: Commands,
) -> Result<()> {
    debug!("Executing {command:?}");
    match command {
        Commands::Interactive => {
            warning("Already in interactive mode");
            Ok(())
        }
        Commands::Init { date: init_date } => {
            let date = target_date(clock.as_ref(), init_date.as_deref().or(date))?;
            tracker.init(date).await?;
            success(format!("Initialized {date} with routine and empty goals."));
            Ok(())
        }
        Commands::Show { args } => {
            let (shown_date, show) = classify_show_args(clock.as_ref(), &args)?;
            let date = match shown_date {
                Some(v) => v,
                None => target_date(clock.as_ref(), date)?,
            };
            let record = tracker.load(date).await?;
            let targets = tracker.targets().await?;
            println!();
            for line in output::render(show, &record, &targets) {
                println!("{line}");
            }
            Ok(())
        }
        Commands::Check { text } => {
            let date = target_date(clock.as_ref(), date)?;
            report_task_toggle(&text, tracker.check_task(date, &text, true).await?);
            Ok(())
        }
        Commands::Uncheck { text } => {
            let date = target_date(clock.as_ref(), date)?;
            report_task_toggle(&text, tracker.check_task(date, &text, false).await?);
            Ok(())
        }
        Commands::CheckGoal { section, text } => {
            let date = target_date(clock.as_ref(), date)?;
            let goal = tracker.check_goal(date, section, &text, true).await?;
            success(format!("Marked goal: {} in [{}]", goal.text, goal.section));
            Ok(())
        }
        Commands::UncheckGoal { section, text } => {
            let date = target_date(clock.as_ref(), date)?;
            let goal = tracker.check_goal(date, section, &text, false).await?;
            println!("[ ] Unmarked goal: {} in [{}]", goal.text, goal.section);
            Ok(())
        }
        Commands::AddGoal { section, text } => {
            let date = target_date(clock.as_ref(), date)?;
            tracker.add_goal(date, section, &text).await?;
            println!("[+] Added to {} Goals: {text}", section.title());
            Ok(())
        }
        Commands::Plan { task, start, end } => {
            let date = target_date(clock.as_ref(), date)?;
            let range = tracker.plan(date, &task, start, end).await?;
            println!(
                "[->] Planned '{task}' from {}:00 to {}:00",
                range.start, range.end
            );
            Ok(())
        }
        Commands::AddFood { meal, name, weight } => {
            let date = target_date(clock.as_ref(), date)?;
            add_food(tracker, input, date, meal, &name, weight).await
        }
        Commands::AddFoodInfo {
            name,
            protein,
            fat,
            carbon,
        } => {
            let info = FoodInfo {
                protein,
                fat,
                carbon,
            };
            tracker.add_food_info(&name, info).await?;
            println!(
                "[+] Added '{}' to food database: protein {protein}, fat {fat}, carbon {carbon}",
                name.to_lowercase()
            );
            Ok(())
        }
        Commands::AddWater { amount } => {
            let date = target_date(clock.as_ref(), date)?;
            let total = tracker.add_water(date, amount).await?;
            success(format!("Added {amount}ml water. Total: {total}ml."));
            Ok(())
        }
        Commands::SortFood { mode } => {
            let mode = SortMode::from_arg(mode.as_deref().unwrap_or("name"));
            let count = tracker.sort_food(mode).await?;
            let order = if mode.is_descending() {
                "descending"
            } else {
                "ascending"
            };
            success(format!("Sorted {count} foods by {mode:?} ({order})"));
            Ok(())
        }
        Commands::Archive {
            date: archive_date,
            no_git,
        } => {
            let date = target_date(clock.as_ref(), archive_date.as_deref().or(date))?;
            let outcome = tracker.archive(date, !no_git).await?;
            println!("[→] Moved {} to {:?}", record_file_name(date), outcome.path);
            match outcome.published {
                Some(Ok(())) => success("Pushed archived record."),
                Some(Err(e)) => failure(format!("Git error: {e}")),
                None => {}
            }
            Ok(())
        }
        Commands::Serve { host, port } => {
            server::serve(tracker.clone(), clock.clone(), &host, port).await
        }
    }
}
