pub mod alias;
pub mod commands;
pub mod interactive;
pub mod output;

use std::{env, path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{execute, stdin_lines};
use interactive::run_interactive;
use tracing::level_filters::LevelFilter;

use crate::{
    planner::{
        normalize::{GoalSection, Meal},
        PlannerError,
    },
    tracker::{AppTracker, Tracker},
    utils::{
        clock::{Clock, DefaultClock},
        dir::AppPaths,
        logging::{enable_logging, CLI_PREFIX, SERVER_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "dayplan", version, long_about = None)]
#[command(about = "Daily routine, goal, meal and water tracker", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default $DAYPLAN_DIR, $XDG_STATE_HOME/dayplan or $HOME/.local/state/dayplan"
    )]
    pub dir: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Day to work on. Examples are \"2025-03-15\", \"yesterday\", \"15/03/2025\". Defaults to today"
    )]
    pub date: Option<String>,
    #[arg(long, global = true, help = "Enable logging to stdout")]
    pub log: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Read commands from a prompt until 'exit'")]
    Interactive,
    #[command(about = "Create the day record from the routine template")]
    Init {
        #[arg(help = "Day to create, today by default")]
        date: Option<String>,
    },
    #[command(about = "Display the day. Arguments are an optional date and a view")]
    Show {
        #[arg(
            num_args = 0..=2,
            help = "[DATE] [routine|plan|goals|food|summary|all], both optional and in any order"
        )]
        args: Vec<String>,
    },
    #[command(about = "Check a routine task by part of its name")]
    Check { text: String },
    #[command(about = "Uncheck a routine task by part of its name")]
    Uncheck { text: String },
    #[command(about = "Check a goal. Section is focus or todo, any prefix works")]
    CheckGoal { section: GoalSection, text: String },
    #[command(about = "Uncheck a goal. Section is focus or todo, any prefix works")]
    UncheckGoal { section: GoalSection, text: String },
    #[command(about = "Add a goal. Section is focus or todo, any prefix works")]
    AddGoal { section: GoalSection, text: String },
    #[command(about = "Plan a task for hours [start, end). End defaults to start + 1")]
    Plan {
        task: String,
        #[arg(allow_negative_numbers = true)]
        start: i64,
        #[arg(allow_negative_numbers = true)]
        end: Option<i64>,
    },
    #[command(about = "Log food by name or part of it. Weight is in grams")]
    AddFood {
        meal: Meal,
        name: String,
        #[arg(allow_negative_numbers = true)]
        weight: f64,
    },
    #[command(about = "Add a food to the database. Nutrients are per 100 g")]
    AddFoodInfo {
        name: String,
        protein: f64,
        fat: f64,
        carbon: f64,
    },
    #[command(about = "Log drunk water in millilitres")]
    AddWater {
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    #[command(about = "Reorder the food database by protein, fat, carbon or name")]
    SortFood { mode: Option<String> },
    #[command(about = "Move a day into the archive and publish it with git")]
    Archive {
        date: Option<String>,
        #[arg(long, help = "Only move the file")]
        no_git: bool,
    },
    #[command(about = "Serve the HTTP API")]
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 5000)]
        port: u16,
    },
}

/// Parses a full argument list, the first element being the program name. The command token is
/// resolved through aliases and prefixes first.
pub fn parse_args(mut args: Vec<String>) -> Result<Args> {
    alias::resolve_args(&mut args)?;
    Ok(Args::try_parse_from(args)?)
}

pub async fn run_cli() -> Result<()> {
    let args = match parse_args(env::args().collect()) {
        Ok(args) => args,
        Err(e) => match e.downcast::<clap::Error>() {
            Ok(clap_error) => clap_error.exit(),
            Err(e) => return Err(e),
        },
    };

    let paths = AppPaths::resolve(args.dir.clone())?;
    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let prefix = match args.commands {
        Commands::Serve { .. } => SERVER_PREFIX,
        _ => CLI_PREFIX,
    };
    enable_logging(prefix, &paths.logs_dir(), logging_level, args.log)?;

    let tracker: Arc<AppTracker> = Arc::new(Tracker::open(paths)?);
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let mut input = stdin_lines();
    let date = args.date.as_deref();
    match args.commands {
        Commands::Interactive => run_interactive(&tracker, &clock, &mut input, date).await,
        command => execute(&tracker, &clock, &mut input, date, command).await,
    }
}

/// Message shown to the user for a failed command.
pub fn describe_error(e: &anyhow::Error) -> String {
    match e.downcast_ref::<PlannerError>() {
        Some(planner_error) => planner_error.to_string(),
        None => format!("{e:#}"),
    }
}
