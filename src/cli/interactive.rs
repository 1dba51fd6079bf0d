use std::sync::Arc;

use anyhow::Result;
use tokio::{
    io::{self, AsyncWriteExt},
    select,
};
use tracing::{error, info, warn};

use crate::{tracker::AppTracker, utils::clock::Clock};

use super::{
    commands::{execute, failure, warning, StdinLines},
    describe_error, parse_args,
};

const PROMPT: &str = "planner> ";
const EXIT_WORDS: [&str; 3] = ["exit", "quit", "q"];

/// What a single prompt line asks for.
#[derive(Debug, PartialEq)]
pub enum PromptLine {
    Exit,
    Empty,
    Command(Vec<String>),
}

/// Splits a prompt line into arguments the way a shell would.
pub fn parse_prompt_line(line: &str) -> Result<PromptLine, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(PromptLine::Empty);
    }
    if EXIT_WORDS.contains(&line) {
        return Ok(PromptLine::Exit);
    }
    shlex::split(line)
        .map(PromptLine::Command)
        .ok_or_else(|| format!("Can't parse '{line}', check the quotes"))
}

/// Runs commands typed at a prompt against the same application directory. A failing command is
/// reported and the prompt continues.
pub async fn run_interactive(
    tracker: &Arc<AppTracker>,
    clock: &Arc<dyn Clock>,
    lines: &mut StdinLines,
    date: Option<&str>,
) -> Result<()> {
    println!("[Interactive Mode] Type 'exit', 'quit' or 'q' to leave.");
    let mut stdout = io::stdout();
    loop {
        stdout.write_all(PROMPT.as_bytes()).await?;
        stdout.flush().await?;

        let line = select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                println!();
                warning("Interrupted by keyboard. Type 'exit' to quit.");
                continue;
            }
        };
        let Some(line) = line else {
            println!();
            break;
        };

        let words = match parse_prompt_line(&line) {
            Ok(PromptLine::Exit) => break,
            Ok(PromptLine::Empty) => continue,
            Ok(PromptLine::Command(words)) => words,
            Err(e) => {
                failure(e);
                continue;
            }
        };

        info!("Interactive command {words:?}");
        let argv = std::iter::once("dayplan".to_string()).chain(words).collect();
        let args = match parse_args(argv) {
            Ok(args) => args,
            Err(e) => match e.downcast::<clap::Error>() {
                Ok(clap_error) => {
                    // Help and version requests are errors too.
                    if let Err(e) = clap_error.print() {
                        warn!("Failed to print command usage {e:?}");
                    }
                    continue;
                }
                Err(e) => {
                    failure(describe_error(&e));
                    continue;
                }
            },
        };
        let date = args.date.as_deref().or(date);
        if let Err(e) = execute(tracker, clock, lines, date, args.commands).await {
            error!("Interactive command failed {e:?}");
            failure(describe_error(&e));
        }
    }
    Ok(())
}
