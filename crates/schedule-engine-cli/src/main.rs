//! `schedule` CLI: plan practice sessions against a busy calendar from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Plan from a JSON request on stdin
//! cat request.json | schedule plan
//!
//! # Plan from a file, overriding the strategy, pretty-printed to a file
//! schedule plan -i request.json --strategy split --pretty -o plan.json
//!
//! # Show the free gaps of the request's window
//! schedule free -i request.json
//!
//! # Show the merged busy intervals clipped to the window
//! schedule busy -i request.json
//!
//! # Log every attempted window to stderr
//! schedule -v plan -i request.json
//! ```
//!
//! Requests use the same camelCase JSON as the HTTP layer: `windowStart`,
//! `windowEnd`, `busy`, `durationMinutes`, `conflictStrategy`, and so on.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use schedule_engine::{
    freebusy, schedule, ConflictStrategy, PlanDto, ScheduleRequest, ScheduleRequestDto,
};
use serde::Serialize;
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "schedule",
    version,
    about = "Place practice sessions into the free time of a busy calendar",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log planning decisions to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan sessions for a JSON scheduling request
    Plan {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Override the request's conflict strategy (auto, split, shorten, next-window)
        #[arg(long)]
        strategy: Option<ConflictStrategy>,
        /// Override the requested duration in minutes
        #[arg(long)]
        duration: Option<i64>,
        /// Override how many later days to search
        #[arg(long)]
        search_days: Option<i64>,
        /// Override the session title
        #[arg(long)]
        title: Option<String>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// List the free gaps inside the request's window
    Free {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// List the merged busy intervals clipped to the request's window
    Busy {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Plan {
            input,
            output,
            strategy,
            duration,
            search_days,
            title,
            pretty,
        } => {
            let mut request = read_request(input.as_deref())?;
            if let Some(strategy) = strategy {
                request.options.conflict_strategy = strategy;
            }
            if let Some(duration) = duration {
                request.duration_minutes = Some(duration);
            }
            if let Some(days) = search_days {
                request.options.search_days = Some(days);
            }
            if let Some(title) = title {
                request.title = title;
            }

            tracing::info!(
                strategy = %request.options.conflict_strategy,
                busy = request.busy.len(),
                "planning request"
            );
            let plan = schedule(&request);
            if !plan.is_scheduled() {
                tracing::warn!(reason = plan.reason.as_deref().unwrap_or(""), "nothing scheduled");
            }

            let json = to_json(&PlanDto::from(&plan), pretty)?;
            write_output(output.as_deref(), &json)?;
        }
        Commands::Free { input, pretty } => {
            let request = read_request(input.as_deref())?;
            let gaps = freebusy::invert(request.window_start, request.window_end, &request.busy);
            println!("{}", to_json(&gaps, pretty)?);
        }
        Commands::Busy { input, pretty } => {
            let request = read_request(input.as_deref())?;
            let merged =
                freebusy::merged_busy_within(request.window_start, request.window_end, &request.busy);
            println!("{}", to_json(&merged, pretty)?);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_request(path: Option<&str>) -> Result<ScheduleRequest> {
    let json = read_input(path)?;
    ScheduleRequestDto::from_json(&json)
        .and_then(ScheduleRequestDto::into_request)
        .context("Invalid scheduling request")
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
