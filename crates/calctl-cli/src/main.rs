//! `calctl`: manage a personal calendar from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Add an event (fails with exit code 4 if it overlaps another one)
//! calctl add --title "Team Meeting" --date 2026-02-10 --time 14:00 --duration 60
//!
//! # Add a daily standup for a week, all or nothing
//! calctl add --title Standup --date 2026-02-10 --time 9:00 --duration 15 --repeat daily --count 7
//!
//! # List upcoming events, this week's events, or an explicit inclusive range
//! calctl list
//! calctl list --week
//! calctl --json list --from 2026-02-01 --to 2026-02-28
//!
//! # Inspect, change and remove
//! calctl show evt-1a2b3c4d
//! calctl edit evt-1a2b3c4d --time 15:00
//! calctl delete evt-1a2b3c4d --force
//! calctl delete --date 2026-02-10 --dry-run
//!
//! # Agenda and search
//! calctl agenda --week
//! calctl search meeting --title-only
//! ```
//!
//! Exit codes: 0 success, 1 storage/unexpected error, 2 invalid input,
//! 3 not found, 4 conflict, 130 cancelled.

mod output;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use calctl_core::validate::parse_date;
use calctl_core::{
    AddRequest, AgendaSpan, CalError, CalendarService, Config, DateRange, EditRequest,
};
use clap::{ArgGroup, CommandFactory, Parser, Subcommand};
use dialoguer::Confirm;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use output::Palette;

/// Environment variable holding the log filter (e.g. `debug`, `calctl_core=info`).
const LOG_ENV: &str = "CALCTL_LOG";

const EXIT_UNEXPECTED: u8 = 1;
const EXIT_CANCELLED: u8 = 130;

#[derive(Parser)]
#[command(
    name = "calctl",
    version,
    about = "calctl - A command-line calendar manager"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Event store file (defaults to $CALCTL_DATA_PATH, then ~/.calctl/events.json)
    #[arg(long, global = true, value_name = "PATH")]
    data_file: Option<PathBuf>,

    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new event
    Add {
        #[arg(long)]
        title: String,
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Start time as HH:MM (24-hour)
        #[arg(long)]
        time: String,
        /// Duration in minutes
        #[arg(long, allow_negative_numbers = true)]
        duration: i64,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// Schedule even if the event conflicts with existing events
        #[arg(long)]
        force: bool,
        /// Repeat the event: daily or weekly
        #[arg(long, value_name = "FREQ")]
        repeat: Option<String>,
        /// Number of occurrences (default 1)
        #[arg(long, requires = "repeat", allow_negative_numbers = true)]
        count: Option<i64>,
    },
    /// List events (default: today onwards)
    List {
        /// Only today's events
        #[arg(long, conflicts_with_all = ["week", "from", "to"])]
        today: bool,
        /// Today and the following six days
        #[arg(long, conflicts_with_all = ["from", "to"])]
        week: bool,
        /// First date to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Show event details and any overlapping events
    Show { id: String },
    /// Edit fields of an existing event
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        duration: Option<i64>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// Apply the edit even if it creates conflicts
        #[arg(long)]
        force: bool,
    },
    /// Delete an event by id, or every event on a date
    #[command(group(ArgGroup::new("target").required(true).args(["id", "date"])))]
    Delete {
        id: Option<String>,
        /// Delete all events on this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Show what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Show a day's (default: today) or the next seven days' events grouped by date
    Agenda {
        #[arg(long, conflicts_with = "week")]
        date: Option<String>,
        #[arg(long)]
        week: bool,
    },
    /// Search titles, descriptions and locations
    Search {
        query: String,
        /// Only match against titles
        #[arg(long)]
        title_only: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let no_color = cli.no_color;
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", output::error(&Palette::stderr(no_color), &err));
            let code = err
                .downcast_ref::<CalError>()
                .map_or(EXIT_UNEXPECTED, |e| e.exit_code() as u8);
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    // No subcommand: print help and exit successfully.
    let Some(command) = cli.command else {
        Cli::command()
            .print_help()
            .context("Failed to print help")?;
        println!();
        return Ok(ExitCode::SUCCESS);
    };

    let palette = Palette::stdout(cli.no_color);
    let json = cli.json;
    let config = Config::resolve(cli.data_file)?;
    tracing::debug!(path = %config.data_path.display(), "using event store");
    let mut service = CalendarService::open(config)?;

    match command {
        Commands::Add {
            title,
            date,
            time,
            duration,
            description,
            location,
            force,
            repeat,
            count,
        } => {
            let request = AddRequest {
                title,
                date,
                time,
                duration,
                description,
                location,
                repeat,
                count,
                force,
            };
            let commit = service.add(&request)?;
            if json {
                output::print_json(&commit)?;
            } else {
                println!("{}", output::created(&palette, &commit.events));
                if let Some(warning) = output::forced_conflicts(&palette, &commit.conflicts) {
                    println!("{}", warning);
                }
            }
        }
        Commands::List {
            today,
            week,
            from,
            to,
        } => {
            let range = if today {
                DateRange::Today
            } else if week {
                DateRange::Week
            } else if from.is_some() || to.is_some() {
                DateRange::Between {
                    from: from.as_deref().map(parse_date).transpose()?,
                    to: to.as_deref().map(parse_date).transpose()?,
                }
            } else {
                DateRange::Upcoming
            };
            let events = service.list(&range);
            if json {
                output::print_json(&events)?;
            } else {
                println!("{}", output::event_list(&palette, &events));
            }
        }
        Commands::Show { id } => {
            let detail = service.show(&id)?;
            if json {
                output::print_json(&detail)?;
            } else {
                println!("{}", output::event_detail(&palette, &detail));
            }
        }
        Commands::Edit {
            id,
            title,
            date,
            time,
            duration,
            description,
            location,
            force,
        } => {
            let request = EditRequest {
                title,
                date,
                time,
                duration,
                description,
                location,
                force,
            };
            let outcome = service.edit(&id, &request)?;
            if json {
                output::print_json(&outcome)?;
            } else {
                println!("{}", output::edited(&palette, &outcome));
                if let Some(warning) = output::forced_conflicts(&palette, &outcome.conflicts) {
                    println!("{}", warning);
                }
            }
        }
        Commands::Delete {
            id,
            date,
            dry_run,
            force,
        } => {
            // Look the targets up first so a missing target fails before prompting.
            let targets = match (&id, &date) {
                (Some(id), _) => vec![service.delete(id, true)?],
                (None, Some(date)) => service.delete_on_date(date, true)?,
                (None, None) => unreachable!("clap requires an id or --date"),
            };

            if !dry_run && !force {
                eprintln!("{}", output::deleted(&palette, &targets, true));
                if !confirm("Proceed with deletion?")? {
                    eprintln!("Cancelled.");
                    return Ok(ExitCode::from(EXIT_CANCELLED));
                }
            }

            let removed = if dry_run {
                targets
            } else {
                match (&id, &date) {
                    (Some(id), _) => vec![service.delete(id, false)?],
                    (_, Some(date)) => service.delete_on_date(date, false)?,
                    (None, None) => unreachable!("clap requires an id or --date"),
                }
            };

            if json {
                output::print_json(&DeleteReport {
                    deleted: &removed,
                    dry_run,
                })?;
            } else {
                println!("{}", output::deleted(&palette, &removed, dry_run));
            }
        }
        Commands::Agenda { date, week } => {
            let span = match date {
                Some(date) => AgendaSpan::Day(parse_date(&date)?),
                None if week => AgendaSpan::Week,
                None => AgendaSpan::Day(service.today()),
            };
            let agenda = service.agenda(span);
            if json {
                output::print_json(&agenda)?;
            } else {
                println!("{}", output::agenda(&palette, &agenda));
            }
        }
        Commands::Search { query, title_only } => {
            let events = service.search(&query, title_only)?;
            if json {
                output::print_json(&events)?;
            } else {
                println!("{}", output::event_list(&palette, &events));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[derive(Serialize)]
struct DeleteReport<'a> {
    deleted: &'a [calctl_core::Event],
    dry_run: bool,
}

/// Ask for a yes/no answer. Non-interactive sessions count as "no".
fn confirm(prompt: &str) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        return Ok(false);
    }
    let answer = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact_opt()
        .context("Failed to read confirmation")?;
    Ok(answer.unwrap_or(false))
}
