//! `recur` CLI — expand stored recurrence rules from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Every date a rule falls on in January (rule JSON on stdin)
//! echo '{"start":"2016-01-01","pattern":"D","interval":4,"only_weekdays":true}' \
//!     | recur expand --from 2016-01-01 --to 2016-01-31
//!
//! # From a file, as a JSON array, with the rule's clock time attached
//! recur expand -i rule.json --from 2016-01-01 --to 2016-12-31 --json --with-time
//!
//! # Half-open window, clamp day 31 to short months, at most 10 dates
//! recur expand -i rule.json --from 2016-01-01 --to 2017-01-01 \
//!     --exclusive-end --overflow clamp --limit 10
//!
//! # Does the rule fall on a date?
//! recur check -i rule.json --date 2016-01-07
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use recurrence_engine::{DayOverflow, ExpansionConfig, RecurrenceRecord, WindowEnd};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recur", version, about = "Expand recurrence rules into concrete dates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log expansion details to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the dates a rule falls on within a window
    Expand {
        /// Rule JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// First day of the window (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Last day of the window (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
        /// Print a JSON array instead of one date per line
        #[arg(long)]
        json: bool,
        /// Attach the rule's time of day to every date
        #[arg(long)]
        with_time: bool,
        #[command(flatten)]
        options: ExpansionArgs,
    },
    /// Report whether a rule falls on a date
    Check {
        /// Rule JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Date to test (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        #[command(flatten)]
        options: ExpansionArgs,
    },
}

#[derive(Args)]
struct ExpansionArgs {
    /// JSON file with expansion options; flags below take precedence
    #[arg(long)]
    config: Option<String>,
    /// Treat the window end date as excluded
    #[arg(long)]
    exclusive_end: bool,
    /// What a day-of-month past the end of a short month does
    #[arg(long, value_enum)]
    overflow: Option<Overflow>,
    /// Stop after this many dates
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Overflow {
    Skip,
    Clamp,
}

impl From<Overflow> for DayOverflow {
    fn from(value: Overflow) -> Self {
        match value {
            Overflow::Skip => DayOverflow::Skip,
            Overflow::Clamp => DayOverflow::Clamp,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Expand {
            input,
            output,
            from,
            to,
            json,
            with_time,
            options,
        } => {
            let record = read_record(input.as_deref())?;
            let config = build_config(&options)?;

            let lines: Vec<String> = if with_time {
                expand_with_time(&record, &config, from, to)?
            } else {
                record
                    .occurrences_between_with(&config, from, to)
                    .context("Invalid recurrence rule")?
                    .iter()
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .collect()
            };

            let rendered = if json {
                let mut text = serde_json::to_string_pretty(&lines)?;
                text.push('\n');
                text
            } else {
                lines.iter().map(|l| format!("{}\n", l)).collect()
            };
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Check {
            input,
            date,
            options,
        } => {
            let record = read_record(input.as_deref())?;
            let config = build_config(&options)?;
            let hit = record
                .is_occurrence_on_with(&config, date)
                .context("Invalid recurrence rule")?;
            println!("{}", hit);
        }
    }

    Ok(())
}

/// Instances with the rule's clock time. An unrecognized pattern code yields
/// no instances, matching [`RecurrenceRecord::occurrences_between`].
fn expand_with_time(
    record: &RecurrenceRecord,
    config: &ExpansionConfig,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<String>> {
    match record.to_rule() {
        Ok(rule) => Ok(rule
            .instances_between_with(config, from, to)
            .iter()
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
            .collect()),
        Err(recurrence_engine::RecurrenceError::UnknownPattern(_)) => Ok(Vec::new()),
        Err(e) => Err(e).context("Invalid recurrence rule"),
    }
}

/// Merge the optional config file with command-line flags.
fn build_config(args: &ExpansionArgs) -> Result<ExpansionConfig> {
    let mut config = match args.config.as_deref() {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse config file: {}", path))?
        }
        None => ExpansionConfig::default(),
    };

    if args.exclusive_end {
        config.window_end = WindowEnd::Exclusive;
    }
    if let Some(overflow) = args.overflow {
        config.day_overflow = overflow.into();
    }
    if let Some(limit) = args.limit {
        config.limit = Some(limit);
    }
    tracing::debug!(?config, "expansion options");
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "recur=debug,recurrence_engine=trace"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_record(path: Option<&str>) -> Result<RecurrenceRecord> {
    let text = read_input(path)?;
    serde_json::from_str(&text).context("Failed to parse recurrence rule JSON")
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
            print!("{}", content);
        }
    }
    Ok(())
}
