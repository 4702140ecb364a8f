//! `recur` CLI: expand, summarize and validate recurring series from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Expand a stored master event over January (JSON array on stdout)
//! recur expand -i master.json --from 2024-01-01 --to 2024-01-31
//!
//! # Same, as a table with UTC instants
//! recur expand -i master.json --from 2024-01-01 --to 2024-01-31 --table --utc
//!
//! # Month-end clamping and query-anchored occurrence counting
//! recur expand -i master.json --from 2024-02-01 --to 2024-02-29 \
//!     --overflow clamp --count-anchor query-start
//!
//! # Human-readable summary, including ad-hoc additions/exclusions
//! recur summary -i master.json
//!
//! # Validate a wire recurrence object and print it normalized
//! cat recurrence.json | recur validate --time-zone Europe/Berlin
//! ```
//!
//! Set `RUST_LOG=recurrence_engine=debug` to see ignored exceptions and
//! rejected recurrences on stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use recurrence_engine::model::{parse_date, MasterEvent, Occurrence};
use recurrence_engine::summary::{format_event, AdjustmentTag};
use recurrence_engine::{wire, CountAnchor, ExpandOptions, MonthDayOverflow};
use std::fmt::Write as _;
use std::io::{self, Read};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "recur",
    version,
    about = "Expand and describe recurring calendar series"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a master event into occurrences within a date window
    Expand {
        /// Master event JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// First date of the window (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: String,
        /// Last date of the window (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: String,
        /// What to do when the anchor day is missing from a month
        #[arg(long, value_enum, default_value_t = Overflow::Skip)]
        overflow: Overflow,
        /// Where numbered ranges start counting occurrences
        #[arg(long, value_enum, default_value_t = Anchor::SeriesStart)]
        count_anchor: Anchor,
        /// Print one line per occurrence instead of JSON
        #[arg(long)]
        table: bool,
        /// Show start times as UTC instants (table output only)
        #[arg(long, requires = "table")]
        utc: bool,
    },
    /// Print a human-readable summary of a master event's recurrence
    Summary {
        /// Master event JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Validate a wire recurrence object and print it in canonical form
    Validate {
        /// Recurrence JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Time zone written to `recurrenceTimeZone`
        #[arg(long, default_value = "UTC")]
        time_zone: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Overflow {
    /// Skip months without the anchor day
    Skip,
    /// Use the last day of shorter months
    Clamp,
}

#[derive(Clone, Copy, ValueEnum)]
enum Anchor {
    SeriesStart,
    QueryStart,
}

impl From<Overflow> for MonthDayOverflow {
    fn from(value: Overflow) -> Self {
        match value {
            Overflow::Skip => MonthDayOverflow::Skip,
            Overflow::Clamp => MonthDayOverflow::ClampToMonthEnd,
        }
    }
}

impl From<Anchor> for CountAnchor {
    fn from(value: Anchor) -> Self {
        match value {
            Anchor::SeriesStart => CountAnchor::SeriesStart,
            Anchor::QueryStart => CountAnchor::QueryStart,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Expand {
            input,
            output,
            from,
            to,
            overflow,
            count_anchor,
            table,
            utc,
        } => {
            let master = read_master(input.as_deref())?;
            let from =
                parse_date(&from).with_context(|| format!("Invalid --from date: {}", from))?;
            let to = parse_date(&to).with_context(|| format!("Invalid --to date: {}", to))?;
            let options = ExpandOptions {
                overflow: overflow.into(),
                count_anchor: count_anchor.into(),
            };

            let occurrences = recurrence_engine::expand_with(&master, from, to, options);
            debug!(count = occurrences.len(), master_id = %master.id, "expanded");

            let rendered = if table {
                render_table(&occurrences, utc)?
            } else {
                serde_json::to_string_pretty(&occurrences)?
            };
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Summary { input } => {
            let master = read_master(input.as_deref())?;
            let summary = format_event(&master);
            if summary.base.is_empty() {
                println!("No recurrence");
            } else {
                println!("{}", summary.base);
            }
            for adjustment in &summary.adjustments {
                let (sign, label) = match adjustment.tag {
                    AdjustmentTag::Added => ('+', "added"),
                    AdjustmentTag::Excluded => ('-', "excluded"),
                };
                println!("  {} {} ({})", sign, adjustment.date_text, label);
            }
        }
        Commands::Validate { input, time_zone } => {
            let json = read_input(input.as_deref())?;
            let recurrence = wire::from_json(&json).context("Invalid recurrence")?;
            let normalized = wire::to_wire(&recurrence, &time_zone);
            println!("{}", serde_json::to_string_pretty(&normalized)?);
        }
    }

    Ok(())
}

/// One line per occurrence: series date, start, subject and an exception marker.
fn render_table(occurrences: &[Occurrence], utc: bool) -> Result<String> {
    let mut out = String::new();
    for occ in occurrences {
        let start = if utc {
            occ.start
                .to_utc()
                .with_context(|| format!("Cannot resolve start of {}", occ.event_id))?
                .to_rfc3339()
        } else {
            occ.start.date_time.format("%Y-%m-%d %H:%M").to_string()
        };
        let marker = if occ.is_exception { "  (exception)" } else { "" };
        writeln!(out, "{}  {}  {}{}", occ.original_date, start, occ.subject, marker)?;
    }
    Ok(out)
}

fn read_master(path: Option<&str>) -> Result<MasterEvent> {
    let json = read_input(path)?;
    serde_json::from_str(&json).context("Failed to parse master event JSON")
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
