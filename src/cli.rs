//! CLI commands for racing-standings-api.
//!
//! Supports both API server mode and offline standings computation.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

use crate::catalog::{Catalog, Driver, Team};
use crate::config::AppConfig;
use crate::ledger::{RaceDraft, RaceLedger};
use crate::standings::{self, Standing};

#[derive(Parser)]
#[command(name = "racing-standings-api")]
#[command(version, about = "Racing results API: teams, drivers, races and standings", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Teams JSON file override
        #[arg(long, value_name = "FILE")]
        teams: Option<PathBuf>,

        /// Drivers JSON file override
        #[arg(long, value_name = "FILE")]
        drivers: Option<PathBuf>,
    },

    /// Compute standings from a JSON array of race submissions
    Standings {
        /// Path to races JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output format (json, table)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// Teams JSON file override
        #[arg(long, value_name = "FILE")]
        teams: Option<PathBuf>,

        /// Drivers JSON file override
        #[arg(long, value_name = "FILE")]
        drivers: Option<PathBuf>,
    },
}

/// Apply catalog path overrides from the command line.
pub fn apply_catalog_overrides(
    config: &mut AppConfig,
    teams: Option<PathBuf>,
    drivers: Option<PathBuf>,
) {
    if let Some(path) = teams {
        config.catalog.teams_path = path.to_string_lossy().to_string();
    }
    if let Some(path) = drivers {
        config.catalog.drivers_path = path.to_string_lossy().to_string();
    }
}

#[derive(Debug, Serialize)]
struct StandingRow<'a, T> {
    rank: usize,
    info: &'a T,
    score: i128,
}

#[derive(Debug, Serialize)]
struct StandingsReport<'a> {
    races: usize,
    rejected: usize,
    drivers: Vec<StandingRow<'a, Driver>>,
    teams: Vec<StandingRow<'a, Team>>,
}

fn rows<'a, T>(standings: Vec<Standing<&'a T>>) -> Vec<StandingRow<'a, T>> {
    standings
        .into_iter()
        .map(|s| StandingRow {
            rank: s.rank,
            info: s.subject,
            score: s.score,
        })
        .collect()
}

/// Replay race submissions into a fresh ledger.
///
/// Rejected submissions are reported on stderr and skipped. Returns the
/// number of rejections.
pub fn replay(catalog: &Catalog, ledger: &RaceLedger, submissions: Vec<Value>) -> usize {
    let mut rejected = 0;
    for (idx, body) in submissions.into_iter().enumerate() {
        if let Err(e) = ledger.create(catalog, &RaceDraft::from_value(body)) {
            eprintln!("Skipping entry {}: {}", idx + 1, e);
            rejected += 1;
        }
    }
    rejected
}

/// Run offline standings computation from file.
pub fn run_standings(
    input: PathBuf,
    format: String,
    teams: Option<PathBuf>,
    drivers: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = AppConfig::load()?;
    apply_catalog_overrides(&mut config, teams, drivers);

    let catalog = Catalog::load(&config.catalog.teams_path, &config.catalog.drivers_path)?;

    let input_json = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let submissions: Vec<Value> =
        serde_json::from_str(&input_json).context("Races file must be a JSON array")?;

    let ledger = RaceLedger::new();
    let rejected = replay(&catalog, &ledger, submissions);
    let races = ledger.snapshot();

    let report = StandingsReport {
        races: races.len(),
        rejected,
        drivers: rows(standings::driver_standings(&catalog, &races)),
        teams: rows(standings::team_standings(&catalog, &races)),
    };

    match format.as_str() {
        "table" => print_standings_table(&report),
        _ => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

fn print_standings_table(report: &StandingsReport<'_>) {
    println!("=== Standings ===");
    println!();
    println!("Races counted: {}", report.races);
    if report.rejected > 0 {
        println!("Rejected:      {}", report.rejected);
    }
    println!();

    println!("Drivers:");
    println!("  {:>4} {:24} {:16} {:>6}", "Pos", "Driver", "Country", "Pts");
    println!("  {}", "-".repeat(53));
    for row in &report.drivers {
        println!(
            "  {:>4} {:24} {:16} {:>6}",
            row.rank, row.info.driver, row.info.country, row.score
        );
    }
    println!();

    println!("Teams:");
    println!("  {:>4} {:24} {:16} {:>6}", "Pos", "Team", "Car", "Pts");
    println!("  {}", "-".repeat(53));
    for row in &report.teams {
        println!(
            "  {:>4} {:24} {:16} {:>6}",
            row.rank, row.info.team, row.info.car, row.score
        );
    }
}
