//! Simulate command - play one scripted scenario
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_scenario(), play_scenario(), report_results()
//! - Level 3: dump writer
//! - Level 4: formatting utilities

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use antwar_core::{Player, Scenario, ScenarioReport};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SimulateArgs {
    /// Scenario JSON file
    #[arg(long, value_name = "FILE")]
    pub scenario: PathBuf,

    /// Stop after this many rounds even if the game goes on
    #[arg(long)]
    pub rounds: Option<u32>,

    /// Round limit, overriding the scenario's
    #[arg(long)]
    pub max_round: Option<i32>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Append a state dump after every round to this file
    #[arg(long, value_name = "FILE")]
    pub dump: Option<PathBuf>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run simulate command
pub fn run(args: SimulateArgs) -> Result<()> {
    let scenario = load_scenario(&args)?;

    tracing::info!(
        "Simulating {} (seed {}, {} scripted turns)",
        scenario.name,
        scenario.seed,
        scenario.script.len()
    );

    let report = play_scenario(&scenario, &args)?;

    report_results(&report, args.json);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn load_scenario(args: &SimulateArgs) -> Result<Scenario> {
    let mut scenario = Scenario::load(&args.scenario)
        .with_context(|| format!("Failed to load scenario: {}", args.scenario.display()))?;
    if args.max_round.is_some() {
        scenario.max_round = args.max_round;
    }
    Ok(scenario)
}

fn play_scenario(scenario: &Scenario, args: &SimulateArgs) -> Result<ScenarioReport> {
    let mut dump = match &args.dump {
        Some(path) => Some(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => None,
    };

    let mut dump_error = None;
    let report = scenario.run(args.rounds, |state| {
        if dump_error.is_some() {
            return;
        }
        if let Some(out) = dump.as_mut() {
            if let Err(e) = state.dump(out) {
                dump_error = Some(e);
            }
        }
    })?;

    if let Some(e) = dump_error {
        return Err(e).context("Failed to write state dump");
    }
    if let Some(mut out) = dump {
        out.flush().context("Failed to write state dump")?;
    }
    Ok(report)
}

fn report_results(report: &ScenarioReport, json: bool) {
    if json {
        print_json_results(report);
    } else {
        print_text_results(report);
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn print_json_results(report: &ScenarioReport) {
    #[derive(serde::Serialize)]
    struct JsonOutput<'a> {
        name: &'a str,
        seed: u64,
        result: String,
        rounds: u32,
        base_hp: [i32; 2],
        coins: [i32; 2],
        accepted: usize,
        rejected: usize,
    }

    let state = &report.final_state;
    let output = JsonOutput {
        name: &report.name,
        seed: report.seed,
        result: format!("{:?}", report.result),
        rounds: report.rounds_played,
        base_hp: [state.base(Player::P0).hp, state.base(Player::P1).hp],
        coins: [state.coins(Player::P0), state.coins(Player::P1)],
        accepted: report.accepted(),
        rejected: report.rejected(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

fn print_text_results(report: &ScenarioReport) {
    let state = &report.final_state;

    println!("\n=== {} (seed {}) ===", report.name, report.seed);
    println!("Result:      {:?}", report.result);
    println!("Rounds:      {}", report.rounds_played);
    println!(
        "Base HP:     {} / {}",
        state.base(Player::P0).hp,
        state.base(Player::P1).hp
    );
    println!(
        "Coins:       {} / {}",
        state.coins(Player::P0),
        state.coins(Player::P1)
    );
    println!(
        "Towers:      {} / {}",
        state.tower_count(Player::P0),
        state.tower_count(Player::P1)
    );
    println!(
        "Operations:  {} accepted, {} rejected",
        report.accepted(),
        report.rejected()
    );
}

// ============================================================================
// TESTS
// ============================================================================
