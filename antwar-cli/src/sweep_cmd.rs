//! Sweep command - replay one scenario over many pheromone seeds
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: run_sweep(), report_results()
//! - Level 3: compute_sweep_statistics()
//! - Level 4: argument parsing, formatting

use std::ops::Range;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rayon::prelude::*;

use antwar_core::{GameResult, Scenario, ScenarioReport};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SweepArgs {
    /// Scenario JSON file
    #[arg(long, value_name = "FILE")]
    pub scenario: PathBuf,

    /// Seed range, end exclusive (e.g. 0..100)
    #[arg(long, value_parser = parse_seed_range)]
    pub seeds: Range<u64>,

    /// Stop each game after this many rounds
    #[arg(long)]
    pub rounds: Option<u32>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// One game of the sweep
#[derive(Clone, Debug, serde::Serialize)]
struct SeedRecord {
    seed: u64,
    result: GameResult,
    rounds: u32,
}

/// Aggregated sweep results
#[derive(Clone, Debug, serde::Serialize)]
struct SweepResults {
    games: Vec<SeedRecord>,
    player0_wins: usize,
    player1_wins: usize,
    undecided: usize,
    unfinished: usize,
    avg_rounds: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run sweep command
pub fn run(args: SweepArgs) -> Result<()> {
    let scenario = Scenario::load(&args.scenario)
        .with_context(|| format!("Failed to load scenario: {}", args.scenario.display()))?;

    tracing::info!(
        "Sweeping {} over seeds {}..{}",
        scenario.name,
        args.seeds.start,
        args.seeds.end
    );

    let reports = run_sweep(&scenario, &args)?;
    let results = compute_sweep_statistics(&reports);

    report_results(&results, args.json);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn run_sweep(scenario: &Scenario, args: &SweepArgs) -> Result<Vec<ScenarioReport>> {
    let mut reports = args
        .seeds
        .clone()
        .into_par_iter()
        .map(|seed| scenario.with_seed(seed).run(args.rounds, |_| {}))
        .collect::<Result<Vec<_>, _>>()?;
    reports.sort_by_key(|r| r.seed);
    Ok(reports)
}

fn report_results(results: &SweepResults, json: bool) {
    if json {
        if let Ok(text) = serde_json::to_string_pretty(results) {
            println!("{}", text);
        }
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn compute_sweep_statistics(reports: &[ScenarioReport]) -> SweepResults {
    let games: Vec<SeedRecord> = reports
        .iter()
        .map(|r| SeedRecord {
            seed: r.seed,
            result: r.result,
            rounds: r.rounds_played,
        })
        .collect();

    let count = |result: GameResult| games.iter().filter(|g| g.result == result).count();
    let total_rounds: u32 = games.iter().map(|g| g.rounds).sum();
    let avg_rounds = if games.is_empty() {
        0.0
    } else {
        total_rounds as f32 / games.len() as f32
    };

    SweepResults {
        player0_wins: count(GameResult::Player0Wins),
        player1_wins: count(GameResult::Player1Wins),
        undecided: count(GameResult::Undecided),
        unfinished: count(GameResult::Running),
        avg_rounds,
        games,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn parse_seed_range(text: &str) -> std::result::Result<Range<u64>, String> {
    let (start, end) = text
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got {text:?}"))?;
    let start: u64 = start.trim().parse().map_err(|e| format!("bad start seed: {e}"))?;
    let end: u64 = end.trim().parse().map_err(|e| format!("bad end seed: {e}"))?;
    if start >= end {
        return Err(format!("empty seed range {start}..{end}"));
    }
    Ok(start..end)
}

fn print_text_results(results: &SweepResults) {
    let total = results.games.len();
    let pct = |n: usize| {
        if total > 0 {
            n as f32 / total as f32 * 100.0
        } else {
            0.0
        }
    };

    println!("\n=== Sweep Results ===");
    println!("Total games:  {}", total);
    println!("P0 wins:      {} ({:.1}%)", results.player0_wins, pct(results.player0_wins));
    println!("P1 wins:      {} ({:.1}%)", results.player1_wins, pct(results.player1_wins));
    println!("Undecided:    {} ({:.1}%)", results.undecided, pct(results.undecided));
    println!("Unfinished:   {} ({:.1}%)", results.unfinished, pct(results.unfinished));
    println!("Avg rounds:   {:.1}", results.avg_rounds);
}

// ============================================================================
// TESTS
// ============================================================================
