//! ANTWAR CLI - Command-line interface
//!
//! Commands:
//! - simulate: Play a scripted scenario
//! - sweep: Replay a scenario over a range of pheromone seeds
//! - generate: Write a random scenario file

mod generate_cmd;
mod simulate_cmd;
mod sweep_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "antwar")]
#[command(about = "ANTWAR rules engine driver")]
struct Cli {
    /// Seed for commands that draw random numbers
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scripted scenario
    Simulate(simulate_cmd::SimulateArgs),
    /// Replay a scenario across pheromone seeds
    Sweep(sweep_cmd::SweepArgs),
    /// Write a random scenario
    Generate(generate_cmd::GenerateArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate(args) => simulate_cmd::run(args),
        Commands::Sweep(args) => sweep_cmd::run(args),
        Commands::Generate(args) => generate_cmd::run(args, cli.seed),
    }
}
