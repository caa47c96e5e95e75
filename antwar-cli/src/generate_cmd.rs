//! Generate command - write a random scenario file

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use antwar_core::Scenario;

#[derive(Args)]
pub struct GenerateArgs {
    /// Where to write the scenario JSON
    #[arg(long, value_name = "FILE")]
    pub output: PathBuf,

    /// Number of scripted turns to draw
    #[arg(long, default_value = "60")]
    pub turns: usize,

    /// Scenario name
    #[arg(long, default_value = "random")]
    pub name: String,
}

/// Run generate command
pub fn run(args: GenerateArgs, seed: Option<u64>) -> Result<()> {
    let mut rng = create_rng(seed);
    let game_seed = rng.gen_range(0..1u64 << 48);
    let scenario = Scenario::random(&mut rng, &args.name, game_seed, args.turns);

    scenario
        .save(&args.output)
        .with_context(|| format!("Failed to save scenario: {}", args.output.display()))?;

    tracing::info!(
        "Wrote {} with {} turns to {}",
        scenario.name,
        scenario.script.len(),
        args.output.display()
    );
    Ok(())
}

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rng_deterministic() {
        let mut rng1 = create_rng(Some(42));
        let mut rng2 = create_rng(Some(42));
        assert_eq!(rng1.gen::<u64>(), rng2.gen::<u64>());
    }

    #[test]
    fn test_generated_file_loads() {
        let path = std::env::temp_dir().join(format!("antwar-gen-{}.json", std::process::id()));
        let args = GenerateArgs {
            output: path.clone(),
            turns: 12,
            name: "gen".to_string(),
        };
        run(args, Some(9)).unwrap();
        let scenario = Scenario::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(scenario.name, "gen");
        assert!(scenario.seed < 1 << 48);
    }
}
