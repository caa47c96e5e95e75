//! Scenario - scripted matches stored as JSON

use std::path::Path;

use anyhow::Context;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::board::{all_points, Point};
use crate::error::EngineError;
use crate::game::{GameResult, GameState, Player};
use crate::operation::Operation;
use crate::simulate::{Simulator, SimulatorConfig};
use crate::weapon::ALL_SUPER_WEAPONS;

/// Operations one player submits in one round
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptedTurn {
    pub round: i32,
    pub player: Player,
    pub operations: Vec<Operation>,
}

/// A seeded match with a fixed script for both players
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    /// Round limit; the standard one if absent
    #[serde(default)]
    pub max_round: Option<i32>,
    #[serde(default)]
    pub script: Vec<ScriptedTurn>,
}

/// Gate verdicts of one round
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundLog {
    pub round: i32,
    pub accepted: [usize; 2],
    pub rejected: [usize; 2],
}

/// Outcome of running a scenario
#[derive(Clone, Debug, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub seed: u64,
    pub result: GameResult,
    pub rounds_played: u32,
    pub log: Vec<RoundLog>,
    #[serde(skip)]
    pub final_state: GameState,
}

impl ScenarioReport {
    pub fn accepted(&self) -> usize {
        self.log.iter().map(|r| r.accepted[0] + r.accepted[1]).sum()
    }

    pub fn rejected(&self) -> usize {
        self.log.iter().map(|r| r.rejected[0] + r.rejected[1]).sum()
    }
}

impl Scenario {
    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing scenario {}", path.display()))
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("writing scenario {}", path.display()))?;
        Ok(())
    }

    /// Same script under another pheromone seed
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }

    pub fn config(&self) -> SimulatorConfig {
        let config = SimulatorConfig::default();
        match self.max_round {
            Some(max_round) => config.with_max_round(max_round),
            None => config,
        }
    }

    /// Scripted operations of `player` for `round`, in script order
    pub fn operations_for(&self, round: i32, player: Player) -> impl Iterator<Item = &Operation> + '_ {
        self.script
            .iter()
            .filter(move |turn| turn.round == round && turn.player == player)
            .flat_map(|turn| turn.operations.iter())
    }

    /// Play the script from a fresh game
    ///
    /// Each round player 0 then player 1 submit and apply their operations,
    /// then the round resolves. Stops at the end of the game or after
    /// `rounds` rounds. `observer` sees the state after every round.
    pub fn run<F>(&self, rounds: Option<u32>, mut observer: F) -> Result<ScenarioReport, EngineError>
    where
        F: FnMut(&GameState),
    {
        let mut sim = Simulator::with_config(GameState::new(self.seed), self.config());
        let mut log = Vec::new();
        let mut result = GameResult::Running;
        let mut played = 0u32;

        while rounds.map_or(true, |limit| played < limit) {
            let round = sim.state().round();
            let mut entry = RoundLog {
                round,
                ..RoundLog::default()
            };
            for player in Player::BOTH {
                for op in self.operations_for(round, player) {
                    if sim.add_operation(player, *op) {
                        entry.accepted[player.index()] += 1;
                    } else {
                        entry.rejected[player.index()] += 1;
                    }
                }
                sim.apply_operations(player);
            }
            log.push(entry);

            result = sim.next_round()?;
            played += 1;
            observer(sim.state());
            if result.is_over() {
                break;
            }
        }

        info!(scenario = %self.name, seed = self.seed, ?result, rounds = played, "scenario finished");
        Ok(ScenarioReport {
            name: self.name.clone(),
            seed: self.seed,
            result,
            rounds_played: played,
            log,
            final_state: sim.into_state(),
        })
    }

    /// Random script of `turns` entries for both players
    ///
    /// Draws tower builds on each player's highland, base upgrades and super
    /// weapons at valid cells. Many of them will be refused by the gate.
    pub fn random<R: Rng>(rng: &mut R, name: &str, seed: u64, turns: usize) -> Self {
        let highland: [Vec<Point>; 2] = [
            all_points().filter(|p| p.is_highland(Player::P0)).collect(),
            all_points().filter(|p| p.is_highland(Player::P1)).collect(),
        ];
        let cells: Vec<Point> = all_points().collect();

        let mut script = Vec::with_capacity(turns);
        for _ in 0..turns {
            let player = if rng.gen_bool(0.5) { Player::P0 } else { Player::P1 };
            let op = match rng.gen_range(0..10) {
                0..=5 => highland[player.index()]
                    .choose(rng)
                    .map(|&at| Operation::BuildTower { at }),
                6 => Some(Operation::UpgradeGenerationSpeed),
                7 => Some(Operation::UpgradeGeneratedAnt),
                _ => {
                    let weapon = ALL_SUPER_WEAPONS.choose(rng).copied();
                    let at = cells.choose(rng).copied();
                    weapon.zip(at).map(|(weapon, at)| Operation::UseSuperWeapon { weapon, at })
                }
            };
            if let Some(op) = op {
                script.push(ScriptedTurn {
                    round: rng.gen_range(0..200),
                    player,
                    operations: vec![op],
                });
            }
        }
        script.sort_by_key(|turn| turn.round);

        Self {
            name: name.to_string(),
            seed,
            max_round: None,
            script,
        }
    }
}

impl Default for Scenario {
    /// Mirrored opening: each side builds one tower next to its base lane
    /// and upgrades it once affordable
    fn default() -> Self {
        let opening = |player: Player, at: Point| ScriptedTurn {
            round: 0,
            player,
            operations: vec![Operation::BuildTower { at }],
        };
        let upgrade = |player: Player, tower| ScriptedTurn {
            round: 30,
            player,
            operations: vec![Operation::UpgradeTower {
                tower,
                to: crate::tower::TowerKind::Heavy,
            }],
        };
        Self {
            name: "default".to_string(),
            seed: 1,
            max_round: None,
            script: vec![
                opening(Player::P0, Point::new(5, 9)),
                opening(Player::P1, Point::new(13, 9)),
                upgrade(Player::P0, 0),
                upgrade(Player::P1, 1),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_default_scenario_runs() {
        let scenario = Scenario::default();
        let report = scenario.run(Some(40), |_| {}).unwrap();
        assert_eq!(report.rounds_played, 40);
        assert_eq!(report.result, GameResult::Running);
        assert_eq!(report.accepted(), 4);
        assert_eq!(report.rejected(), 0);
        assert_eq!(report.final_state.tower_count(Player::P0), 1);
        assert_eq!(report.log[0].accepted, [1, 1]);
    }

    #[test]
    fn test_run_stops_at_round_limit() {
        let scenario = Scenario {
            max_round: Some(5),
            ..Scenario::default()
        };
        let mut seen = 0;
        let report = scenario.run(None, |_| seen += 1).unwrap();
        assert_eq!(report.result, GameResult::Undecided);
        assert_eq!(report.final_state.round(), 5);
        assert_eq!(seen, report.rounds_played);
    }

    #[test]
    fn test_json_roundtrip() {
        let scenario = Scenario::default();
        let json = serde_json::to_string(&scenario).unwrap();
        assert!(json.contains("\"op\":\"build_tower\""));
        let back: Scenario = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scenario);
    }

    #[test]
    fn test_minimal_json() {
        let scenario: Scenario = serde_json::from_str(r#"{"name": "empty", "seed": 7}"#).unwrap();
        assert!(scenario.script.is_empty());
        assert_eq!(scenario.config().max_round, 512);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("antwar-scenario-{}.json", std::process::id()));
        let scenario = Scenario::default().with_seed(99);
        scenario.save(&path).unwrap();
        let loaded = Scenario::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.seed, 99);
        assert_eq!(loaded, scenario);
    }

    #[test]
    fn test_random_scenario_is_reproducible() {
        let mut a = ChaCha8Rng::seed_from_u64(5);
        let mut b = ChaCha8Rng::seed_from_u64(5);
        let first = Scenario::random(&mut a, "r", 1, 40);
        assert_eq!(first, Scenario::random(&mut b, "r", 1, 40));
        assert!(first.script.windows(2).all(|w| w[0].round <= w[1].round));
        assert!(first.run(Some(50), |_| {}).is_ok());
    }
}
