//! Simulator: a private copy of the game plus both players' pending batches

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Rejection};
use crate::game::{GameResult, GameState, Player};
use crate::gate;
use crate::operation::Operation;

/// Default round limit
pub const MAX_ROUND: i32 = 512;

/// Tunables of a simulation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Round at which the game is judged by base HP
    pub max_round: i32,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_round: MAX_ROUND,
        }
    }
}

impl SimulatorConfig {
    pub fn with_max_round(mut self, max_round: i32) -> Self {
        self.max_round = max_round;
        self
    }
}

/// Runs rounds on its own copy of a [`GameState`]
///
/// Operations go through the gate before they are queued. Nothing done here
/// is visible in the state the simulator was created from.
#[derive(Clone, Debug)]
pub struct Simulator {
    state: GameState,
    operations: [Vec<Operation>; 2],
    config: SimulatorConfig,
}

impl Simulator {
    /// Simulator on a copy of `state`
    pub fn new(state: &GameState) -> Self {
        Self::with_config(state.clone(), SimulatorConfig::default())
    }

    pub fn with_config(state: GameState, config: SimulatorConfig) -> Self {
        Self {
            state,
            operations: [Vec::new(), Vec::new()],
            config,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Operations queued for `player` this round
    pub fn operations(&self, player: Player) -> &[Operation] {
        &self.operations[player.index()]
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Queue `op` for `player` if the gate accepts it
    pub fn try_add_operation(&mut self, player: Player, op: Operation) -> Result<(), Rejection> {
        let batch = &mut self.operations[player.index()];
        gate::validate(&self.state, player, batch, &op)?;
        batch.push(op);
        Ok(())
    }

    /// Queue `op` for `player`; false if it was rejected
    pub fn add_operation(&mut self, player: Player, op: Operation) -> bool {
        match self.try_add_operation(player, op) {
            Ok(()) => true,
            Err(reason) => {
                debug!(%player, %op, %reason, "operation rejected");
                false
            }
        }
    }

    /// Apply `player`'s queued batch as their half of the round
    pub fn apply_operations(&mut self, player: Player) {
        self.state.apply_turn(player, &self.operations[player.index()]);
    }

    /// Resolve the round; both batches are cleared if the game goes on
    pub fn next_round(&mut self) -> Result<GameResult, EngineError> {
        let result = self.state.advance_round(self.config.max_round)?;
        if !result.is_over() {
            for batch in &mut self.operations {
                batch.clear();
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Point;

    #[test]
    fn test_gate_runs_on_add() {
        let state = GameState::new(1);
        let mut sim = Simulator::new(&state);
        let build = |x, y| Operation::BuildTower { at: Point::new(x, y) };

        assert!(sim.add_operation(Player::P0, build(5, 9)));
        assert!(!sim.add_operation(Player::P0, build(5, 9)));
        assert!(sim.add_operation(Player::P0, build(6, 9)));
        assert_eq!(
            sim.try_add_operation(Player::P0, build(4, 3)),
            Err(Rejection::Unaffordable)
        );
        assert_eq!(sim.operations(Player::P0).len(), 2);
        assert!(sim.operations(Player::P1).is_empty());
    }

    #[test]
    fn test_simulation_leaves_source_untouched() {
        let state = GameState::new(1);
        let mut sim = Simulator::new(&state);
        sim.add_operation(Player::P0, Operation::BuildTower { at: Point::new(5, 9) });
        sim.apply_operations(Player::P0);
        sim.next_round().unwrap();

        assert_eq!(sim.state().coins(Player::P0), 36);
        assert_eq!(sim.state().round(), 1);
        assert_eq!(state.coins(Player::P0), 50);
        assert_eq!(state.round(), 0);
        assert!(sim.operations(Player::P0).is_empty());
    }

    #[test]
    fn test_round_limit_from_config() {
        let config = SimulatorConfig::default().with_max_round(3);
        let mut sim = Simulator::with_config(GameState::new(1), config);
        let mut result = GameResult::Running;
        for _ in 0..10 {
            result = sim.next_round().unwrap();
            if result.is_over() {
                break;
            }
        }
        assert_eq!(result, GameResult::Undecided);
        assert_eq!(sim.state().round(), 3);
    }
}
