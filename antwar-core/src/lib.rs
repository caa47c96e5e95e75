//! ANTWAR Core - Rules engine for the ant tower-defense game
//!
//! This crate provides the deterministic game logic:
//! - Board geometry (hex grid in offset coordinates, fixed terrain map)
//! - Ants, towers, bases and super weapons
//! - Economy and the operation gate
//! - Round resolution with pheromone-guided movement
//! - Simulator for look-ahead, live-game controller and wire codec
//! - JSON scenarios for scripted matches

pub mod board;
pub mod ant;
pub mod tower;
pub mod base;
pub mod weapon;
pub mod operation;
pub mod economy;
pub mod pheromone;
pub mod error;
pub mod game;
pub mod gate;
pub mod engine;
pub mod simulate;
pub mod protocol;
pub mod controller;
pub mod scenario;

// Re-exports for convenient access
pub use ant::{Ant, AntId, AntState};
pub use base::Base;
pub use board::{Direction, Point, Terrain, MAP_SIZE};
pub use controller::Controller;
pub use engine::next_move;
pub use error::{EngineError, ProtocolError, Rejection};
pub use game::{GameResult, GameState, Player};
pub use operation::Operation;
pub use pheromone::{Lcg48, PheromoneField};
pub use protocol::{Decoder, InitInfo, RoundInfo};
pub use scenario::{Scenario, ScenarioReport};
pub use simulate::{Simulator, SimulatorConfig, MAX_ROUND};
pub use tower::{Tower, TowerId, TowerKind};
pub use weapon::{SuperWeapon, SuperWeaponKind};
