//! Player bases: ant spawning and the two upgrade tracks

use serde::{Deserialize, Serialize};

use crate::ant::{Ant, AntId};
use crate::board::Point;
use crate::game::Player;

/// Starting base HP
pub const BASE_MAX_HP: i32 = 50;

/// Highest level of either upgrade track
pub const MAX_BASE_LEVEL: u8 = 2;

/// A new ant spawns when the round number divides by this, per speed level
const SPAWN_CYCLE: [i32; 3] = [4, 2, 1];

/// Fixed base coordinates, indexed by player
pub const BASE_POSITIONS: [Point; 2] = [Point::new(2, 9), Point::new(16, 9)];

/// A player's base
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Base {
    pub owner: Player,
    pub pos: Point,
    pub hp: i32,
    /// Spawn speed level (0-2)
    pub gen_speed_level: u8,
    /// Level of spawned ants (0-2)
    pub ant_level: u8,
}

impl Base {
    pub fn new(owner: Player) -> Self {
        Self {
            owner,
            pos: BASE_POSITIONS[owner.index()],
            hp: BASE_MAX_HP,
            gen_speed_level: 0,
            ant_level: 0,
        }
    }

    pub fn spawn_cycle(&self) -> i32 {
        SPAWN_CYCLE[self.gen_speed_level.min(MAX_BASE_LEVEL) as usize]
    }

    /// Spawn an ant if `round` is on this base's cycle
    pub fn spawn(&self, id: AntId, round: i32) -> Option<Ant> {
        (round % self.spawn_cycle() == 0).then(|| Ant::new(id, self.owner, self.pos, self.ant_level))
    }

    pub fn is_destroyed(&self) -> bool {
        self.hp <= 0
    }
}
