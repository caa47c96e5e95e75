//! Ants: the units each base sends toward the opposing base

use serde::{Deserialize, Serialize};

use crate::board::{Direction, Point};
use crate::error::EngineError;
use crate::game::Player;

/// Ant identifier, assigned in increasing order per game
pub type AntId = i32;

/// Rounds an ant may live before it is retired
pub const AGE_LIMIT: i32 = 32;

/// Max HP by ant level
pub const MAX_HP: [i32; 3] = [10, 25, 50];

/// Coins paid to the killer by ant level
pub const KILL_REWARD: [i32; 3] = [3, 5, 7];

/// Life-cycle stage of an ant
///
/// `Alive` and `Frozen` are the living states. Leaving them is permanent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AntState {
    Alive = 0,
    Success = 1,
    Fail = 2,
    TooOld = 3,
    Frozen = 4,
}

impl AntState {
    pub fn is_alive(self) -> bool {
        matches!(self, AntState::Alive | AntState::Frozen)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_alive()
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(AntState::Alive),
            1 => Some(AntState::Success),
            2 => Some(AntState::Fail),
            3 => Some(AntState::TooOld),
            4 => Some(AntState::Frozen),
            _ => None,
        }
    }

    /// Pheromone deposited along the trail of an ant that ended in this state
    pub fn pheromone_delta(self) -> f64 {
        match self {
            AntState::Success => 10.0,
            AntState::Fail => -5.0,
            AntState::TooOld => -3.0,
            AntState::Alive | AntState::Frozen => 0.0,
        }
    }
}

/// A unit walking toward the enemy base
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ant {
    pub id: AntId,
    pub owner: Player,
    pub pos: Point,
    pub hp: i32,
    /// 0-2, caps max HP and kill reward
    pub level: u8,
    pub age: i32,
    state: AntState,
    /// Cell the trail starts from
    origin: Point,
    /// Directions taken since `origin`
    trail: Vec<Direction>,
    /// Remaining hits absorbed by emergency evasion
    pub evasion: u8,
    /// Set while a friendly deflector covers this ant during combat
    #[serde(skip)]
    pub deflector: bool,
}

impl Ant {
    /// Fresh ant at full health
    pub fn new(id: AntId, owner: Player, pos: Point, level: u8) -> Self {
        let level = level.min(2);
        Self::with_state(id, owner, pos, MAX_HP[level as usize], level, 0, AntState::Alive)
    }

    /// Ant with explicit vitals, e.g. as reported in a round snapshot
    pub fn with_state(
        id: AntId,
        owner: Player,
        pos: Point,
        hp: i32,
        level: u8,
        age: i32,
        state: AntState,
    ) -> Self {
        Self {
            id,
            owner,
            pos,
            hp,
            level: level.min(2),
            age,
            state,
            origin: pos,
            trail: Vec::new(),
            evasion: 0,
            deflector: false,
        }
    }

    pub fn state(&self) -> AntState {
        self.state
    }

    pub fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    pub fn max_hp(&self) -> i32 {
        MAX_HP[self.level_index()]
    }

    pub fn reward(&self) -> i32 {
        KILL_REWARD[self.level_index()]
    }

    /// Table index for the level; out-of-range levels count as the top one
    fn level_index(&self) -> usize {
        usize::from(self.level).min(MAX_HP.len() - 1)
    }

    pub fn trail(&self) -> &[Direction] {
        &self.trail
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Last direction moved, if any
    pub fn last_direction(&self) -> Option<Direction> {
        self.trail.last().copied()
    }

    /// Step one cell and record the direction
    pub fn step(&mut self, direction: Direction) {
        self.trail.push(direction);
        self.pos = self.pos.neighbor(direction);
    }

    /// Move to an adjacent cell reported from outside, recording the step
    pub fn step_to(&mut self, dest: Point) -> Result<(), EngineError> {
        if dest == self.pos {
            return Ok(());
        }
        let direction = self
            .pos
            .direction_to(dest)
            .ok_or(EngineError::NonAdjacentStep {
                ant: self.id,
                from: self.pos,
                to: dest,
            })?;
        self.step(direction);
        Ok(())
    }

    /// Check if this ant can be attacked by `player` from `center` within `range`
    pub fn is_attackable_from(&self, player: Player, center: Point, range: i32) -> bool {
        self.owner != player && self.is_alive() && self.pos.is_within(center, range)
    }

    // ========================================================================
    // STATE TRANSITIONS
    // ========================================================================

    /// Overwrite the state with a reported one. A dead ant stays dead.
    pub fn sync_state(&mut self, state: AntState) {
        if self.state.is_alive() {
            self.state = state;
        }
    }

    pub fn freeze(&mut self) {
        if self.state.is_alive() {
            self.state = AntState::Frozen;
        }
    }

    pub fn thaw(&mut self) {
        if self.state == AntState::Frozen {
            self.state = AntState::Alive;
        }
    }

    pub fn kill(&mut self) {
        if self.state.is_alive() {
            self.state = AntState::Fail;
        }
    }

    pub fn retire(&mut self) {
        if self.state.is_alive() {
            self.state = AntState::TooOld;
        }
    }

    pub fn arrive(&mut self) {
        if self.state.is_alive() {
            self.state = AntState::Success;
        }
    }

    /// Absorb one hit of `damage`
    ///
    /// Evasion charges go first, then the deflector blocks anything below half
    /// the max HP. Returns true if HP was lost.
    pub fn take_hit(&mut self, damage: i32, freezes: bool) -> bool {
        if self.evasion > 0 {
            self.evasion -= 1;
            return false;
        }
        if self.deflector && damage < self.max_hp() / 2 {
            return false;
        }
        self.hp -= damage;
        if freezes {
            self.freeze();
        }
        if self.hp <= 0 {
            self.kill();
        }
        true
    }

    /// Cells visited from `origin` to the current position, in order
    ///
    /// Fails if replaying the trail does not end where the ant stands.
    pub fn trace(&self) -> Result<Vec<Point>, EngineError> {
        let mut cells = Vec::with_capacity(self.trail.len() + 1);
        let mut cur = self.origin;
        for &dir in &self.trail {
            cells.push(cur);
            cur = cur.neighbor(dir);
        }
        if cur != self.pos {
            return Err(EngineError::TrailMismatch {
                ant: self.id,
                expected: self.pos,
                actual: cur,
            });
        }
        cells.push(cur);
        Ok(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ant() -> Ant {
        Ant::new(0, Player::P0, Point::new(2, 9), 0)
    }

    #[test]
    fn test_new_ant() {
        let a = Ant::new(3, Player::P1, Point::new(16, 9), 2);
        assert_eq!(a.hp, 50);
        assert_eq!(a.reward(), 7);
        assert_eq!(a.state(), AntState::Alive);
        assert!(a.trail().is_empty());
    }

    #[test]
    fn test_death_is_permanent() {
        let mut a = ant();
        a.kill();
        a.freeze();
        a.thaw();
        a.arrive();
        a.sync_state(AntState::Alive);
        assert_eq!(a.state(), AntState::Fail);
    }

    #[test]
    fn test_take_hit() {
        let mut a = ant();
        a.evasion = 1;
        assert!(!a.take_hit(5, false));
        assert_eq!(a.evasion, 0);
        assert_eq!(a.hp, 10);

        a.deflector = true;
        assert!(!a.take_hit(4, false));
        assert!(a.take_hit(5, true));
        assert_eq!(a.hp, 5);
        assert_eq!(a.state(), AntState::Frozen);

        assert!(a.take_hit(5, false));
        assert_eq!(a.state(), AntState::Fail);
    }

    #[test]
    fn test_trace() {
        let mut a = ant();
        a.step(4);
        a.step(0);
        let cells = a.trace().unwrap();
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0], Point::new(2, 9));
        assert_eq!(*cells.last().unwrap(), a.pos);

        a.pos = Point::new(10, 10);
        assert!(matches!(a.trace(), Err(EngineError::TrailMismatch { .. })));
    }

    #[test]
    fn test_level_above_cap_reads_as_top_level() {
        let mut value = serde_json::to_value(ant()).unwrap();
        value["level"] = serde_json::json!(9);
        let a: Ant = serde_json::from_value(value).unwrap();
        assert_eq!(a.level, 9);
        assert_eq!(a.max_hp(), 50);
        assert_eq!(a.reward(), 7);
    }

    #[test]
    fn test_step_to_rejects_jumps() {
        let mut a = ant();
        assert!(a.step_to(Point::new(3, 9)).is_ok());
        assert_eq!(a.trail(), &[4]);
        assert!(a.step_to(Point::new(6, 9)).is_err());
    }
}
