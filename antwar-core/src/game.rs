//! Game state and operation application
//!
//! [`GameState`] owns every entity of a match. Entities live in id-keyed
//! arenas, so iteration always runs in ascending id order and removing one
//! entity never disturbs the others. Round resolution lives in
//! [`crate::engine`]; legality checks live in [`crate::gate`].

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::ant::{Ant, AntId};
use crate::base::{Base, MAX_BASE_LEVEL};
use crate::board::{Point, MAP_SIZE};
use crate::economy::COIN_INIT;
use crate::error::EngineError;
use crate::gate;
use crate::operation::Operation;
use crate::pheromone::PheromoneField;
use crate::tower::{Tower, TowerId, TowerKind};
use crate::weapon::{emp_covers, SuperWeapon, SuperWeaponKind};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player seat
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Player {
    P0 = 0,
    P1 = 1,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::P0, Player::P1];

    pub fn opponent(self) -> Self {
        match self {
            Player::P0 => Player::P1,
            Player::P1 => Player::P0,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Player::P0),
            1 => Some(Player::P1),
            _ => None,
        }
    }
}

impl TryFrom<i64> for Player {
    type Error = EngineError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Player::from_index(value).ok_or(EngineError::InvalidPlayer(value))
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player {}", self.index())
    }
}

/// Outcome of a round
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    Running,
    Player0Wins,
    Player1Wins,
    Undecided,
}

impl GameResult {
    pub fn win_for(player: Player) -> Self {
        match player {
            Player::P0 => GameResult::Player0Wins,
            Player::P1 => GameResult::Player1Wins,
        }
    }

    pub fn is_over(self) -> bool {
        self != GameResult::Running
    }

    pub fn winner(self) -> Option<Player> {
        match self {
            GameResult::Player0Wins => Some(Player::P0),
            GameResult::Player1Wins => Some(Player::P1),
            _ => None,
        }
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Complete state of a match
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) round: i32,
    pub(crate) towers: BTreeMap<TowerId, Tower>,
    pub(crate) ants: BTreeMap<AntId, Ant>,
    pub(crate) bases: [Base; 2],
    pub(crate) coins: [i32; 2],
    pub(crate) pheromone: PheromoneField,
    pub(crate) super_weapons: Vec<SuperWeapon>,
    /// Rounds until each super weapon type may be used again, per player
    pub(crate) weapon_cooldowns: [[i32; 4]; 2],
    pub(crate) next_ant_id: AntId,
    pub(crate) next_tower_id: TowerId,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTION
    // ========================================================================

    /// Fresh match whose pheromone field is drawn from `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            round: 0,
            towers: BTreeMap::new(),
            ants: BTreeMap::new(),
            bases: [Base::new(Player::P0), Base::new(Player::P1)],
            coins: [COIN_INIT; 2],
            pheromone: PheromoneField::seeded(seed),
            super_weapons: Vec::new(),
            weapon_cooldowns: [[0; 4]; 2],
            next_ant_id: 0,
            next_tower_id: 0,
        }
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn round(&self) -> i32 {
        self.round
    }

    pub fn towers(&self) -> impl Iterator<Item = &Tower> + '_ {
        self.towers.values()
    }

    pub fn tower(&self, id: TowerId) -> Option<&Tower> {
        self.towers.get(&id)
    }

    pub fn tower_at(&self, p: Point) -> Option<&Tower> {
        self.towers.values().find(|t| t.pos == p)
    }

    pub fn tower_count(&self, player: Player) -> usize {
        self.towers.values().filter(|t| t.owner == player).count()
    }

    pub fn ants(&self) -> impl Iterator<Item = &Ant> + '_ {
        self.ants.values()
    }

    pub fn ant(&self, id: AntId) -> Option<&Ant> {
        self.ants.get(&id)
    }

    pub fn base(&self, player: Player) -> &Base {
        &self.bases[player.index()]
    }

    pub fn coins(&self, player: Player) -> i32 {
        self.coins[player.index()]
    }

    pub fn pheromone(&self) -> &PheromoneField {
        &self.pheromone
    }

    pub fn super_weapons(&self) -> &[SuperWeapon] {
        &self.super_weapons
    }

    pub fn weapon_cooldown(&self, player: Player, kind: SuperWeaponKind) -> i32 {
        self.weapon_cooldowns[player.index()][kind.index()]
    }

    pub fn next_ant_id(&self) -> AntId {
        self.next_ant_id
    }

    pub fn next_tower_id(&self) -> TowerId {
        self.next_tower_id
    }

    /// Check if an enemy EMP of `player` covers `p`
    pub fn is_emp_shielded(&self, player: Player, p: Point) -> bool {
        emp_covers(&self.super_weapons, player, p)
    }

    // ========================================================================
    // SETUP
    // ========================================================================

    pub fn set_coins(&mut self, player: Player, coins: i32) {
        self.coins[player.index()] = coins;
    }

    pub fn set_base_hp(&mut self, player: Player, hp: i32) {
        self.bases[player.index()].hp = hp;
    }

    pub fn set_round(&mut self, round: i32) {
        self.round = round;
    }

    /// Put a tower on the board without paying for it
    pub fn place_tower(&mut self, player: Player, pos: Point, kind: TowerKind) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id += 1;
        self.towers.insert(id, Tower::new(id, player, pos, kind));
        id
    }

    /// Put a fresh ant on the board outside the spawn schedule
    pub fn place_ant(&mut self, player: Player, pos: Point, level: u8) -> AntId {
        let id = self.next_ant_id;
        self.next_ant_id += 1;
        self.ants.insert(id, Ant::new(id, player, pos, level));
        id
    }

    /// Mutable access to a living or dead ant, for scripted setups
    pub fn ant_mut(&mut self, id: AntId) -> Option<&mut Ant> {
        self.ants.get_mut(&id)
    }

    // ========================================================================
    // OPERATIONS
    // ========================================================================

    /// Apply one operation of `player` without checking it
    ///
    /// The coin balance moves first, then the effect. Operations naming a
    /// tower that no longer exists only move coins by zero.
    pub fn apply_operation(&mut self, player: Player, op: &Operation) {
        let income = gate::operation_income(self, player, op).unwrap_or(0);
        self.coins[player.index()] += income;

        match *op {
            Operation::BuildTower { at } => {
                self.place_tower(player, at, TowerKind::Basic);
            }
            Operation::UpgradeTower { tower, to } => {
                if let Some(t) = self.towers.get_mut(&tower) {
                    t.upgrade(to);
                }
            }
            Operation::DowngradeTower { tower } => {
                let destroyed = self.towers.get_mut(&tower).is_some_and(|t| !t.downgrade());
                if destroyed {
                    self.towers.remove(&tower);
                }
            }
            Operation::UseSuperWeapon { weapon, at } => self.use_super_weapon(player, weapon, at),
            Operation::UpgradeGenerationSpeed => {
                let base = &mut self.bases[player.index()];
                base.gen_speed_level = (base.gen_speed_level + 1).min(MAX_BASE_LEVEL);
            }
            Operation::UpgradeGeneratedAnt => {
                let base = &mut self.bases[player.index()];
                base.ant_level = (base.ant_level + 1).min(MAX_BASE_LEVEL);
            }
        }
    }

    fn use_super_weapon(&mut self, player: Player, kind: SuperWeaponKind, at: Point) {
        self.super_weapons.push(SuperWeapon::new(kind, player, at));
        self.weapon_cooldowns[player.index()][kind.index()] = kind.info().cooldown;
    }

    /// Run `player`'s half of a round on an accepted batch
    ///
    /// Own super weapons tick down first, then the batch is applied in order,
    /// then the surviving weapons take effect.
    pub fn apply_turn(&mut self, player: Player, ops: &[Operation]) {
        self.count_down_super_weapons(player);
        for op in ops {
            self.apply_operation(player, op);
        }
        self.apply_active_super_weapons(player);
    }

    /// Tick `player`'s active weapons and drop the expired ones
    pub(crate) fn count_down_super_weapons(&mut self, player: Player) {
        self.super_weapons.retain_mut(|w| {
            if w.owner != player {
                return true;
            }
            w.remaining -= 1;
            w.remaining > 0
        });
    }

    /// Lightning strikes and evasion grants of `player`'s active weapons
    pub(crate) fn apply_active_super_weapons(&mut self, player: Player) {
        for weapon in self.super_weapons.iter().filter(|w| w.owner == player) {
            match weapon.kind {
                SuperWeaponKind::LightningStorm => {
                    for ant in self.ants.values_mut() {
                        if ant.owner != player && ant.is_alive() && weapon.covers(ant.pos) {
                            ant.hp = 0;
                            ant.kill();
                            self.coins[player.index()] += ant.reward();
                        }
                    }
                }
                SuperWeaponKind::EmergencyEvasion => {
                    for ant in self.ants.values_mut() {
                        if ant.owner == player && weapon.covers(ant.pos) {
                            ant.evasion = 2;
                        }
                    }
                }
                SuperWeaponKind::EmpBlaster | SuperWeaponKind::Deflector => {}
            }
        }
    }

    pub(crate) fn count_down_weapon_cooldowns(&mut self) {
        for cd in self.weapon_cooldowns.iter_mut().flatten() {
            *cd = (*cd - 1).max(0);
        }
    }

    // ========================================================================
    // DEBUG OUTPUT
    // ========================================================================

    /// Write a human-readable snapshot
    ///
    /// Lines: the round; one line per tower and per ant; both bases; both
    /// coin balances; then both pheromone grids, one row per line.
    pub fn dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "round {}", self.round)?;
        writeln!(out, "towers {}", self.towers.len())?;
        for t in self.towers.values() {
            writeln!(
                out,
                "{} {} {} {} {} {}",
                t.id,
                t.owner.index(),
                t.pos.x,
                t.pos.y,
                t.kind().code(),
                t.cooldown
            )?;
        }
        writeln!(out, "ants {}", self.ants.len())?;
        for a in self.ants.values() {
            writeln!(
                out,
                "{} {} {} {} {} {} {} {}",
                a.id,
                a.owner.index(),
                a.pos.x,
                a.pos.y,
                a.hp,
                a.level,
                a.age,
                a.state().code()
            )?;
        }
        for base in &self.bases {
            writeln!(
                out,
                "base {} {} {} {}",
                base.owner.index(),
                base.hp,
                base.gen_speed_level,
                base.ant_level
            )?;
        }
        writeln!(out, "coins {} {}", self.coins[0], self.coins[1])?;
        for player in Player::BOTH {
            writeln!(out, "pheromone {}", player.index())?;
            for x in 0..MAP_SIZE {
                let row: Vec<String> = self
                    .pheromone
                    .row(player, x)
                    .iter()
                    .map(|v| format!("{v:.4}"))
                    .collect();
                writeln!(out, "{}", row.join(" "))?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
