//! Tower types, their stat table, and attack resolution

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::ant::{Ant, AntId};
use crate::board::Point;
use crate::game::Player;

/// Tower identifier, assigned in increasing order per game
pub type TowerId = i32;

/// Tower type. Discriminants are the wire codes: the tens digit names the
/// tier-2 parent, so `code / 10` is always one step down the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    Basic = 0,
    Heavy = 1,
    HeavyPlus = 11,
    Ice = 12,
    Cannon = 13,
    Quick = 2,
    QuickPlus = 21,
    Double = 22,
    Sniper = 23,
    Mortar = 3,
    MortarPlus = 31,
    Pulse = 32,
    Missile = 33,
}

/// Which ants one shot affects
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Splash {
    /// Only the target
    Single,
    /// Everything within the radius of the target
    AroundTarget(i32),
    /// Everything within the tower's own range of the tower
    AroundTower,
}

/// Static stats of a tower type
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    pub damage: i32,
    /// Rounds per attack; below 1 means several attacks per round
    pub interval: f64,
    pub range: i32,
}

impl TowerStats {
    const fn new(damage: i32, interval: f64, range: i32) -> Self {
        Self {
            damage,
            interval,
            range,
        }
    }

    /// Target searches per activation
    pub fn attack_cycles(&self) -> u32 {
        if self.interval >= 1.0 {
            1
        } else {
            (1.0 / self.interval).round() as u32
        }
    }

    /// Cooldown set after a successful attack
    pub fn cooldown(&self) -> i32 {
        self.interval.max(1.0) as i32
    }
}

pub const ALL_TOWER_KINDS: [TowerKind; 13] = [
    TowerKind::Basic,
    TowerKind::Heavy,
    TowerKind::HeavyPlus,
    TowerKind::Ice,
    TowerKind::Cannon,
    TowerKind::Quick,
    TowerKind::QuickPlus,
    TowerKind::Double,
    TowerKind::Sniper,
    TowerKind::Mortar,
    TowerKind::MortarPlus,
    TowerKind::Pulse,
    TowerKind::Missile,
];

impl TowerKind {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i64) -> Option<Self> {
        ALL_TOWER_KINDS.iter().copied().find(|k| k.code() as i64 == code)
    }

    pub fn stats(self) -> TowerStats {
        match self {
            TowerKind::Basic => TowerStats::new(5, 2.0, 2),
            TowerKind::Heavy => TowerStats::new(15, 2.0, 2),
            TowerKind::HeavyPlus => TowerStats::new(35, 2.0, 2),
            TowerKind::Ice => TowerStats::new(15, 2.0, 2),
            TowerKind::Cannon => TowerStats::new(50, 4.0, 3),
            TowerKind::Quick => TowerStats::new(6, 1.0, 3),
            TowerKind::QuickPlus => TowerStats::new(8, 0.5, 3),
            TowerKind::Double => TowerStats::new(10, 1.0, 4),
            TowerKind::Sniper => TowerStats::new(13, 2.0, 6),
            TowerKind::Mortar => TowerStats::new(16, 4.0, 3),
            TowerKind::MortarPlus => TowerStats::new(35, 4.0, 4),
            TowerKind::Pulse => TowerStats::new(30, 3.0, 2),
            TowerKind::Missile => TowerStats::new(45, 6.0, 5),
        }
    }

    /// 1 for Basic, 2 for the three branches, 3 for their specializations
    pub fn tier(self) -> u8 {
        match self.code() {
            0 => 1,
            1..=9 => 2,
            _ => 3,
        }
    }

    /// One step down the tree; `None` for Basic
    pub fn parent(self) -> Option<Self> {
        match self {
            TowerKind::Basic => None,
            _ => Self::from_code(self.code() as i64 / 10),
        }
    }

    pub fn can_upgrade_to(self, target: TowerKind) -> bool {
        target.parent() == Some(self)
    }

    pub fn target_count(self) -> usize {
        match self {
            TowerKind::Double => 2,
            _ => 1,
        }
    }

    pub fn splash(self) -> Splash {
        match self {
            TowerKind::Mortar | TowerKind::MortarPlus => Splash::AroundTarget(1),
            TowerKind::Missile => Splash::AroundTarget(2),
            TowerKind::Pulse => Splash::AroundTower,
            _ => Splash::Single,
        }
    }

    pub fn freezes(self) -> bool {
        self == TowerKind::Ice
    }
}

/// A tower on the board
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tower {
    pub id: TowerId,
    pub owner: Player,
    pub pos: Point,
    kind: TowerKind,
    /// Rounds until the next attack (0 = ready)
    pub cooldown: i32,
}

impl Tower {
    /// Newly built tower; it has to cool down before its first shot
    pub fn new(id: TowerId, owner: Player, pos: Point, kind: TowerKind) -> Self {
        Self {
            id,
            owner,
            pos,
            kind,
            cooldown: kind.stats().cooldown(),
        }
    }

    /// Tower as reported in a round snapshot
    pub fn with_cooldown(id: TowerId, owner: Player, pos: Point, kind: TowerKind, cooldown: i32) -> Self {
        Self {
            id,
            owner,
            pos,
            kind,
            cooldown,
        }
    }

    pub fn kind(&self) -> TowerKind {
        self.kind
    }

    pub fn stats(&self) -> TowerStats {
        self.kind.stats()
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown <= 0
    }

    pub fn reset_cooldown(&mut self) {
        self.cooldown = self.stats().cooldown();
    }

    /// Switch to `kind` without checking the tree
    pub fn upgrade(&mut self, kind: TowerKind) {
        self.kind = kind;
        self.reset_cooldown();
    }

    /// Strip one tier. Returns false for Basic, which has to be destroyed instead.
    pub fn downgrade(&mut self) -> bool {
        match self.kind.parent() {
            Some(parent) => {
                self.upgrade(parent);
                true
            }
            None => false,
        }
    }

    /// Count down and, if ready, fire at enemy ants
    ///
    /// Returns the ids of every ant affected, ascending and without repeats.
    /// The cooldown resets only if something was affected.
    pub fn attack(&mut self, ants: &mut BTreeMap<AntId, Ant>) -> Vec<AntId> {
        self.cooldown = (self.cooldown - 1).max(0);
        if !self.is_ready() {
            return Vec::new();
        }

        let stats = self.stats();
        let mut affected = FxHashSet::default();
        for _ in 0..stats.attack_cycles() {
            let targets = self.find_targets(ants, self.kind.target_count());
            let hits = self.expand_targets(ants, &targets);
            for id in hits {
                if let Some(ant) = ants.get_mut(&id) {
                    ant.take_hit(stats.damage, self.kind.freezes());
                }
                affected.insert(id);
            }
        }

        let mut affected: Vec<AntId> = affected.into_iter().collect();
        affected.sort_unstable();
        if !affected.is_empty() {
            self.reset_cooldown();
        }
        affected
    }

    /// Nearest attackable ants, ties broken by ascending id
    fn find_targets(&self, ants: &BTreeMap<AntId, Ant>, count: usize) -> Vec<AntId> {
        let mut candidates = attackable_ants(ants, self.owner, self.pos, self.stats().range);
        candidates.sort_by_key(|&(id, dist)| (dist, id));
        candidates.into_iter().take(count).map(|(id, _)| id).collect()
    }

    /// Ants affected by shots at `targets`, possibly repeated
    fn expand_targets(&self, ants: &BTreeMap<AntId, Ant>, targets: &[AntId]) -> Vec<AntId> {
        let mut hits = Vec::new();
        for id in targets {
            let Some(target) = ants.get(id) else {
                continue;
            };
            match self.kind.splash() {
                Splash::Single => hits.push(*id),
                Splash::AroundTarget(radius) => hits.extend(
                    attackable_ants(ants, self.owner, target.pos, radius)
                        .into_iter()
                        .map(|(id, _)| id),
                ),
                Splash::AroundTower => hits.extend(
                    attackable_ants(ants, self.owner, self.pos, self.stats().range)
                        .into_iter()
                        .map(|(id, _)| id),
                ),
            }
        }
        hits
    }
}

/// Living enemy ants of `player` within `range` of `center`, with their distance
fn attackable_ants(
    ants: &BTreeMap<AntId, Ant>,
    player: Player,
    center: Point,
    range: i32,
) -> Vec<(AntId, i32)> {
    ants.values()
        .filter(|ant| ant.is_attackable_from(player, center, range))
        .map(|ant| (ant.id, ant.pos.distance_to(center)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemies(points: &[Point]) -> BTreeMap<AntId, Ant> {
        points
            .iter()
            .enumerate()
            .map(|(i, &p)| (i as AntId, Ant::new(i as AntId, Player::P1, p, 0)))
            .collect()
    }

    #[test]
    fn test_upgrade_tree() {
        assert!(TowerKind::Basic.can_upgrade_to(TowerKind::Heavy));
        assert!(TowerKind::Quick.can_upgrade_to(TowerKind::Sniper));
        assert!(!TowerKind::Basic.can_upgrade_to(TowerKind::Ice));
        assert!(!TowerKind::Heavy.can_upgrade_to(TowerKind::Pulse));
        assert!(!TowerKind::Missile.can_upgrade_to(TowerKind::Basic));
        assert_eq!(TowerKind::Pulse.parent(), Some(TowerKind::Mortar));
        assert_eq!(TowerKind::Mortar.parent(), Some(TowerKind::Basic));
        assert_eq!(TowerKind::Basic.parent(), None);
        for kind in ALL_TOWER_KINDS {
            assert_eq!(TowerKind::from_code(kind.code() as i64), Some(kind));
        }
        assert_eq!(TowerKind::from_code(4), None);
    }

    #[test]
    fn test_attack_cycles() {
        assert_eq!(TowerKind::QuickPlus.stats().attack_cycles(), 2);
        assert_eq!(TowerKind::Cannon.stats().attack_cycles(), 1);
        assert_eq!(TowerKind::QuickPlus.stats().cooldown(), 1);
        assert_eq!(TowerKind::Missile.stats().cooldown(), 6);
    }

    #[test]
    fn test_basic_attack() {
        let mut tower = Tower::with_cooldown(0, Player::P0, Point::new(5, 9), TowerKind::Basic, 0);
        let mut ants = enemies(&[Point::new(7, 9)]);
        let hit = tower.attack(&mut ants);
        assert_eq!(hit, vec![0]);
        assert_eq!(ants[&0].hp, 5);
        assert_eq!(tower.cooldown, 2);
    }

    #[test]
    fn test_cooldown_blocks_attack() {
        let mut tower = Tower::new(0, Player::P0, Point::new(5, 9), TowerKind::Basic);
        let mut ants = enemies(&[Point::new(6, 9)]);
        assert!(tower.attack(&mut ants).is_empty());
        assert_eq!(tower.cooldown, 1);
        assert_eq!(tower.attack(&mut ants), vec![0]);
    }

    #[test]
    fn test_no_target_keeps_cooldown_at_zero() {
        let mut tower = Tower::with_cooldown(0, Player::P0, Point::new(5, 9), TowerKind::Basic, 0);
        let mut ants = enemies(&[Point::new(12, 9)]);
        assert!(tower.attack(&mut ants).is_empty());
        assert_eq!(tower.cooldown, 0);
    }

    #[test]
    fn test_nearest_then_lowest_id() {
        let mut tower = Tower::with_cooldown(0, Player::P0, Point::new(5, 9), TowerKind::Double, 0);
        // ids 0 and 1 at distance 2, id 2 at distance 1
        let mut ants = enemies(&[Point::new(7, 9), Point::new(3, 9), Point::new(6, 9)]);
        let hit = tower.attack(&mut ants);
        assert_eq!(hit, vec![0, 2]);
        assert_eq!(ants[&1].hp, 10);
    }

    #[test]
    fn test_mortar_splash() {
        let mut tower = Tower::with_cooldown(0, Player::P0, Point::new(5, 9), TowerKind::Mortar, 0);
        let mut ants = enemies(&[Point::new(7, 9), Point::new(8, 9), Point::new(10, 9)]);
        let hit = tower.attack(&mut ants);
        assert_eq!(hit, vec![0, 1]);
        assert_eq!(ants[&2].hp, 10);
        assert_eq!(ants[&0].state(), crate::ant::AntState::Fail);
    }

    #[test]
    fn test_pulse_hits_around_tower() {
        let mut tower = Tower::with_cooldown(0, Player::P0, Point::new(6, 9), TowerKind::Pulse, 0);
        // target (7, 9); (4, 9) is 2 from the tower but 3 from the target; (9, 9) is out of range
        let mut ants = enemies(&[Point::new(7, 9), Point::new(4, 9), Point::new(9, 9)]);
        let hit = tower.attack(&mut ants);
        assert_eq!(hit, vec![0, 1]);
        assert_eq!(ants[&1].state(), crate::ant::AntState::Fail);
        assert_eq!(ants[&2].hp, 10);
        assert_eq!(tower.cooldown, 3);
    }

    #[test]
    fn test_missile_splash_radius_two() {
        let mut tower = Tower::with_cooldown(0, Player::P0, Point::new(5, 9), TowerKind::Missile, 0);
        // target (9, 9); (11, 9) is beyond the tower's range but 2 from the target
        let mut ants = enemies(&[Point::new(9, 9), Point::new(11, 9), Point::new(12, 9)]);
        let hit = tower.attack(&mut ants);
        assert_eq!(hit, vec![0, 1]);
        assert_eq!(ants[&1].state(), crate::ant::AntState::Fail);
        assert_eq!(ants[&2].hp, 10);
        assert_eq!(ants[&2].state(), crate::ant::AntState::Alive);
    }

    #[test]
    fn test_ice_freezes_target() {
        let mut tower = Tower::with_cooldown(0, Player::P0, Point::new(5, 9), TowerKind::Ice, 0);
        let mut ants = BTreeMap::new();
        ants.insert(0, Ant::new(0, Player::P1, Point::new(7, 9), 2));
        ants.insert(1, Ant::new(1, Player::P1, Point::new(8, 9), 2));
        let hit = tower.attack(&mut ants);
        assert_eq!(hit, vec![0]);
        assert_eq!(ants[&0].hp, 35);
        assert_eq!(ants[&0].state(), crate::ant::AntState::Frozen);
        assert_eq!(ants[&1].hp, 50);
        assert_eq!(ants[&1].state(), crate::ant::AntState::Alive);
    }

    #[test]
    fn test_quick_plus_fires_twice() {
        let mut tower = Tower::with_cooldown(0, Player::P0, Point::new(5, 9), TowerKind::QuickPlus, 0);
        let mut ants = enemies(&[Point::new(7, 9)]);
        ants.get_mut(&0).unwrap().hp = 20;
        let hit = tower.attack(&mut ants);
        assert_eq!(hit, vec![0]);
        assert_eq!(ants[&0].hp, 4);
    }

    #[test]
    fn test_downgrade() {
        let mut tower = Tower::new(0, Player::P0, Point::new(5, 9), TowerKind::Sniper);
        assert!(tower.downgrade());
        assert_eq!(tower.kind(), TowerKind::Quick);
        assert_eq!(tower.cooldown, 1);
        assert!(tower.downgrade());
        assert_eq!(tower.kind(), TowerKind::Basic);
        assert!(!tower.downgrade());
    }
}
