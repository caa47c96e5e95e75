//! Super weapons: timed area effects bought with an operation

use serde::{Deserialize, Serialize};

use crate::board::Point;
use crate::game::Player;

/// Super weapon type. Discriminants are the last digit of the "use" operation code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuperWeaponKind {
    /// Kills every enemy ant in range, each round it is active
    LightningStorm = 1,
    /// Blocks enemy operations on towers and cells in range
    EmpBlaster = 2,
    /// Friendly ants in range ignore hits below half their max HP
    Deflector = 3,
    /// Friendly ants in range get two evasion charges
    EmergencyEvasion = 4,
}

pub const ALL_SUPER_WEAPONS: [SuperWeaponKind; 4] = [
    SuperWeaponKind::LightningStorm,
    SuperWeaponKind::EmpBlaster,
    SuperWeaponKind::Deflector,
    SuperWeaponKind::EmergencyEvasion,
];

/// Static info of a super weapon type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SuperWeaponInfo {
    /// Active turns
    pub duration: i32,
    pub range: i32,
    /// Rounds before the same type can be used again
    pub cooldown: i32,
    pub price: i32,
}

impl SuperWeaponKind {
    pub fn index(self) -> usize {
        self as usize - 1
    }

    pub fn from_index(index: usize) -> Option<Self> {
        ALL_SUPER_WEAPONS.get(index).copied()
    }

    pub fn info(self) -> SuperWeaponInfo {
        let (duration, range, cooldown, price) = match self {
            SuperWeaponKind::LightningStorm => (20, 3, 100, 150),
            SuperWeaponKind::EmpBlaster => (20, 3, 100, 150),
            SuperWeaponKind::Deflector => (10, 3, 50, 100),
            SuperWeaponKind::EmergencyEvasion => (1, 3, 50, 100),
        };
        SuperWeaponInfo {
            duration,
            range,
            cooldown,
            price,
        }
    }
}

/// An active super weapon
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperWeapon {
    pub kind: SuperWeaponKind,
    pub owner: Player,
    pub pos: Point,
    /// Turns of the owner left before it expires
    pub remaining: i32,
    pub range: i32,
}

impl SuperWeapon {
    pub fn new(kind: SuperWeaponKind, owner: Player, pos: Point) -> Self {
        let info = kind.info();
        Self {
            kind,
            owner,
            pos,
            remaining: info.duration,
            range: info.range,
        }
    }

    pub fn covers(&self, p: Point) -> bool {
        self.pos.is_within(p, self.range)
    }
}

/// Check if an enemy EMP of `player` covers `p`
pub fn emp_covers(weapons: &[SuperWeapon], player: Player, p: Point) -> bool {
    weapons
        .iter()
        .any(|w| w.kind == SuperWeaponKind::EmpBlaster && w.owner != player && w.covers(p))
}

/// Check if a friendly deflector of `player` covers `p`
pub fn deflector_covers(weapons: &[SuperWeapon], player: Player, p: Point) -> bool {
    weapons
        .iter()
        .any(|w| w.kind == SuperWeaponKind::Deflector && w.owner == player && w.covers(p))
}
