//! Player operations

use serde::{Deserialize, Serialize};

use crate::board::Point;
use crate::tower::{TowerId, TowerKind};
use crate::weapon::SuperWeaponKind;

/// A single player action for one round
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    BuildTower { at: Point },
    UpgradeTower { tower: TowerId, to: TowerKind },
    /// Downgrade one tier, or destroy a Basic tower
    DowngradeTower { tower: TowerId },
    UseSuperWeapon { weapon: SuperWeaponKind, at: Point },
    UpgradeGenerationSpeed,
    UpgradeGeneratedAnt,
}

impl Operation {
    /// Wire code of this operation
    pub fn code(&self) -> i32 {
        match self {
            Operation::BuildTower { .. } => 11,
            Operation::UpgradeTower { .. } => 12,
            Operation::DowngradeTower { .. } => 13,
            Operation::UseSuperWeapon { weapon, .. } => 20 + *weapon as i32,
            Operation::UpgradeGenerationSpeed => 31,
            Operation::UpgradeGeneratedAnt => 32,
        }
    }

    /// Number of integer arguments carried on the wire for `code`
    pub fn arity(code: i64) -> Option<usize> {
        match code {
            11 | 12 | 21..=24 => Some(2),
            13 => Some(1),
            31 | 32 => Some(0),
            _ => None,
        }
    }

    /// Wire arguments, in order
    pub fn args(&self) -> Vec<i32> {
        match *self {
            Operation::BuildTower { at } | Operation::UseSuperWeapon { at, .. } => vec![at.x, at.y],
            Operation::UpgradeTower { tower, to } => vec![tower, to.code()],
            Operation::DowngradeTower { tower } => vec![tower],
            Operation::UpgradeGenerationSpeed | Operation::UpgradeGeneratedAnt => Vec::new(),
        }
    }

    pub fn is_base_upgrade(&self) -> bool {
        matches!(
            self,
            Operation::UpgradeGenerationSpeed | Operation::UpgradeGeneratedAnt
        )
    }

    /// Tower this operation modifies, if any
    pub fn tower(&self) -> Option<TowerId> {
        match *self {
            Operation::UpgradeTower { tower, .. } | Operation::DowngradeTower { tower } => Some(tower),
            _ => None,
        }
    }

    /// Check if both operations may not appear in the same batch
    pub fn collides_with(&self, other: &Operation) -> bool {
        match (self, other) {
            (Operation::BuildTower { at: a }, Operation::BuildTower { at: b }) => a == b,
            (
                Operation::UseSuperWeapon { weapon: a, .. },
                Operation::UseSuperWeapon { weapon: b, .. },
            ) => a == b,
            _ if self.is_base_upgrade() && other.is_base_upgrade() => true,
            _ => matches!((self.tower(), other.tower()), (Some(a), Some(b)) if a == b),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())?;
        for arg in self.args() {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
