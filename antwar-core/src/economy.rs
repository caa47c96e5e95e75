//! Prices and refunds
//!
//! Pure functions of counts and levels. Costs are positive numbers; the
//! operation gate turns them into signed income.

use crate::tower::TowerKind;
use crate::weapon::SuperWeaponKind;

/// Coins each player starts with
pub const COIN_INIT: i32 = 50;

/// Coins paid to both players every round
pub const BASIC_INCOME: i32 = 1;

const TOWER_BUILD_PRICE_BASE: i32 = 15;
const TOWER_BUILD_PRICE_RATIO: i32 = 2;
const LEVEL2_TOWER_UPGRADE_PRICE: i32 = 60;
const LEVEL3_TOWER_UPGRADE_PRICE: i32 = 200;
const LEVEL2_BASE_UPGRADE_PRICE: i32 = 200;
const LEVEL3_BASE_UPGRADE_PRICE: i32 = 250;

/// Share of a price returned when a step is undone (truncated)
const REFUND_RATIO: f64 = 0.8;

/// Cost of building a tower while owning `tower_count` towers
pub fn build_tower_cost(tower_count: usize) -> i32 {
    let exponent = u32::try_from(tower_count).unwrap_or(u32::MAX);
    TOWER_BUILD_PRICE_RATIO
        .checked_pow(exponent)
        .and_then(|scale| TOWER_BUILD_PRICE_BASE.checked_mul(scale))
        .unwrap_or(i32::MAX)
}

/// Cost of upgrading a tower into `target`
pub fn upgrade_tower_cost(target: TowerKind) -> i32 {
    match target.tier() {
        1 => 0,
        2 => LEVEL2_TOWER_UPGRADE_PRICE,
        _ => LEVEL3_TOWER_UPGRADE_PRICE,
    }
}

/// Refund for destroying a Basic tower while owning `tower_count` towers
pub fn destroy_tower_income(tower_count: usize) -> i32 {
    refund(build_tower_cost(tower_count.saturating_sub(1)))
}

/// Refund for downgrading a tower that currently is `current`
pub fn downgrade_tower_income(current: TowerKind) -> i32 {
    refund(upgrade_tower_cost(current))
}

/// Cost of raising a base track from `level`; `None` at the cap
pub fn upgrade_base_cost(level: u8) -> Option<i32> {
    match level {
        0 => Some(LEVEL2_BASE_UPGRADE_PRICE),
        1 => Some(LEVEL3_BASE_UPGRADE_PRICE),
        _ => None,
    }
}

pub fn super_weapon_cost(kind: SuperWeaponKind) -> i32 {
    kind.info().price
}

fn refund(price: i32) -> i32 {
    (f64::from(price) * REFUND_RATIO) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_cost_doubles() {
        assert_eq!(build_tower_cost(0), 15);
        assert_eq!(build_tower_cost(1), 30);
        assert_eq!(build_tower_cost(4), 240);
        assert_eq!(build_tower_cost(40), i32::MAX);
    }

    #[test]
    fn test_refunds() {
        assert_eq!(destroy_tower_income(1), 12);
        assert_eq!(destroy_tower_income(2), 24);
        assert_eq!(downgrade_tower_income(TowerKind::Heavy), 48);
        assert_eq!(downgrade_tower_income(TowerKind::Missile), 160);
    }

    #[test]
    fn test_upgrade_prices() {
        assert_eq!(upgrade_tower_cost(TowerKind::Quick), 60);
        assert_eq!(upgrade_tower_cost(TowerKind::Double), 200);
        assert_eq!(upgrade_base_cost(0), Some(200));
        assert_eq!(upgrade_base_cost(1), Some(250));
        assert_eq!(upgrade_base_cost(2), None);
        assert_eq!(super_weapon_cost(SuperWeaponKind::EmpBlaster), 150);
    }
}
