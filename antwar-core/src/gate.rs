//! Operation gate: decides whether an operation may join a player's batch
//!
//! A candidate is checked in three steps, first failure wins:
//! 1. it must not collide with an operation already in the batch,
//! 2. it must be structurally legal against the current state,
//! 3. the whole batch including it must be affordable.
//!
//! Nothing here mutates the state.

use crate::economy::{
    build_tower_cost, destroy_tower_income, downgrade_tower_income, super_weapon_cost,
    upgrade_base_cost, upgrade_tower_cost,
};
use crate::error::Rejection;
use crate::game::{GameState, Player};
use crate::operation::Operation;
use crate::tower::TowerKind;

/// Full check of `candidate` against `batch`, the operations `player` already queued
pub fn validate(
    state: &GameState,
    player: Player,
    batch: &[Operation],
    candidate: &Operation,
) -> Result<(), Rejection> {
    check_collision(batch, candidate)?;
    check_legal(state, player, candidate)?;
    if !is_affordable(state, player, batch.iter().chain(std::iter::once(candidate))) {
        return Err(Rejection::Unaffordable);
    }
    Ok(())
}

pub fn check_collision(batch: &[Operation], candidate: &Operation) -> Result<(), Rejection> {
    if batch.iter().any(|op| op.collides_with(candidate)) {
        Err(Rejection::Collision)
    } else {
        Ok(())
    }
}

/// Structural legality of one operation, ignoring its price
pub fn check_legal(state: &GameState, player: Player, op: &Operation) -> Result<(), Rejection> {
    match *op {
        Operation::BuildTower { at } => {
            if !at.is_highland(player) {
                return Err(Rejection::NotHighland);
            }
            if state.tower_at(at).is_some() {
                return Err(Rejection::Occupied);
            }
            if state.is_emp_shielded(player, at) {
                return Err(Rejection::EmpShielded);
            }
        }
        Operation::UpgradeTower { tower, to } => {
            let t = state.tower(tower).ok_or(Rejection::UnknownTower)?;
            if t.owner != player {
                return Err(Rejection::NotOwner);
            }
            if !t.kind().can_upgrade_to(to) {
                return Err(Rejection::IllegalUpgrade);
            }
            if state.is_emp_shielded(player, t.pos) {
                return Err(Rejection::EmpShielded);
            }
        }
        Operation::DowngradeTower { tower } => {
            let t = state.tower(tower).ok_or(Rejection::UnknownTower)?;
            if t.owner != player {
                return Err(Rejection::NotOwner);
            }
            if state.is_emp_shielded(player, t.pos) {
                return Err(Rejection::EmpShielded);
            }
        }
        Operation::UseSuperWeapon { weapon, at } => {
            if !at.is_valid() {
                return Err(Rejection::InvalidPosition);
            }
            if state.weapon_cooldown(player, weapon) > 0 {
                return Err(Rejection::OnCooldown);
            }
        }
        Operation::UpgradeGenerationSpeed => {
            upgrade_base_cost(state.base(player).gen_speed_level).ok_or(Rejection::LevelCap)?;
        }
        Operation::UpgradeGeneratedAnt => {
            upgrade_base_cost(state.base(player).ant_level).ok_or(Rejection::LevelCap)?;
        }
    }
    Ok(())
}

/// Signed coin change of applying `op` alone to the current state
///
/// `None` if the operation names a missing tower or a capped base track.
pub fn operation_income(state: &GameState, player: Player, op: &Operation) -> Option<i32> {
    income_with_count(state, player, op, state.tower_count(player)).map(|(income, _)| income)
}

/// Signed coin change of applying `ops` in order
///
/// The tower count used for build prices and destroy refunds follows the
/// batch: each build raises it, each destroyed Basic lowers it.
pub fn batch_income<'a, I>(state: &GameState, player: Player, ops: I) -> Option<i64>
where
    I: IntoIterator<Item = &'a Operation>,
{
    let mut count = state.tower_count(player);
    let mut total = 0i64;
    for op in ops {
        let (income, next_count) = income_with_count(state, player, op, count)?;
        total += i64::from(income);
        count = next_count;
    }
    Some(total)
}

/// Check if the player's coins cover every operation of `ops`
pub fn is_affordable<'a, I>(state: &GameState, player: Player, ops: I) -> bool
where
    I: IntoIterator<Item = &'a Operation>,
{
    batch_income(state, player, ops)
        .is_some_and(|income| income + i64::from(state.coins(player)) >= 0)
}

/// Income of `op` with `count` towers owned, plus the count afterwards
fn income_with_count(
    state: &GameState,
    player: Player,
    op: &Operation,
    count: usize,
) -> Option<(i32, usize)> {
    let result = match *op {
        Operation::BuildTower { .. } => (-build_tower_cost(count), count + 1),
        Operation::UpgradeTower { tower, to } => {
            state.tower(tower)?;
            (-upgrade_tower_cost(to), count)
        }
        Operation::DowngradeTower { tower } => match state.tower(tower)?.kind() {
            TowerKind::Basic => (destroy_tower_income(count), count.saturating_sub(1)),
            kind => (downgrade_tower_income(kind), count),
        },
        Operation::UseSuperWeapon { weapon, .. } => (-super_weapon_cost(weapon), count),
        Operation::UpgradeGenerationSpeed => {
            (-upgrade_base_cost(state.base(player).gen_speed_level)?, count)
        }
        Operation::UpgradeGeneratedAnt => (-upgrade_base_cost(state.base(player).ant_level)?, count),
    };
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Point;
    use crate::weapon::SuperWeaponKind;

    fn build(x: i32, y: i32) -> Operation {
        Operation::BuildTower { at: Point::new(x, y) }
    }

    #[test]
    fn test_build_prices_follow_batch() {
        let state = GameState::new(1);
        let batch = [build(5, 9), build(6, 9)];
        assert_eq!(batch_income(&state, Player::P0, &batch), Some(-45));
        // 50 coins cover 15 + 30 but not a third tower at 60
        assert!(validate(&state, Player::P0, &batch[..1], &batch[1]).is_ok());
        assert_eq!(
            validate(&state, Player::P0, &batch, &build(4, 3)),
            Err(Rejection::Unaffordable)
        );
    }

    #[test]
    fn test_collision_comes_first() {
        let state = GameState::new(1);
        let batch = [build(5, 9)];
        assert_eq!(
            validate(&state, Player::P0, &batch, &build(5, 9)),
            Err(Rejection::Collision)
        );
    }

    #[test]
    fn test_build_legality() {
        let mut state = GameState::new(1);
        assert_eq!(
            check_legal(&state, Player::P0, &build(13, 9)),
            Err(Rejection::NotHighland)
        );
        assert_eq!(
            check_legal(&state, Player::P0, &build(2, 9)),
            Err(Rejection::NotHighland)
        );
        state.place_tower(Player::P0, Point::new(5, 9), TowerKind::Basic);
        assert_eq!(
            check_legal(&state, Player::P0, &build(5, 9)),
            Err(Rejection::Occupied)
        );
    }

    #[test]
    fn test_tower_ownership_and_tree() {
        let mut state = GameState::new(1);
        let id = state.place_tower(Player::P1, Point::new(13, 9), TowerKind::Basic);
        let up = |to| Operation::UpgradeTower { tower: id, to };

        assert_eq!(check_legal(&state, Player::P0, &up(TowerKind::Heavy)), Err(Rejection::NotOwner));
        assert_eq!(
            check_legal(&state, Player::P1, &up(TowerKind::HeavyPlus)),
            Err(Rejection::IllegalUpgrade)
        );
        assert!(check_legal(&state, Player::P1, &up(TowerKind::Quick)).is_ok());
        assert_eq!(
            check_legal(&state, Player::P1, &Operation::DowngradeTower { tower: 99 }),
            Err(Rejection::UnknownTower)
        );
    }

    #[test]
    fn test_emp_blocks_tower_work() {
        let mut state = GameState::new(1);
        state.set_coins(Player::P1, 150);
        let id = state.place_tower(Player::P0, Point::new(5, 9), TowerKind::Basic);
        state.apply_operation(
            Player::P1,
            &Operation::UseSuperWeapon {
                weapon: SuperWeaponKind::EmpBlaster,
                at: Point::new(5, 9),
            },
        );

        assert_eq!(
            check_legal(&state, Player::P0, &Operation::DowngradeTower { tower: id }),
            Err(Rejection::EmpShielded)
        );
        assert_eq!(
            check_legal(&state, Player::P0, &build(6, 9)),
            Err(Rejection::EmpShielded)
        );
        // own EMP does not shield its owner's towers
        assert!(check_legal(&state, Player::P1, &build(13, 9)).is_ok());
    }

    #[test]
    fn test_weapon_cooldown_and_position() {
        let mut state = GameState::new(1);
        let storm = |x, y| Operation::UseSuperWeapon {
            weapon: SuperWeaponKind::LightningStorm,
            at: Point::new(x, y),
        };
        assert_eq!(check_legal(&state, Player::P0, &storm(0, 0)), Err(Rejection::InvalidPosition));
        assert!(check_legal(&state, Player::P0, &storm(9, 9)).is_ok());

        state.set_coins(Player::P0, 150);
        state.apply_operation(Player::P0, &storm(9, 9));
        assert_eq!(check_legal(&state, Player::P0, &storm(9, 9)), Err(Rejection::OnCooldown));
        assert!(check_legal(&state, Player::P1, &storm(9, 9)).is_ok());
    }

    #[test]
    fn test_destroy_refund_lowers_count() {
        let mut state = GameState::new(1);
        state.set_coins(Player::P0, 0);
        let id = state.place_tower(Player::P0, Point::new(5, 9), TowerKind::Basic);
        state.place_tower(Player::P0, Point::new(6, 9), TowerKind::Basic);
        // two towers: destroying refunds 0.8 * 30, the next build costs 15 * 2
        let batch = [Operation::DowngradeTower { tower: id }, build(4, 3)];
        assert_eq!(batch_income(&state, Player::P0, &batch), Some(24 - 30));
        assert!(!is_affordable(&state, Player::P0, &batch));
    }

    #[test]
    fn test_base_level_cap() {
        let mut state = GameState::new(1);
        state.set_coins(Player::P0, 1000);
        state.apply_operation(Player::P0, &Operation::UpgradeGeneratedAnt);
        state.apply_operation(Player::P0, &Operation::UpgradeGeneratedAnt);
        assert_eq!(
            check_legal(&state, Player::P0, &Operation::UpgradeGeneratedAnt),
            Err(Rejection::LevelCap)
        );
        assert!(check_legal(&state, Player::P0, &Operation::UpgradeGenerationSpeed).is_ok());
    }
}
