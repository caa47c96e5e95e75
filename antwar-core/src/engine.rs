//! Round resolution
//!
//! One call to [`GameState::advance_round`] runs the fixed phase order:
//! combat, movement, pheromone update, cleanup, spawning, income, then the
//! round counter and super weapon cooldowns.

use tracing::{debug, trace};

use crate::ant::{Ant, AntState, AGE_LIMIT};
use crate::base::BASE_POSITIONS;
use crate::board::{reverse, Direction, Point};
use crate::economy::BASIC_INCOME;
use crate::error::EngineError;
use crate::game::{GameResult, GameState, Player};
use crate::pheromone::PheromoneField;
use crate::weapon::{deflector_covers, emp_covers};

/// Pheromone weight by change in distance to the target: closer, same, farther
const ETA: [f64; 3] = [1.25, 1.00, 0.75];

/// Direction an alive ant takes this round, `None` if it is boxed in
///
/// Candidates are the six neighbors minus the way back and anything that is
/// not a path cell. The highest `weight * pheromone` wins; ties go to the
/// higher raw pheromone, then to the lowest direction index.
pub fn next_move(pheromone: &PheromoneField, ant: &Ant) -> Option<Direction> {
    let target = BASE_POSITIONS[ant.owner.opponent().index()];
    let here = ant.pos.distance_to(target);
    let back = ant.last_direction().map(reverse);

    let mut best: Option<(f64, f64, Direction)> = None;
    for dir in 0..6 {
        if Some(dir) == back {
            continue;
        }
        let next = ant.pos.neighbor(dir);
        if !next.is_path() {
            continue;
        }
        let delta = (next.distance_to(target) - here).clamp(-1, 1);
        let raw = pheromone.get(ant.owner, next);
        let score = ETA[(delta + 1) as usize] * raw;
        let better = match best {
            None => true,
            Some((best_score, best_raw, _)) => {
                score > best_score || (score == best_score && raw > best_raw)
            }
        };
        if better {
            best = Some((score, raw, dir));
        }
    }
    best.map(|(_, _, dir)| dir)
}

impl GameState {
    /// Resolve one round with `max_round` as the limit
    ///
    /// Returns the result after the round. When the game ends by a base
    /// falling, the remaining phases are skipped. Trails are checked before
    /// anything changes, so an error leaves the state untouched.
    pub fn advance_round(&mut self, max_round: i32) -> Result<GameResult, EngineError> {
        if self.round >= max_round {
            return Ok(self.judge_by_base_hp());
        }
        self.verify_trails()?;

        self.resolve_combat();
        let result = self.move_ants();
        if result.is_over() {
            debug!(round = self.round, ?result, "base destroyed");
            return Ok(result);
        }
        self.update_pheromone()?;
        self.remove_finished_ants();
        self.spawn_ants();
        for coins in &mut self.coins {
            *coins += BASIC_INCOME;
        }
        self.round += 1;
        self.count_down_weapon_cooldowns();
        trace!(round = self.round, ants = self.ants.len(), towers = self.towers.len(), "round resolved");
        Ok(GameResult::Running)
    }

    /// Higher base HP wins at the round limit
    pub fn judge_by_base_hp(&self) -> GameResult {
        let [p0, p1] = [&self.bases[0], &self.bases[1]];
        match p0.hp.cmp(&p1.hp) {
            std::cmp::Ordering::Greater => GameResult::Player0Wins,
            std::cmp::Ordering::Less => GameResult::Player1Wins,
            std::cmp::Ordering::Equal => GameResult::Undecided,
        }
    }

    pub(crate) fn verify_trails(&self) -> Result<(), EngineError> {
        self.ants.values().try_for_each(|ant| ant.trace().map(|_| ()))
    }

    // ========================================================================
    // PHASES
    // ========================================================================

    /// Every tower not under an enemy EMP attacks once, in id order
    pub(crate) fn resolve_combat(&mut self) {
        for ant in self.ants.values_mut() {
            ant.deflector = deflector_covers(&self.super_weapons, ant.owner, ant.pos);
        }

        for tower in self.towers.values_mut() {
            if emp_covers(&self.super_weapons, tower.owner, tower.pos) {
                continue;
            }
            for id in tower.attack(&mut self.ants) {
                let Some(ant) = self.ants.get(&id) else {
                    continue;
                };
                if !ant.is_alive() {
                    trace!(tower = tower.id, ant = id, "ant killed");
                    self.coins[tower.owner.index()] += ant.reward();
                }
            }
        }

        for ant in self.ants.values_mut() {
            ant.deflector = false;
        }
    }

    /// Age, retire, move and land ants; returns a win if a base falls
    pub(crate) fn move_ants(&mut self) -> GameResult {
        for ant in self.ants.values_mut() {
            ant.age += 1;
            if !ant.is_alive() {
                continue;
            }
            if ant.age > AGE_LIMIT {
                ant.retire();
            }
            if ant.state() == AntState::Alive {
                if let Some(dir) = next_move(&self.pheromone, ant) {
                    ant.step(dir);
                }
            }
            let enemy = &mut self.bases[ant.owner.opponent().index()];
            if ant.is_alive() && ant.pos == enemy.pos {
                ant.arrive();
                enemy.hp -= 1;
                if enemy.is_destroyed() {
                    return GameResult::win_for(ant.owner);
                }
            }
            ant.thaw();
        }
        GameResult::Running
    }

    /// Decay both fields, then deposit along the trail of every finished ant
    pub(crate) fn update_pheromone(&mut self) -> Result<(), EngineError> {
        let deposits = self
            .ants
            .values()
            .filter(|ant| !ant.is_alive())
            .map(|ant| Ok((ant.owner, ant.trace()?, ant.state().pheromone_delta())))
            .collect::<Result<Vec<(Player, Vec<Point>, f64)>, EngineError>>()?;

        self.pheromone.attenuate();
        for (owner, cells, delta) in deposits {
            self.pheromone.deposit(owner, &cells, delta);
        }
        Ok(())
    }

    pub(crate) fn remove_finished_ants(&mut self) {
        self.ants.retain(|_, ant| ant.is_alive());
    }

    /// Each base whose cycle divides the round spawns one ant
    pub(crate) fn spawn_ants(&mut self) {
        for base in &self.bases {
            if let Some(ant) = base.spawn(self.next_ant_id, self.round) {
                trace!(ant = ant.id, owner = base.owner.index(), "ant spawned");
                self.ants.insert(ant.id, ant);
                self.next_ant_id += 1;
            }
        }
    }
}
