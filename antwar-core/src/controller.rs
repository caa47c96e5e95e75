//! Live-game bookkeeping for one seat
//!
//! The judge owns the real game. A [`Controller`] keeps a mirror of it in
//! step with the round snapshots, queues this seat's operations through the
//! gate, and replays the opponent's operations as received.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use tracing::{debug, info};

use crate::ant::Ant;
use crate::error::{EngineError, ProtocolError, Rejection};
use crate::game::{GameState, Player};
use crate::gate;
use crate::operation::Operation;
use crate::protocol::{self, Decoder, InitInfo, RoundInfo};
use crate::simulate::Simulator;
use crate::tower::Tower;

pub struct Controller {
    player: Player,
    state: GameState,
    self_operations: Vec<Operation>,
    opponent_operations: Vec<Operation>,
}

impl Controller {
    pub fn new(player: Player, seed: u64) -> Self {
        info!(%player, seed, "controller started");
        Self {
            player,
            state: GameState::new(seed),
            self_operations: Vec::new(),
            opponent_operations: Vec::new(),
        }
    }

    pub fn from_init(init: InitInfo) -> Self {
        Self::new(init.player, init.seed)
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn self_operations(&self) -> &[Operation] {
        &self.self_operations
    }

    pub fn opponent_operations(&self) -> &[Operation] {
        &self.opponent_operations
    }

    /// Independent copy for look-ahead
    pub fn simulator(&self) -> Simulator {
        Simulator::new(&self.state)
    }

    // ========================================================================
    // SNAPSHOTS
    // ========================================================================

    /// Bring the mirror in line with the judge's snapshot
    ///
    /// Known ants extend their trail by the step they took; new ants start a
    /// trail at their current cell. Nothing changes if any ant moved by more
    /// than one cell or a merged trail does not end where its ant stands.
    pub fn apply_round_info(&mut self, snapshot: &RoundInfo) -> Result<(), EngineError> {
        let mut ants = BTreeMap::new();
        for record in &snapshot.ants {
            let ant = match self.state.ants.get(&record.id) {
                Some(known) => {
                    let mut ant = known.clone();
                    if ant.pos != record.pos {
                        ant.step_to(record.pos)?;
                    }
                    ant.hp = record.hp;
                    ant.level = record.level;
                    ant.age = record.age;
                    ant.sync_state(record.state);
                    ant
                }
                None => Ant::with_state(
                    record.id,
                    record.owner,
                    record.pos,
                    record.hp,
                    record.level,
                    record.age,
                    record.state,
                ),
            };
            ants.insert(record.id, ant);
        }
        for ant in ants.values() {
            ant.trace()?;
        }

        let towers: BTreeMap<_, _> = snapshot
            .towers
            .iter()
            .map(|r| (r.id, Tower::with_cooldown(r.id, r.owner, r.pos, r.kind, r.cooldown)))
            .collect();

        let state = &mut self.state;
        if let Some(&last) = towers.keys().next_back() {
            state.next_tower_id = last + 1;
        }
        if let Some(&last) = ants.keys().next_back() {
            state.next_ant_id = last + 1;
        }
        state.towers = towers;
        state.ants = ants;

        state.update_pheromone()?;
        state.remove_finished_ants();
        state.coins = snapshot.coins;
        for (base, hp) in state.bases.iter_mut().zip(snapshot.base_hp) {
            base.hp = hp;
        }
        state.round = snapshot.round;
        state.count_down_weapon_cooldowns();

        self.self_operations.clear();
        self.opponent_operations.clear();
        debug!(round = snapshot.round, ants = state.ants.len(), towers = state.towers.len(), "snapshot applied");
        Ok(())
    }

    /// Read one snapshot from `decoder` and apply it
    pub fn sync<R: BufRead>(&mut self, decoder: &mut Decoder<R>) -> Result<(), ProtocolError> {
        let snapshot = decoder.read_round_info()?;
        self.apply_round_info(&snapshot)?;
        Ok(())
    }

    // ========================================================================
    // OWN OPERATIONS
    // ========================================================================

    pub fn try_append_self_operation(&mut self, op: Operation) -> Result<(), Rejection> {
        gate::validate(&self.state, self.player, &self.self_operations, &op)?;
        self.self_operations.push(op);
        Ok(())
    }

    /// Queue `op` for this seat; false if the gate refused it
    pub fn append_self_operation(&mut self, op: Operation) -> bool {
        match self.try_append_self_operation(op) {
            Ok(()) => true,
            Err(reason) => {
                debug!(player = %self.player, %op, %reason, "operation rejected");
                false
            }
        }
    }

    pub fn apply_self_operations(&mut self) {
        self.state.apply_turn(self.player, &self.self_operations);
    }

    pub fn encode_self_operations(&self) -> Vec<u8> {
        protocol::encode_operations(&self.self_operations)
    }

    pub fn send_self_operations<W: Write>(&self, out: &mut W) -> Result<(), ProtocolError> {
        protocol::write_operations(out, &self.self_operations)
    }

    // ========================================================================
    // OPPONENT OPERATIONS
    // ========================================================================

    /// Record the opponent's batch as the judge accepted it
    pub fn set_opponent_operations(&mut self, ops: Vec<Operation>) {
        self.opponent_operations = ops;
    }

    pub fn read_opponent_operations<R: BufRead>(
        &mut self,
        decoder: &mut Decoder<R>,
    ) -> Result<(), ProtocolError> {
        self.opponent_operations = decoder.read_operations()?;
        Ok(())
    }

    /// Replay the opponent's batch without checking it
    pub fn apply_opponent_operations(&mut self) {
        self.state
            .apply_turn(self.player.opponent(), &self.opponent_operations);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ant::AntState;
    use crate::board::Point;
    use crate::protocol::{AntRecord, TowerRecord};
    use crate::tower::TowerKind;

    fn ant_record(id: i32, pos: Point, state: AntState) -> AntRecord {
        AntRecord {
            id,
            owner: Player::P0,
            pos,
            hp: 10,
            level: 0,
            age: 1,
            state,
        }
    }

    fn snapshot(round: i32, ants: Vec<AntRecord>) -> RoundInfo {
        RoundInfo {
            round,
            towers: Vec::new(),
            ants,
            coins: [51, 51],
            base_hp: [50, 50],
        }
    }

    #[test]
    fn test_new_ants_start_trail_at_their_cell() {
        let mut ctl = Controller::new(Player::P1, 3);
        let at = Point::new(3, 9);
        ctl.apply_round_info(&snapshot(1, vec![ant_record(0, at, AntState::Alive)]))
            .unwrap();
        let ant = ctl.state().ant(0).unwrap();
        assert_eq!(ant.origin(), at);
        assert!(ant.trail().is_empty());
        assert_eq!(ctl.state().next_ant_id(), 1);
        assert_eq!(ctl.state().coins(Player::P0), 51);
        assert_eq!(ctl.state().round(), 1);
    }

    #[test]
    fn test_known_ants_extend_trail() {
        let mut ctl = Controller::new(Player::P1, 3);
        let a = Point::new(2, 9);
        let b = Point::new(3, 9);
        ctl.apply_round_info(&snapshot(1, vec![ant_record(0, a, AntState::Alive)]))
            .unwrap();
        ctl.apply_round_info(&snapshot(2, vec![ant_record(0, b, AntState::Alive)]))
            .unwrap();
        let ant = ctl.state().ant(0).unwrap();
        assert_eq!(ant.trail(), &[a.direction_to(b).unwrap()]);
        assert_eq!(ant.trace().unwrap(), vec![a, b]);
    }

    #[test]
    fn test_jump_is_a_desync() {
        let mut ctl = Controller::new(Player::P1, 3);
        ctl.apply_round_info(&snapshot(1, vec![ant_record(0, Point::new(2, 9), AntState::Alive)]))
            .unwrap();
        let before = ctl.state().clone();
        let err = ctl
            .apply_round_info(&snapshot(2, vec![ant_record(0, Point::new(6, 9), AntState::Alive)]))
            .unwrap_err();
        assert!(matches!(err, EngineError::NonAdjacentStep { ant: 0, .. }));
        assert_eq!(ctl.state(), &before);
    }

    #[test]
    fn test_broken_trail_leaves_mirror_untouched() {
        let mut ctl = Controller::new(Player::P1, 3);
        let a = Point::new(2, 9);
        let b = Point::new(3, 9);
        ctl.apply_round_info(&snapshot(1, vec![ant_record(0, a, AntState::Alive)]))
            .unwrap();
        // moved without recording the step
        ctl.state.ant_mut(0).unwrap().pos = b;
        let before = ctl.state().clone();

        let mut info = snapshot(2, vec![ant_record(0, b, AntState::Fail)]);
        info.towers.push(TowerRecord {
            id: 0,
            owner: Player::P0,
            pos: Point::new(5, 9),
            kind: TowerKind::Basic,
            cooldown: 2,
        });
        let err = ctl.apply_round_info(&info).unwrap_err();
        assert!(matches!(err, EngineError::TrailMismatch { ant: 0, .. }));
        assert_eq!(ctl.state(), &before);
        assert!(ctl.state().tower(0).is_none());
    }

    #[test]
    fn test_terminal_ants_deposit_and_leave() {
        let mut ctl = Controller::new(Player::P1, 3);
        let a = Point::new(2, 9);
        let b = Point::new(3, 9);
        ctl.apply_round_info(&snapshot(1, vec![ant_record(0, a, AntState::Alive)]))
            .unwrap();
        let before = ctl.state().pheromone().get(Player::P0, b);
        ctl.apply_round_info(&snapshot(2, vec![ant_record(0, b, AntState::Fail)]))
            .unwrap();
        assert!(ctl.state().ant(0).is_none());
        let after = ctl.state().pheromone().get(Player::P0, b);
        assert!((after - (0.97 * before + 0.3 - 5.0).max(0.0)).abs() < 1e-9);
    }

    #[test]
    fn test_towers_replaced_from_snapshot() {
        let mut ctl = Controller::new(Player::P0, 3);
        let mut info = snapshot(5, Vec::new());
        info.towers.push(TowerRecord {
            id: 4,
            owner: Player::P0,
            pos: Point::new(5, 9),
            kind: TowerKind::Heavy,
            cooldown: 1,
        });
        ctl.apply_round_info(&info).unwrap();
        let tower = ctl.state().tower(4).unwrap();
        assert_eq!(tower.kind(), TowerKind::Heavy);
        assert_eq!(tower.cooldown, 1);
        assert_eq!(ctl.state().next_tower_id(), 5);
    }

    #[test]
    fn test_own_batch_is_gated_and_cleared() {
        let mut ctl = Controller::new(Player::P0, 3);
        assert!(ctl.append_self_operation(Operation::BuildTower { at: Point::new(5, 9) }));
        assert!(!ctl.append_self_operation(Operation::BuildTower { at: Point::new(13, 9) }));
        assert_eq!(ctl.self_operations().len(), 1);
        let bytes = ctl.encode_self_operations();
        assert_eq!(&bytes[4..], b"1\n11 5 9\n");

        ctl.apply_self_operations();
        assert_eq!(ctl.state().coins(Player::P0), 35);
        ctl.apply_round_info(&snapshot(1, Vec::new())).unwrap();
        assert!(ctl.self_operations().is_empty());
    }

    #[test]
    fn test_opponent_batch_is_trusted() {
        let mut ctl = Controller::new(Player::P0, 3);
        // more than the opponent could afford; applied anyway
        ctl.set_opponent_operations(vec![
            Operation::BuildTower { at: Point::new(13, 9) },
            Operation::BuildTower { at: Point::new(12, 7) },
            Operation::BuildTower { at: Point::new(14, 2) },
        ]);
        ctl.apply_opponent_operations();
        assert_eq!(ctl.state().tower_count(Player::P1), 3);
        assert_eq!(ctl.state().coins(Player::P1), 50 - 15 - 30 - 60);
    }
}
