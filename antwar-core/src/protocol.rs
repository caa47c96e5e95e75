//! Text protocol spoken with the judge
//!
//! Input is a stream of whitespace-separated integers:
//!
//! ```text
//! init:      player seed
//! round:     round
//!            tower_count  (id player x y type cooldown) * tower_count
//!            ant_count    (id player x y hp level age state) * ant_count
//!            coins0 coins1
//!            base_hp0 base_hp1
//! operations: count (type args...) * count
//! ```
//!
//! Output is a batch of operations as text lines, prefixed by a 4-byte
//! big-endian length of everything that follows it.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use crate::ant::{AntId, AntState};
use crate::board::Point;
use crate::error::ProtocolError;
use crate::game::Player;
use crate::operation::Operation;
use crate::tower::{TowerId, TowerKind};
use crate::weapon::SuperWeaponKind;

/// First message of a game
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitInfo {
    pub player: Player,
    pub seed: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerRecord {
    pub id: TowerId,
    pub owner: Player,
    pub pos: Point,
    pub kind: TowerKind,
    pub cooldown: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AntRecord {
    pub id: AntId,
    pub owner: Player,
    pub pos: Point,
    pub hp: i32,
    pub level: u8,
    pub age: i32,
    pub state: AntState,
}

/// Authoritative snapshot sent at the start of each round
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundInfo {
    pub round: i32,
    pub towers: Vec<TowerRecord>,
    pub ants: Vec<AntRecord>,
    pub coins: [i32; 2],
    pub base_hp: [i32; 2],
}

// ============================================================================
// DECODING
// ============================================================================

/// Reads protocol messages from a buffered source
pub struct Decoder<R> {
    reader: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
        }
    }

    pub fn read_init_info(&mut self) -> Result<InitInfo, ProtocolError> {
        let player = self.next_player("player")?;
        let token = self.next_token("seed")?;
        let seed = token.parse().map_err(|_| ProtocolError::InvalidToken {
            field: "seed",
            token,
        })?;
        Ok(InitInfo { player, seed })
    }

    pub fn read_round_info(&mut self) -> Result<RoundInfo, ProtocolError> {
        let round = self.next_i32("round")?;

        let tower_count = self.next_count("tower count")?;
        let mut towers = Vec::with_capacity(tower_count);
        for _ in 0..tower_count {
            let id = self.next_i32("tower id")?;
            let owner = self.next_player("tower owner")?;
            let pos = self.next_point()?;
            let code = self.next_i64("tower type")?;
            let kind = TowerKind::from_code(code).ok_or(ProtocolError::UnknownTowerType(code))?;
            let cooldown = self.next_i32("tower cooldown")?;
            towers.push(TowerRecord {
                id,
                owner,
                pos,
                kind,
                cooldown,
            });
        }

        let ant_count = self.next_count("ant count")?;
        let mut ants = Vec::with_capacity(ant_count);
        for _ in 0..ant_count {
            let id = self.next_i32("ant id")?;
            let owner = self.next_player("ant owner")?;
            let pos = self.next_point()?;
            let hp = self.next_i32("ant hp")?;
            let level = self.next_i64("ant level")?;
            let level = u8::try_from(level)
                .ok()
                .filter(|&l| l <= 2)
                .ok_or(ProtocolError::OutOfRange {
                    field: "ant level",
                    value: level,
                })?;
            let age = self.next_i32("ant age")?;
            let code = self.next_i64("ant state")?;
            let state = AntState::from_code(code).ok_or(ProtocolError::UnknownAntState(code))?;
            ants.push(AntRecord {
                id,
                owner,
                pos,
                hp,
                level,
                age,
                state,
            });
        }

        let coins = [self.next_i32("coins")?, self.next_i32("coins")?];
        let base_hp = [self.next_i32("base hp")?, self.next_i32("base hp")?];
        Ok(RoundInfo {
            round,
            towers,
            ants,
            coins,
            base_hp,
        })
    }

    /// A counted batch of operations
    pub fn read_operations(&mut self) -> Result<Vec<Operation>, ProtocolError> {
        let count = self.next_count("operation count")?;
        let mut ops = Vec::with_capacity(count);
        for _ in 0..count {
            let code = self.next_i64("operation type")?;
            let arity = Operation::arity(code).ok_or(ProtocolError::UnknownOperation(code))?;
            let mut args = [0i64; 2];
            for arg in args.iter_mut().take(arity) {
                *arg = self.next_i64("operation argument")?;
            }
            ops.push(decode_operation(code, &args[..arity])?);
        }
        Ok(ops)
    }

    fn next_token(&mut self, field: &'static str) -> Result<String, ProtocolError> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(ProtocolError::UnexpectedEof(field));
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_owned));
        }
    }

    fn next_i64(&mut self, field: &'static str) -> Result<i64, ProtocolError> {
        let token = self.next_token(field)?;
        token
            .parse()
            .map_err(|_| ProtocolError::InvalidToken { field, token })
    }

    fn next_i32(&mut self, field: &'static str) -> Result<i32, ProtocolError> {
        let value = self.next_i64(field)?;
        i32::try_from(value).map_err(|_| ProtocolError::OutOfRange { field, value })
    }

    fn next_count(&mut self, field: &'static str) -> Result<usize, ProtocolError> {
        let value = self.next_i64(field)?;
        usize::try_from(value).map_err(|_| ProtocolError::OutOfRange { field, value })
    }

    fn next_player(&mut self, field: &'static str) -> Result<Player, ProtocolError> {
        Ok(Player::try_from(self.next_i64(field)?)?)
    }

    fn next_point(&mut self) -> Result<Point, ProtocolError> {
        Ok(Point::new(self.next_i32("x")?, self.next_i32("y")?))
    }
}

/// Build an operation from its wire code and arguments
pub fn decode_operation(code: i64, args: &[i64]) -> Result<Operation, ProtocolError> {
    let arg = |i: usize, field: &'static str| -> Result<i32, ProtocolError> {
        let value = args.get(i).copied().ok_or(ProtocolError::UnexpectedEof(field))?;
        i32::try_from(value).map_err(|_| ProtocolError::OutOfRange { field, value })
    };
    let point = || -> Result<Point, ProtocolError> { Ok(Point::new(arg(0, "x")?, arg(1, "y")?)) };

    let op = match code {
        11 => Operation::BuildTower { at: point()? },
        12 => {
            let to = args.get(1).copied().unwrap_or(-1);
            Operation::UpgradeTower {
                tower: arg(0, "tower id")?,
                to: TowerKind::from_code(to).ok_or(ProtocolError::UnknownTowerType(to))?,
            }
        }
        13 => Operation::DowngradeTower {
            tower: arg(0, "tower id")?,
        },
        21..=24 => {
            let weapon = SuperWeaponKind::from_index((code - 21) as usize)
                .ok_or(ProtocolError::UnknownSuperWeapon(code))?;
            Operation::UseSuperWeapon {
                weapon,
                at: point()?,
            }
        }
        31 => Operation::UpgradeGenerationSpeed,
        32 => Operation::UpgradeGeneratedAnt,
        _ => return Err(ProtocolError::UnknownOperation(code)),
    };
    Ok(op)
}

// ============================================================================
// ENCODING
// ============================================================================

/// Length-prefixed text form of a batch
pub fn encode_operations(ops: &[Operation]) -> Vec<u8> {
    let mut body = format!("{}\n", ops.len());
    for op in ops {
        body.push_str(&op.to_string());
        body.push('\n');
    }
    let mut out = Vec::with_capacity(4 + body.len());
    out.extend_from_slice(&(body.len() as u32).to_be_bytes());
    out.extend_from_slice(body.as_bytes());
    out
}

/// Write a batch and flush it
pub fn write_operations<W: Write>(out: &mut W, ops: &[Operation]) -> Result<(), ProtocolError> {
    out.write_all(&encode_operations(ops))?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::io::Cursor;

    const ROUND: &str = "7\n\
        2\n\
        0 0 5 9 0 1\n\
        1 1 13 9 22 0\n\
        1\n\
        4 1 12 9 25 1 3 4\n\
        41 38\n\
        50 49\n";

    #[test]
    fn test_read_init_info() {
        let mut decoder = Decoder::new(Cursor::new("1 281474976710655\n"));
        let info = decoder.read_init_info().unwrap();
        assert_eq!(info.player, Player::P1);
        assert_eq!(info.seed, (1 << 48) - 1);
    }

    #[test]
    fn test_read_round_info() {
        let mut decoder = Decoder::new(Cursor::new(ROUND));
        let info = decoder.read_round_info().unwrap();
        assert_eq!(info.round, 7);
        assert_eq!(info.towers.len(), 2);
        assert_eq!(info.towers[1].kind, TowerKind::Double);
        assert_eq!(info.towers[0].cooldown, 1);
        assert_eq!(
            info.ants[0],
            AntRecord {
                id: 4,
                owner: Player::P1,
                pos: Point::new(12, 9),
                hp: 25,
                level: 1,
                age: 3,
                state: AntState::Frozen,
            }
        );
        assert_eq!(info.coins, [41, 38]);
        assert_eq!(info.base_hp, [50, 49]);
    }

    #[test]
    fn test_read_operations_by_arity() {
        let text = "4\n11 5 9\n13 2\n31\n23 8 9\n";
        let mut decoder = Decoder::new(Cursor::new(text));
        let ops = decoder.read_operations().unwrap();
        assert_eq!(
            ops,
            vec![
                Operation::BuildTower { at: Point::new(5, 9) },
                Operation::DowngradeTower { tower: 2 },
                Operation::UpgradeGenerationSpeed,
                Operation::UseSuperWeapon {
                    weapon: SuperWeaponKind::Deflector,
                    at: Point::new(8, 9),
                },
            ]
        );
    }

    #[test]
    fn test_decode_errors() {
        let mut decoder = Decoder::new(Cursor::new("1\n99 1 2\n"));
        assert!(matches!(
            decoder.read_operations(),
            Err(ProtocolError::UnknownOperation(99))
        ));

        let mut decoder = Decoder::new(Cursor::new("3\n1\n0 0 5 9 7 0\n"));
        assert!(matches!(
            decoder.read_round_info(),
            Err(ProtocolError::UnknownTowerType(7))
        ));

        let mut decoder = Decoder::new(Cursor::new("3\n0\n0\n50"));
        assert!(matches!(
            decoder.read_round_info(),
            Err(ProtocolError::UnexpectedEof("coins"))
        ));

        let mut decoder = Decoder::new(Cursor::new("1\n12 0 7\n"));
        assert!(matches!(
            decoder.read_operations(),
            Err(ProtocolError::UnknownTowerType(7))
        ));

        let mut decoder = Decoder::new(Cursor::new("2 5"));
        assert!(matches!(
            decoder.read_init_info(),
            Err(ProtocolError::Engine(EngineError::InvalidPlayer(2)))
        ));

        let mut decoder = Decoder::new(Cursor::new("x"));
        assert!(matches!(
            decoder.read_operations(),
            Err(ProtocolError::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_encode_header_counts_body() {
        let ops = [
            Operation::BuildTower { at: Point::new(5, 9) },
            Operation::UpgradeGeneratedAnt,
        ];
        let bytes = encode_operations(&ops);
        let body = "2\n11 5 9\n32\n";
        assert_eq!(&bytes[..4], &(body.len() as u32).to_be_bytes());
        assert_eq!(&bytes[4..], body.as_bytes());

        let empty = encode_operations(&[]);
        assert_eq!(empty, vec![0, 0, 0, 2, b'0', b'\n']);
    }

    #[test]
    fn test_written_batch_reads_back() {
        let ops = vec![
            Operation::UpgradeTower { tower: 3, to: TowerKind::Mortar },
            Operation::UseSuperWeapon {
                weapon: SuperWeaponKind::LightningStorm,
                at: Point::new(10, 9),
            },
        ];
        let mut out = Vec::new();
        write_operations(&mut out, &ops).unwrap();
        let mut decoder = Decoder::new(Cursor::new(&out[4..]));
        assert_eq!(decoder.read_operations().unwrap(), ops);
    }
}
