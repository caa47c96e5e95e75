//! Error types

use crate::ant::AntId;
use crate::board::Point;

/// Internal-consistency faults raised while advancing the game
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("ant {ant}: trail ends at {actual} but the ant stands at {expected}")]
    TrailMismatch {
        ant: AntId,
        expected: Point,
        actual: Point,
    },

    #[error("ant {ant}: reported move from {from} to {to} is not a single step")]
    NonAdjacentStep { ant: AntId, from: Point, to: Point },

    #[error("invalid player id: {0}")]
    InvalidPlayer(i64),
}

/// Faults while decoding or encoding the text protocol
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected end of input while reading {0}")]
    UnexpectedEof(&'static str),

    #[error("expected an integer for {field}, got {token:?}")]
    InvalidToken { field: &'static str, token: String },

    #[error("unknown operation code: {0}")]
    UnknownOperation(i64),

    #[error("unknown tower type: {0}")]
    UnknownTowerType(i64),

    #[error("unknown ant state: {0}")]
    UnknownAntState(i64),

    #[error("unknown super weapon: {0}")]
    UnknownSuperWeapon(i64),

    #[error("value {value} out of range for {field}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Why the gate refused an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("conflicts with an operation already in the batch")]
    Collision,

    #[error("no such tower")]
    UnknownTower,

    #[error("tower belongs to the other player")]
    NotOwner,

    #[error("not on the player's highland")]
    NotHighland,

    #[error("cell already has a tower")]
    Occupied,

    #[error("covered by an enemy EMP")]
    EmpShielded,

    #[error("not a valid upgrade for this tower")]
    IllegalUpgrade,

    #[error("not a valid board position")]
    InvalidPosition,

    #[error("super weapon still cooling down")]
    OnCooldown,

    #[error("base track already at max level")]
    LevelCap,

    #[error("not enough coins")]
    Unaffordable,
}
