//! Hex board geometry with offset coordinates
//!
//! Points are `(x, y)` pairs on a 19x19 array where every column `y` is shifted
//! by half a cell depending on its parity. Only the cells marked in
//! [`MAP_PROPERTY`] belong to the board.

use serde::{Deserialize, Serialize};

use crate::game::Player;

/// Length of one edge of the hexagonal board
pub const EDGE: i32 = 10;

/// Side length of the backing array (not every point inside is on the board)
pub const MAP_SIZE: usize = (2 * EDGE - 1) as usize;

/// Terrain class of a board point
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Void,
    Path,
    Barrier,
    Highland(Player),
}

impl Terrain {
    const fn from_code(code: i8) -> Self {
        match code {
            0 => Terrain::Path,
            1 => Terrain::Barrier,
            2 => Terrain::Highland(Player::P0),
            3 => Terrain::Highland(Player::P1),
            _ => Terrain::Void,
        }
    }
}

/// Raw terrain codes: -1 void, 0 path, 1 barrier, 2/3 highland of player 0/1
#[rustfmt::skip]
const MAP_PROPERTY: [[i8; MAP_SIZE]; MAP_SIZE] = [
    [-1, -1, -1, -1, -1, -1, -1, -1, 0, 1, 0, -1, -1, -1, -1, -1, -1, -1, -1],
    [-1, -1, -1, -1, -1, -1, 0, 0, 1, 0, 1, 0, 0, -1, -1, -1, -1, -1, -1],
    [-1, -1, -1, -1, 0, 0, 0, 1, 1, 0, 1, 1, 0, 0, 0, -1, -1, -1, -1],
    [-1, -1, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0, 1, 1, 0, 0, 0, -1, -1],
    [0, 0, 2, 2, 0, 1, 0, 0, 0, 2, 0, 0, 0, 1, 0, 2, 2, 0, 0],
    [0, 0, 0, 2, 0, 0, 2, 2, 0, 2, 0, 2, 2, 0, 0, 2, 0, 0, 0],
    [0, 2, 2, 0, 2, 0, 0, 2, 0, 2, 0, 2, 0, 0, 2, 0, 2, 2, 0],
    [0, 2, 0, 0, 0, 2, 0, 0, 2, 0, 2, 0, 0, 2, 0, 0, 0, 2, 0],
    [0, 0, 2, 0, 2, 0, 0, 2, 0, 0, 0, 2, 0, 0, 2, 0, 2, 0, 0],
    [0, 1, 3, 0, 3, 1, 0, 1, 0, 1, 0, 1, 0, 1, 3, 0, 3, 1, 0],
    [0, 0, 0, 0, 0, 0, 0, 3, 3, 0, 3, 3, 0, 0, 0, 0, 0, 0, 0],
    [0, 3, 3, 0, 3, 3, 0, 0, 0, 0, 0, 0, 0, 3, 3, 0, 3, 3, 0],
    [0, 3, 0, 0, 0, 0, 3, 3, 0, 3, 0, 3, 3, 0, 0, 0, 0, 3, 0],
    [0, 0, 3, 3, 0, 0, 0, 3, 0, 3, 0, 3, 0, 0, 0, 3, 3, 0, 0],
    [-1, 0, 0, 3, 0, 1, 1, 0, 0, 3, 0, 0, 1, 1, 0, 3, 0, 0, -1],
    [-1, -1, -1, 0, 0, 1, 0, 0, 1, 0, 1, 0, 0, 1, 0, 0, -1, -1, -1],
    [-1, -1, -1, -1, -1, 0, 0, 1, 1, 0, 1, 1, 0, 0, -1, -1, -1, -1, -1],
    [-1, -1, -1, -1, -1, -1, -1, 0, 0, 0, 0, 0, -1, -1, -1, -1, -1, -1, -1],
    [-1, -1, -1, -1, -1, -1, -1, -1, -1, 1, -1, -1, -1, -1, -1, -1, -1, -1, -1],
];

/// Neighbor offsets (dx, dy), indexed by `y % 2` then direction (0-5)
///
/// Direction `d` and `(d + 3) % 6` are opposite for both parities.
pub const OFFSETS: [[(i32, i32); 6]; 2] = [
    [(0, 1), (-1, 0), (0, -1), (1, -1), (1, 0), (1, 1)],
    [(-1, 1), (-1, 0), (-1, -1), (0, -1), (1, 0), (0, 1)],
];

/// Index of a movement direction (0-5)
pub type Direction = u8;

/// Direction pointing back the way `dir` came
pub fn reverse(dir: Direction) -> Direction {
    (dir + 3) % 6
}

/// Offset board coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Terrain at this point (`Void` outside the array)
    pub fn terrain(&self) -> Terrain {
        if !self.in_bounds() {
            return Terrain::Void;
        }
        Terrain::from_code(MAP_PROPERTY[self.x as usize][self.y as usize])
    }

    fn in_bounds(&self) -> bool {
        (0..MAP_SIZE as i32).contains(&self.x) && (0..MAP_SIZE as i32).contains(&self.y)
    }

    /// Check if this point is on the board
    pub fn is_valid(&self) -> bool {
        self.terrain() != Terrain::Void
    }

    /// Check if ants can walk here
    pub fn is_path(&self) -> bool {
        self.terrain() == Terrain::Path
    }

    /// Check if `player` may build here
    pub fn is_highland(&self, player: Player) -> bool {
        self.terrain() == Terrain::Highland(player)
    }

    fn parity(&self) -> usize {
        self.y.rem_euclid(2) as usize
    }

    /// Hex distance between two points (not Euclidean)
    pub fn distance_to(&self, other: Point) -> i32 {
        let dy = (self.y - other.y).abs();
        let dx = (self.x - other.x).abs();
        let shift = if dy % 2 == 1 {
            let odd = self.y.rem_euclid(2);
            // The half-cell shift of the starting column only helps in one direction.
            let correction = if self.x > other.x { odd } else { 1 - odd };
            dy / 2 + correction
        } else {
            dy / 2
        };
        (dx - shift).max(0) + dy
    }

    /// Check if `other` lies within `range` of this point
    pub fn is_within(&self, other: Point, range: i32) -> bool {
        self.distance_to(other) <= range
    }

    /// Get neighbor in direction (0-5)
    pub fn neighbor(&self, direction: Direction) -> Point {
        let (dx, dy) = OFFSETS[self.parity()][direction as usize % 6];
        Point::new(self.x + dx, self.y + dy)
    }

    /// Direction leading from this point to an adjacent `other`
    pub fn direction_to(&self, other: Point) -> Option<Direction> {
        let delta = (other.x - self.x, other.y - self.y);
        OFFSETS[self.parity()]
            .iter()
            .position(|&offset| offset == delta)
            .map(|i| i as Direction)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Iterate every point on the board, row by row
pub fn all_points() -> impl Iterator<Item = Point> {
    (0..MAP_SIZE as i32)
        .flat_map(|x| (0..MAP_SIZE as i32).map(move |y| Point::new(x, y)))
        .filter(Point::is_valid)
}
