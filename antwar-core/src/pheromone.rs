//! Per-player pheromone field and its seeded initialization

use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::board::{Point, MAP_SIZE};
use crate::game::Player;

/// Value every cell decays toward
pub const PHEROMONE_INIT: f64 = 10.0;

/// Floor applied after a deposit
pub const PHEROMONE_MIN: f64 = 0.0;

/// Share of the current value kept each round
pub const ATTENUATING_RATIO: f64 = 0.97;

const CELLS: usize = MAP_SIZE * MAP_SIZE;

/// 48-bit multiplicative linear congruential generator
#[derive(Clone, Debug)]
pub struct Lcg48 {
    state: u64,
}

impl Lcg48 {
    const MULTIPLIER: u64 = 25_214_903_917;
    const MASK: u64 = (1 << 48) - 1;

    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }
}

impl RngCore for Lcg48 {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    /// Next 48-bit state
    fn next_u64(&mut self) -> u64 {
        self.state = Self::MULTIPLIER.wrapping_mul(self.state) & Self::MASK;
        self.state
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Lcg48 {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state)
    }
}

/// Pheromone of both players at every array cell
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PheromoneField {
    values: Vec<f64>,
}

impl PheromoneField {
    /// Field seeded the way the arbiter does it
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(&mut Lcg48::new(seed))
    }

    /// Fill cells player-major, then by x, then by y, each in `[8, 12)` for 48-bit draws
    pub fn from_rng<R: RngCore>(rng: &mut R) -> Self {
        let scale = 2f64.powi(-46);
        let values = (0..2 * CELLS)
            .map(|_| (rng.next_u64() & Lcg48::MASK) as f64 * scale + 8.0)
            .collect();
        Self { values }
    }

    fn index(player: Player, p: Point) -> Option<usize> {
        let in_range = |v: i32| (0..MAP_SIZE as i32).contains(&v);
        (in_range(p.x) && in_range(p.y))
            .then(|| player.index() * CELLS + p.x as usize * MAP_SIZE + p.y as usize)
    }

    /// Pheromone of `player` at `p` (0 outside the array)
    pub fn get(&self, player: Player, p: Point) -> f64 {
        Self::index(player, p).map_or(0.0, |i| self.values[i])
    }

    /// Decay every cell of both players toward the baseline
    pub fn attenuate(&mut self) {
        for v in &mut self.values {
            *v = ATTENUATING_RATIO * *v + (1.0 - ATTENUATING_RATIO) * PHEROMONE_INIT;
        }
    }

    /// Add `delta` once at each distinct cell of `cells`, flooring at the minimum
    pub fn deposit(&mut self, player: Player, cells: &[Point], delta: f64) {
        let mut visited = rustc_hash::FxHashSet::default();
        for &p in cells {
            if !visited.insert(p) {
                continue;
            }
            if let Some(i) = Self::index(player, p) {
                self.values[i] = (self.values[i] + delta).max(PHEROMONE_MIN);
            }
        }
    }

    /// One row of `player`'s grid
    pub fn row(&self, player: Player, x: usize) -> &[f64] {
        let start = player.index() * CELLS + x * MAP_SIZE;
        &self.values[start..start + MAP_SIZE]
    }
}
