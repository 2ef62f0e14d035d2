//! Seeded, reproducible random draws for ignition decisions
//!
//! Every ignition candidate draws from its own PCG32 substream keyed by
//! `(seed, step, cell index)`. The seed and step select the generator state and
//! the cell index selects the PCG stream (increment); the first output of that
//! keyed generator then seeds the cell's generator, which breaks the linear
//! relation between adjacent PCG streams. A cell's draw never depends on which
//! cells were visited before it, so sequential, tiled and parallel sweeps make
//! bit-identical decisions.

use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg32;

/// Root of all random draws in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RngStream {
    seed: u32,
}

impl RngStream {
    /// Create a stream root from a seed
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Seed this stream was created with
    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }

    /// Independent substream for the cell at `index` during `step`.
    #[inline]
    #[must_use]
    pub fn substream(&self, step: u64, index: usize) -> CellRng {
        let state = (u64::from(self.seed) << 32) ^ step;
        let key = Pcg32::new(state, index as u64).next_u64();
        CellRng(Pcg32::seed_from_u64(key))
    }
}

/// Generator handed to the transition rule for one cell in one step.
#[derive(Debug, Clone)]
pub struct CellRng(Pcg32);

impl CellRng {
    /// Uniform draw in `[0, 1)`
    #[inline]
    pub fn draw(&mut self) -> f32 {
        self.0.random::<f32>()
    }
}
