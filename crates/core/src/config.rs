//! Run configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Parameters of one simulation run.
///
/// Deserializes with defaults for every missing field, so a config file only
/// needs to name what it changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Horizon `h`: total number of steps
    pub horizon: u64,
    /// Snapshot cadence `s`: dump every `s` completed steps
    pub snapshot_every: u64,
    /// RNG seed
    pub seed: u32,
    /// Cell side length `L` in meters
    pub cell_size: f32,
    /// Time step `tau`
    pub tau: f32,
    /// Extinguish/ignition threshold `theta`
    pub theta: f32,
    /// Base spread rate `k0`
    pub k0: f32,
    /// Wind influence `k1`
    pub k1: f32,
    /// Slope influence `k2`
    pub k2: f32,
    /// Compute each generation with rayon row blocks
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon: 100,
            snapshot_every: 10,
            seed: 0,
            cell_size: 10.0,
            tau: 1.0,
            theta: 0.0,
            k0: 0.3,
            k1: 0.1,
            k2: 1.0,
            parallel: false,
        }
    }
}

impl SimulationConfig {
    /// Check every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.snapshot_every == 0 {
            return Err(ConfigError::ZeroSnapshotCadence);
        }

        for (name, value) in [
            ("cell_size", self.cell_size),
            ("tau", self.tau),
            ("theta", self.theta),
            ("k0", self.k0),
            ("k1", self.k1),
            ("k2", self.k2),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { name, value });
            }
        }

        if self.cell_size <= 0.0 {
            return Err(ConfigError::OutOfRange {
                name: "cell_size",
                constraint: "positive",
                value: self.cell_size,
            });
        }
        for (name, value) in [("tau", self.tau), ("theta", self.theta), ("k0", self.k0)] {
            if value < 0.0 {
                return Err(ConfigError::OutOfRange {
                    name,
                    constraint: "non-negative",
                    value,
                });
            }
        }
        Ok(())
    }
}
