//! Per-cell state and parameter records

use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Mutable per-cell state. Two generations are kept by [`super::GridStore`].
///
/// Invariant: `burning` implies `fuel > 0`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CellState {
    /// Remaining fuel quantity `B` (≥ 0)
    pub fuel: f32,
    /// Fire presence `N`
    pub burning: bool,
}

impl CellState {
    /// Unburnt cell holding `fuel`
    #[must_use]
    pub const fn unburnt(fuel: f32) -> Self {
        Self {
            fuel,
            burning: false,
        }
    }

    /// Burning cell holding `fuel`
    #[must_use]
    pub const fn burning(fuel: f32) -> Self {
        Self {
            fuel,
            burning: true,
        }
    }
}

/// Immutable per-cell physical parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellParams {
    /// Altimetry `P` in meters
    pub altitude: f32,
    /// Flammability fraction `S` in `[0, 1]`
    pub flammability: f32,
    /// Wind speed `F` (≥ 0)
    pub wind_speed: f32,
    /// Wind direction `D` in radians, `[0, 2π)`.
    ///
    /// `0` points toward increasing column index, `π/2` toward increasing row index.
    pub wind_direction: f32,
    /// Initial fuel `gamma`, sets the burn-down rate `tau / gamma`
    pub initial_fuel: f32,
}

impl CellParams {
    /// Wrap the wind direction into `[0, 2π)`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.wind_direction = self.wind_direction.rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        if self.wind_direction >= TAU {
            self.wind_direction = 0.0;
        }
        self
    }

    /// Check field ranges, returning the name and value of the first bad field.
    pub(crate) fn first_invalid_field(&self) -> Option<(&'static str, f32)> {
        if !self.altitude.is_finite() {
            return Some(("altitude", self.altitude));
        }
        if !(0.0..=1.0).contains(&self.flammability) {
            return Some(("flammability", self.flammability));
        }
        if !self.wind_speed.is_finite() || self.wind_speed < 0.0 {
            return Some(("wind_speed", self.wind_speed));
        }
        if !self.wind_direction.is_finite() {
            return Some(("wind_direction", self.wind_direction));
        }
        if !self.initial_fuel.is_finite() || self.initial_fuel < 0.0 {
            return Some(("initial_fuel", self.initial_fuel));
        }
        None
    }
}

impl Default for CellParams {
    fn default() -> Self {
        Self {
            altitude: 0.0,
            flammability: 1.0,
            wind_speed: 0.0,
            wind_direction: 0.0,
            initial_fuel: 1.0,
        }
    }
}
