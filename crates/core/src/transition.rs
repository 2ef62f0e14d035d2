//! Per-cell fire physics
//!
//! Pure transition from one generation to the next for a single cell:
//!
//! - **Burning** cells lose `tau / gamma` fuel per step and go out once their fuel
//!   is at or below `theta`.
//! - **Unburnt** cells with ignitable fuel (`B > theta`) and at least one burning
//!   Moore neighbor may ignite. Each burning neighbor `n` contributes
//!
//!   `p_n = k0 · S · exp(k1 · F_n · cos(D_n − φ_n)) · exp(k2 · atan(ΔP / (L · d_n)))`
//!
//!   clamped to `[0, 1]`, where `φ_n` is the direction from the neighbor to the
//!   cell, `d_n` the neighbor distance in cells (1 or √2) and `ΔP` the altitude
//!   of the cell minus that of the neighbor (uphill spread is faster). The cell
//!   ignites with probability `1 − Π(1 − p_n)`, decided by a single draw.
//! - Every other cell is carried over unchanged.
//!
//! Neighbors are evaluated in [`NEIGHBORS`] order, which fixes the floating-point
//! product and keeps runs reproducible.

use crate::config::SimulationConfig;
use crate::grid::{CellParams, CellState, GridDims};
use crate::rng::RngStream;
use nalgebra::Vector2;
use std::f32::consts::{FRAC_1_SQRT_2, SQRT_2};

/// One entry of the Moore neighborhood.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Row offset from the cell to the neighbor
    pub d_row: isize,
    /// Column offset from the cell to the neighbor
    pub d_col: isize,
    /// Distance in cells
    pub distance: f32,
    /// Column component of the unit vector from the neighbor toward the cell
    pub toward_col: f32,
    /// Row component of the unit vector from the neighbor toward the cell
    pub toward_row: f32,
}

const fn neighbor(d_row: isize, d_col: isize, toward_row: f32, toward_col: f32) -> Neighbor {
    Neighbor {
        d_row,
        d_col,
        distance: if d_row != 0 && d_col != 0 { SQRT_2 } else { 1.0 },
        toward_col,
        toward_row,
    }
}

const DIAG: f32 = FRAC_1_SQRT_2;

/// Moore neighborhood in evaluation order (row-major around the cell).
pub const NEIGHBORS: [Neighbor; 8] = [
    neighbor(-1, -1, DIAG, DIAG),
    neighbor(-1, 0, 1.0, 0.0),
    neighbor(-1, 1, DIAG, -DIAG),
    neighbor(0, -1, 0.0, 1.0),
    neighbor(0, 1, 0.0, -1.0),
    neighbor(1, -1, -DIAG, DIAG),
    neighbor(1, 0, -1.0, 0.0),
    neighbor(1, 1, -DIAG, -DIAG),
];

/// Coefficients of the transition rule, taken from the run configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionRule {
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
    /// Cell side length `L` in meters
    pub cell_size: f32,
}

impl TransitionRule {
    /// Extract the rule coefficients from a configuration
    #[must_use]
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            tau: config.tau,
            theta: config.theta,
            k0: config.k0,
            k1: config.k1,
            k2: config.k2,
            cell_size: config.cell_size,
        }
    }

    /// Advance a burning cell by one step of fuel consumption.
    #[inline]
    #[must_use]
    pub fn burn_down(&self, state: CellState, params: &CellParams) -> CellState {
        let rate = if params.initial_fuel > 0.0 {
            self.tau / params.initial_fuel
        } else {
            f32::INFINITY
        };
        let fuel = (state.fuel - rate).max(0.0);
        CellState {
            fuel,
            burning: fuel > self.theta,
        }
    }

    /// Probability that a burning `source` neighbor ignites `target`.
    ///
    /// `neighbor` is the source's position relative to the target.
    #[inline]
    #[must_use]
    pub fn spread_probability(
        &self,
        target: &CellParams,
        source: &CellParams,
        neighbor: &Neighbor,
    ) -> f32 {
        let wind = Vector2::new(source.wind_direction.cos(), source.wind_direction.sin());
        let toward = Vector2::new(neighbor.toward_col, neighbor.toward_row);
        let alignment = wind.dot(&toward);
        let wind_factor = (self.k1 * source.wind_speed * alignment).exp();

        let rise = (target.altitude - source.altitude) / (self.cell_size * neighbor.distance);
        let slope_factor = (self.k2 * rise.atan()).exp();

        let p = self.k0 * target.flammability * wind_factor * slope_factor;
        if p.is_nan() {
            0.0
        } else {
            p.clamp(0.0, 1.0)
        }
    }

    /// Combined ignition probability of the unburnt cell at `(row, col)`.
    ///
    /// Returns `None` when no neighbor is burning.
    #[must_use]
    pub fn ignition_probability(
        &self,
        dims: GridDims,
        current: &[CellState],
        params: &[CellParams],
        row: usize,
        col: usize,
    ) -> Option<f32> {
        let target = &params[dims.index(row, col)];
        let mut survive = 1.0_f32;
        let mut exposed = false;

        for neighbor in &NEIGHBORS {
            let (Some(n_row), Some(n_col)) = (
                row.checked_add_signed(neighbor.d_row),
                col.checked_add_signed(neighbor.d_col),
            ) else {
                continue;
            };
            if !dims.contains(n_row, n_col) {
                continue;
            }
            let n_idx = dims.index(n_row, n_col);
            if !current[n_idx].burning {
                continue;
            }
            exposed = true;
            survive *= 1.0 - self.spread_probability(target, &params[n_idx], neighbor);
        }

        exposed.then(|| 1.0 - survive)
    }

    /// Next-generation state of the cell at `(row, col)`.
    ///
    /// Draws at most once, from the `(step, index)` substream of `rng`, and only
    /// for an unburnt cell with ignitable fuel and a burning neighbor.
    #[inline]
    #[must_use]
    pub fn next_state(
        &self,
        dims: GridDims,
        current: &[CellState],
        params: &[CellParams],
        rng: &RngStream,
        step: u64,
        row: usize,
        col: usize,
    ) -> CellState {
        let idx = dims.index(row, col);
        let state = current[idx];

        if state.burning {
            return self.burn_down(state, &params[idx]);
        }
        if state.fuel <= self.theta {
            return state;
        }

        match self.ignition_probability(dims, current, params, row, col) {
            Some(p) if rng.substream(step, idx).draw() < p => CellState::burning(state.fuel),
            _ => state,
        }
    }

    /// Fill `out` with the next generation of the rows starting at `first_row`.
    ///
    /// `out.len()` must be a multiple of `dims.cols`.
    #[allow(clippy::too_many_arguments)]
    pub fn compute_rows(
        &self,
        dims: GridDims,
        current: &[CellState],
        params: &[CellParams],
        rng: &RngStream,
        step: u64,
        first_row: usize,
        out: &mut [CellState],
    ) {
        for (offset, row_out) in out.chunks_mut(dims.cols).enumerate() {
            let row = first_row + offset;
            for (col, cell) in row_out.iter_mut().enumerate() {
                *cell = self.next_state(dims, current, params, rng, step, row, col);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    fn rule() -> TransitionRule {
        TransitionRule {
            tau: 1.0,
            theta: 0.1,
            k0: 0.5,
            k1: 0.2,
            k2: 1.0,
            cell_size: 10.0,
        }
    }

    fn calm() -> CellParams {
        CellParams {
            altitude: 0.0,
            flammability: 1.0,
            wind_speed: 0.0,
            wind_direction: 0.0,
            initial_fuel: 4.0,
        }
    }

    #[test]
    fn test_neighbor_table() {
        assert_eq!(NEIGHBORS.len(), 8);
        for n in &NEIGHBORS {
            let norm = (n.toward_col * n.toward_col + n.toward_row * n.toward_row).sqrt();
            assert_relative_eq!(norm, 1.0, epsilon = 1e-6);
            assert!(n.d_row != 0 || n.d_col != 0);
        }
        // west neighbor pushes toward +col
        assert_eq!(NEIGHBORS[3].d_col, -1);
        assert_relative_eq!(NEIGHBORS[3].toward_col, 1.0);
    }

    #[test]
    fn test_burn_down_reduces_fuel() {
        let next = rule().burn_down(CellState::burning(1.0), &calm());
        assert_relative_eq!(next.fuel, 0.75);
        assert!(next.burning);
    }

    #[test]
    fn test_burn_down_extinguishes_at_threshold() {
        let next = rule().burn_down(CellState::burning(0.3), &calm());
        assert_relative_eq!(next.fuel, 0.05);
        assert!(!next.burning);

        let next = rule().burn_down(CellState::burning(0.1), &calm());
        assert_eq!(next.fuel, 0.0);
        assert!(!next.burning);
    }

    #[test]
    fn test_burn_down_without_initial_fuel_exhausts() {
        let params = CellParams {
            initial_fuel: 0.0,
            ..calm()
        };
        let next = rule().burn_down(CellState::burning(5.0), &params);
        assert_eq!(next, CellState::unburnt(0.0));
    }

    #[test]
    fn test_calm_flat_probability_is_base_rate() {
        let p = rule().spread_probability(&calm(), &calm(), &NEIGHBORS[1]);
        assert_relative_eq!(p, 0.5);
    }

    #[test]
    fn test_wind_alignment() {
        let windy = CellParams {
            wind_speed: 5.0,
            wind_direction: 0.0,
            ..calm()
        };
        let rule = rule();
        // Source west of target, wind blowing east: downwind
        let downwind = rule.spread_probability(&calm(), &windy, &NEIGHBORS[3]);
        // Source east of target: upwind
        let upwind = rule.spread_probability(&calm(), &windy, &NEIGHBORS[4]);
        assert!(downwind > upwind);
        assert_relative_eq!(downwind, 1.0); // 0.5 * e^1 clamps
        assert_relative_eq!(upwind, 0.5 * (-1.0_f32).exp(), epsilon = 1e-6);

        // Crosswind has no effect
        let crosswind = CellParams {
            wind_direction: PI / 2.0,
            ..windy
        };
        let p = rule.spread_probability(&calm(), &crosswind, &NEIGHBORS[3]);
        assert_relative_eq!(p, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_uphill_spread_faster() {
        let low = calm();
        let high = CellParams {
            altitude: 10.0,
            ..calm()
        };
        let rule = TransitionRule { k0: 0.2, ..rule() };
        let uphill = rule.spread_probability(&high, &low, &NEIGHBORS[1]);
        let downhill = rule.spread_probability(&low, &high, &NEIGHBORS[1]);
        assert!(uphill > downhill);
        assert_relative_eq!(uphill, 0.2 * (PI / 4.0).exp(), epsilon = 1e-5);
    }

    #[test]
    fn test_probability_combines_neighbors() {
        let dims = GridDims::new(3, 3);
        let params = vec![calm(); 9];
        let mut current = vec![CellState::unburnt(1.0); 9];
        current[dims.index(0, 1)] = CellState::burning(1.0);
        current[dims.index(2, 1)] = CellState::burning(1.0);

        let p = rule()
            .ignition_probability(dims, &current, &params, 1, 1)
            .unwrap();
        assert_relative_eq!(p, 1.0 - 0.5 * 0.5);

        // Corner (0,0) only sees (0,1)
        let p = rule()
            .ignition_probability(dims, &current, &params, 0, 0)
            .unwrap();
        assert_relative_eq!(p, 0.5);
    }

    #[test]
    fn test_no_burning_neighbor_unchanged() {
        let dims = GridDims::new(3, 3);
        let params = vec![calm(); 9];
        let current = vec![CellState::unburnt(1.0); 9];
        let rng = RngStream::new(1);
        assert!(rule()
            .ignition_probability(dims, &current, &params, 1, 1)
            .is_none());
        for step in 0..20 {
            let next = rule().next_state(dims, &current, &params, &rng, step, 1, 1);
            assert_eq!(next, current[4]);
        }
    }

    #[test]
    fn test_certain_ignition_keeps_fuel() {
        let dims = GridDims::new(1, 2);
        let params = vec![calm(); 2];
        let current = vec![CellState::burning(1.0), CellState::unburnt(0.7)];
        let rule = TransitionRule { k0: 1.0, ..rule() };
        let next = rule.next_state(dims, &current, &params, &RngStream::new(3), 0, 0, 1);
        assert_eq!(next, CellState::burning(0.7));
    }

    #[test]
    fn test_exhausted_cell_never_ignites() {
        let dims = GridDims::new(1, 2);
        let params = vec![calm(); 2];
        let current = vec![CellState::burning(1.0), CellState::unburnt(0.05)];
        let rule = TransitionRule { k0: 1.0, ..rule() };
        for step in 0..10 {
            let next = rule.next_state(dims, &current, &params, &RngStream::new(3), step, 0, 1);
            assert_eq!(next, CellState::unburnt(0.05));
        }
    }
}
