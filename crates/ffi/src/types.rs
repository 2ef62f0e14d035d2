//! C-compatible mirrors of the core value types

use std::os::raw::c_void;

use wildfire_ca_core::{CellParams, CellState, RunSummary, SimulationConfig, StopReason};

/// Per-cell physical parameters.
///
/// `wind_direction` is in radians: 0 points toward increasing column index,
/// π/2 toward increasing row index. Any finite value is accepted and wrapped.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WildfireCellParams {
    pub altitude: f32,
    /// Flammability in `[0, 1]`
    pub flammability: f32,
    pub wind_speed: f32,
    pub wind_direction: f32,
    /// Sets the burn-down rate `tau / initial_fuel`; zero or less burns out in one step
    pub initial_fuel: f32,
}

impl From<WildfireCellParams> for CellParams {
    fn from(p: WildfireCellParams) -> Self {
        Self {
            altitude: p.altitude,
            flammability: p.flammability,
            wind_speed: p.wind_speed,
            wind_direction: p.wind_direction,
            initial_fuel: p.initial_fuel,
        }
    }
}

/// Per-cell fire state. `burning` must be 0 or 1 when passed in from C.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WildfireCellState {
    pub fuel: f32,
    pub burning: bool,
}

impl From<WildfireCellState> for CellState {
    fn from(s: WildfireCellState) -> Self {
        Self {
            fuel: s.fuel,
            burning: s.burning,
        }
    }
}

impl From<CellState> for WildfireCellState {
    fn from(s: CellState) -> Self {
        Self {
            fuel: s.fuel,
            burning: s.burning,
        }
    }
}

/// Run configuration. Obtain defaults from `wildfire_default_config`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WildfireConfig {
    /// Number of steps `h`
    pub horizon: u64,
    /// Snapshot cadence `s` (at least 1)
    pub snapshot_every: u64,
    pub seed: u32,
    /// Cell side length `L` in meters
    pub cell_size: f32,
    pub tau: f32,
    pub theta: f32,
    pub k0: f32,
    pub k1: f32,
    pub k2: f32,
    /// Compute row blocks on the rayon thread pool
    pub parallel: bool,
}

impl From<WildfireConfig> for SimulationConfig {
    fn from(c: WildfireConfig) -> Self {
        Self {
            horizon: c.horizon,
            snapshot_every: c.snapshot_every,
            seed: c.seed,
            cell_size: c.cell_size,
            tau: c.tau,
            theta: c.theta,
            k0: c.k0,
            k1: c.k1,
            k2: c.k2,
            parallel: c.parallel,
        }
    }
}

impl From<SimulationConfig> for WildfireConfig {
    fn from(c: SimulationConfig) -> Self {
        Self {
            horizon: c.horizon,
            snapshot_every: c.snapshot_every,
            seed: c.seed,
            cell_size: c.cell_size,
            tau: c.tau,
            theta: c.theta,
            k0: c.k0,
            k1: c.k1,
            k2: c.k2,
            parallel: c.parallel,
        }
    }
}

/// One generation handed to the dump callback.
///
/// `states` points to `rows * cols` cells in row-major order and is only valid
/// for the duration of the callback.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct WildfireSnapshot {
    pub rows: usize,
    pub cols: usize,
    /// Completed steps
    pub step: u64,
    pub states: *const WildfireCellState,
    pub burning_cells: usize,
    /// Cells not burning with fuel at or below `theta`
    pub spent_cells: usize,
    pub total_fuel: f64,
}

/// Dump callback: return `false` to stop the run.
///
/// The callback must not call back into the instance, except for
/// `wildfire_request_stop`.
pub type WildfireDumpFn =
    Option<unsafe extern "C" fn(snapshot: *const WildfireSnapshot, user_data: *mut c_void) -> bool>;

/// Why a run ended
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WildfireStopReason {
    HorizonReached = 0,
    DumpRequested = 1,
    Cancelled = 2,
}

impl From<StopReason> for WildfireStopReason {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::HorizonReached => Self::HorizonReached,
            StopReason::DumpRequested => Self::DumpRequested,
            StopReason::Cancelled => Self::Cancelled,
        }
    }
}

/// Outcome of `wildfire_run`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WildfireRunSummary {
    pub steps_completed: u64,
    pub stop_reason: WildfireStopReason,
    /// Callback invocations, including the final one
    pub dumps: u64,
}

impl From<RunSummary> for WildfireRunSummary {
    fn from(summary: RunSummary) -> Self {
        Self {
            steps_completed: summary.steps_completed,
            stop_reason: summary.stop_reason.into(),
            dumps: summary.dumps,
        }
    }
}
