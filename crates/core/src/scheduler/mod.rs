//! Step loop, snapshots and cooperative stop
//!
//! The scheduler owns the grid for the whole run. Each step computes every cell
//! of the next generation from the current one (row-major, optionally in
//! parallel row blocks), then swaps the buffers. The dump callback sees the
//! starting generation, then the new generation every `snapshot_every`
//! completed steps; between steps the cancellation flag is checked. However the
//! run ends, one final dump follows.
//!
//! # Example
//!
//! ```rust
//! use wildfire_ca_core::{
//!     CancellationFlag, CellParams, CellState, GridDims, GridStore, Scheduler,
//!     SimulationConfig, SimulationView,
//! };
//!
//! let mut grid = GridStore::uniform(
//!     GridDims::new(16, 16),
//!     CellParams::default(),
//!     CellState::unburnt(1.0),
//! )
//! .unwrap();
//! grid.ignite(8, 8).unwrap();
//!
//! let config = SimulationConfig { horizon: 20, snapshot_every: 5, ..SimulationConfig::default() };
//! let mut scheduler = Scheduler::new(grid, config).unwrap();
//! let mut burning = Vec::new();
//! let summary = scheduler.run(
//!     &mut |view: &SimulationView<'_>| {
//!         burning.push(view.stats().burning_cells);
//!         true
//!     },
//!     &CancellationFlag::new(),
//! );
//! assert_eq!(summary.steps_completed, 20);
//! // generation 0, steps 5, 10, 15, 20, then the final dump
//! assert_eq!(burning.len(), 6);
//! ```

mod blocks;

pub use blocks::{BlockPlan, DEFAULT_BLOCK_BYTES};

use crate::config::SimulationConfig;
use crate::error::ConfigError;
use crate::grid::{GridStore, StepBuffers};
use crate::interrupt::CancellationFlag;
use crate::platform;
use crate::profiler::ProfilerScope;
use crate::rng::RngStream;
use crate::snapshot::{DumpSink, SimulationView};
use crate::transition::TransitionRule;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StopReason {
    /// All `horizon` steps completed
    HorizonReached,
    /// A periodic dump returned `false`
    DumpRequested,
    /// The cancellation flag was set
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HorizonReached => write!(f, "horizon reached"),
            Self::DumpRequested => write!(f, "stop requested by dump"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Outcome of [`Scheduler::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Steps executed by this call
    pub steps_completed: u64,
    /// Why the loop ended
    pub stop_reason: StopReason,
    /// Dump invocations, including the final one
    pub dumps: u64,
}

/// Drives the simulation.
#[derive(Debug, Clone)]
pub struct Scheduler {
    grid: GridStore,
    config: SimulationConfig,
    rule: TransitionRule,
    rng: RngStream,
    plan: BlockPlan,
    step: u64,
}

impl Scheduler {
    /// Take ownership of a populated grid for a run under `config`.
    ///
    /// Sequential runs sweep the grid as one block; parallel runs size their
    /// row blocks from the platform's cache geometry.
    ///
    /// # Errors
    ///
    /// Returns the first configuration constraint that `config` violates, or
    /// [`ConfigError::BurningAtThreshold`] if a burning cell already has fuel at
    /// or below `theta`.
    pub fn new(grid: GridStore, config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let states = grid.current();
        if let Some(idx) = states
            .iter()
            .position(|s| s.burning && s.fuel <= config.theta)
        {
            let (row, col) = grid.dims().coords(idx);
            return Err(ConfigError::BurningAtThreshold {
                row,
                col,
                fuel: states[idx].fuel,
                theta: config.theta,
            });
        }
        let plan = if config.parallel {
            BlockPlan::from_geometry(platform::detect().as_ref(), grid.dims())
        } else {
            BlockPlan::whole_grid()
        };
        Ok(Self {
            grid,
            rule: TransitionRule::from_config(&config),
            rng: RngStream::new(config.seed),
            config,
            plan,
            step: 0,
        })
    }

    /// Replace the row-block plan
    #[must_use]
    pub fn with_block_plan(mut self, plan: BlockPlan) -> Self {
        self.plan = plan;
        self
    }

    /// Completed steps so far
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step
    }

    /// Grid in its current generation
    #[must_use]
    pub fn grid(&self) -> &GridStore {
        &self.grid
    }

    /// Run configuration
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Active row-block plan
    #[must_use]
    pub fn block_plan(&self) -> BlockPlan {
        self.plan
    }

    /// Release the grid
    #[must_use]
    pub fn into_grid(self) -> GridStore {
        self.grid
    }

    /// Read-only view of the current generation
    #[must_use]
    pub fn view(&self) -> SimulationView<'_> {
        SimulationView {
            dims: self.grid.dims(),
            step: self.step,
            states: self.grid.current(),
            params: self.grid.params(),
            config: &self.config,
        }
    }

    /// Compute one full generation and make it current.
    pub fn step(&mut self) {
        let _scope = ProfilerScope::new("step");
        let dims = self.grid.dims();
        let rows_per_block = self.plan.rows_per_block(dims);
        let block_len = rows_per_block * dims.cols;
        let (rule, rng, step) = (&self.rule, &self.rng, self.step);

        let StepBuffers {
            current,
            next,
            params,
        } = self.grid.split();

        if self.config.parallel {
            next.par_chunks_mut(block_len)
                .enumerate()
                .for_each(|(block, out)| {
                    rule.compute_rows(dims, current, params, rng, step, block * rows_per_block, out);
                });
        } else {
            for (block, out) in next.chunks_mut(block_len).enumerate() {
                rule.compute_rows(dims, current, params, rng, step, block * rows_per_block, out);
            }
        }

        self.grid.swap();
        self.step += 1;
    }

    /// Step until the horizon, a dump-requested stop, or cancellation.
    ///
    /// The dump sees the starting generation first, then every
    /// `snapshot_every` completed steps, then once more when the loop ends.
    /// `cancel` is consulted only between steps. The final dump's return value
    /// is ignored.
    pub fn run<D>(&mut self, dump: &mut D, cancel: &CancellationFlag) -> RunSummary
    where
        D: DumpSink + ?Sized,
    {
        let dims = self.grid.dims();
        let horizon = self.config.horizon;
        let every = self.config.snapshot_every;
        let start = self.step;
        let run_scope = ProfilerScope::new("run");

        info!(
            "Starting run: {}x{} grid, steps {}..{}, snapshot every {}, seed {}, parallel={}",
            dims.rows, dims.cols, start, horizon, every, self.config.seed, self.config.parallel
        );

        let mut stop_reason = StopReason::HorizonReached;
        let mut dumps = 1_u64;
        let mut keep_going = dump.dump(&self.view());
        if !keep_going {
            stop_reason = StopReason::DumpRequested;
        }

        while keep_going && self.step < horizon {
            if cancel.is_set() {
                stop_reason = StopReason::Cancelled;
                break;
            }

            self.step();

            if self.step % every == 0 {
                dumps += 1;
                let view = self.view();
                debug!("Snapshot at step {}", view.step);
                keep_going = dump.dump(&view);
                if !keep_going {
                    stop_reason = StopReason::DumpRequested;
                }
            }
        }

        dumps += 1;
        let _ = dump.dump(&self.view());

        let summary = RunSummary {
            steps_completed: self.step - start,
            stop_reason,
            dumps,
        };
        info!(
            "Run finished after {} steps ({}), {} dumps, {:.1} ms",
            summary.steps_completed,
            summary.stop_reason,
            summary.dumps,
            run_scope.elapsed_ms()
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellParams, CellState, GridDims};

    fn burning_center(rows: usize, cols: usize) -> GridStore {
        let mut grid = GridStore::uniform(
            GridDims::new(rows, cols),
            CellParams::default(),
            CellState::unburnt(1.0),
        )
        .unwrap();
        grid.ignite(rows / 2, cols / 2).unwrap();
        grid
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SimulationConfig {
            snapshot_every: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(
            Scheduler::new(burning_center(3, 3), config).unwrap_err(),
            ConfigError::ZeroSnapshotCadence
        );
    }

    #[test]
    fn test_burning_cell_at_threshold_rejected() {
        let grid = GridStore::new(
            GridDims::new(1, 2),
            vec![CellParams::default(); 2],
            vec![CellState::burning(0.05), CellState::unburnt(1.0)],
        )
        .unwrap();
        let config = SimulationConfig {
            theta: 0.1,
            k0: 1.0,
            ..SimulationConfig::default()
        };
        assert_eq!(
            Scheduler::new(grid.clone(), config).unwrap_err(),
            ConfigError::BurningAtThreshold {
                row: 0,
                col: 0,
                fuel: 0.05,
                theta: 0.1
            }
        );

        let lower = SimulationConfig {
            theta: 0.01,
            ..config
        };
        assert!(Scheduler::new(grid, lower).is_ok());
    }

    #[test]
    fn test_step_advances_counter_and_burns_fuel() {
        let config = SimulationConfig {
            tau: 0.5,
            ..SimulationConfig::default()
        };
        let mut scheduler = Scheduler::new(burning_center(3, 3), config).unwrap();
        scheduler.step();
        assert_eq!(scheduler.step_count(), 1);
        let center = scheduler.grid().state(1, 1).unwrap();
        assert!(center.burning);
        assert!((center.fuel - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_horizon_still_dumps_once() {
        let config = SimulationConfig {
            horizon: 0,
            ..SimulationConfig::default()
        };
        let mut scheduler = Scheduler::new(burning_center(3, 3), config).unwrap();
        let mut steps = Vec::new();
        let summary = scheduler.run(
            &mut |view: &SimulationView<'_>| {
                steps.push(view.step);
                true
            },
            &CancellationFlag::new(),
        );
        assert_eq!(steps, vec![0, 0]);
        assert_eq!(summary.steps_completed, 0);
        assert_eq!(summary.dumps, 2);
        assert_eq!(summary.stop_reason, StopReason::HorizonReached);
    }

    #[test]
    fn test_dump_false_stops_run() {
        let config = SimulationConfig {
            horizon: 50,
            snapshot_every: 4,
            ..SimulationConfig::default()
        };
        let mut scheduler = Scheduler::new(burning_center(5, 5), config).unwrap();
        let mut steps = Vec::new();
        let summary = scheduler.run(
            &mut |view: &SimulationView<'_>| {
                steps.push(view.step);
                view.step < 8
            },
            &CancellationFlag::new(),
        );
        assert_eq!(steps, vec![0, 4, 8, 8]);
        assert_eq!(summary.stop_reason, StopReason::DumpRequested);
        assert_eq!(summary.steps_completed, 8);
        assert_eq!(scheduler.step_count(), 8);
    }

    #[test]
    fn test_initial_dump_can_stop_run() {
        let mut scheduler =
            Scheduler::new(burning_center(5, 5), SimulationConfig::default()).unwrap();
        let mut steps = Vec::new();
        let summary = scheduler.run(
            &mut |view: &SimulationView<'_>| {
                steps.push(view.step);
                false
            },
            &CancellationFlag::new(),
        );
        assert_eq!(steps, vec![0, 0]);
        assert_eq!(summary.stop_reason, StopReason::DumpRequested);
        assert_eq!(summary.steps_completed, 0);
    }

    #[test]
    fn test_cancelled_before_start_runs_nothing() {
        let mut scheduler =
            Scheduler::new(burning_center(5, 5), SimulationConfig::default()).unwrap();
        let before = scheduler.grid().current().to_vec();
        let cancel = CancellationFlag::new();
        cancel.request_stop();

        let mut dumps = 0;
        let summary = scheduler.run(
            &mut |_: &SimulationView<'_>| {
                dumps += 1;
                true
            },
            &cancel,
        );
        assert_eq!(dumps, 2);
        assert_eq!(summary.steps_completed, 0);
        assert_eq!(summary.stop_reason, StopReason::Cancelled);
        assert_eq!(scheduler.grid().current(), before.as_slice());
    }
}
