//! Read-only snapshot view and the dump callback contract

use crate::config::SimulationConfig;
use crate::grid::{CellParams, CellState, GridDims};
use serde::{Deserialize, Serialize};

/// Read-only view of a fully computed generation.
///
/// Handed to [`DumpSink::dump`] between steps; it never exposes a partially
/// updated grid.
#[derive(Debug, Clone, Copy)]
pub struct SimulationView<'a> {
    /// Grid dimensions
    pub dims: GridDims,
    /// Number of completed steps (the generation shown)
    pub step: u64,
    /// Cell states in row-major order
    pub states: &'a [CellState],
    /// Cell parameters in row-major order
    pub params: &'a [CellParams],
    /// Configuration of the run
    pub config: &'a SimulationConfig,
}

impl SimulationView<'_> {
    /// State of the cell at `(row, col)`, `None` if out of bounds
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<CellState> {
        self.dims
            .contains(row, col)
            .then(|| self.states[self.dims.index(row, col)])
    }

    /// Aggregate statistics of the generation
    #[must_use]
    pub fn stats(&self) -> SnapshotStats {
        let mut stats = SnapshotStats {
            step: self.step,
            ..SnapshotStats::default()
        };
        for state in self.states {
            if state.burning {
                stats.burning_cells += 1;
            } else if state.fuel <= self.config.theta {
                stats.spent_cells += 1;
            }
            stats.total_fuel += f64::from(state.fuel);
        }
        stats
    }
}

/// Summary of one generation, suitable for logging or JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SnapshotStats {
    /// Completed steps
    pub step: u64,
    /// Cells currently on fire
    pub burning_cells: usize,
    /// Cells not burning whose fuel is at or below `theta`: burnt out, or never
    /// fuelled. None of them can ignite again.
    pub spent_cells: usize,
    /// Sum of remaining fuel over the grid
    pub total_fuel: f64,
}

/// Caller-supplied snapshot operation.
///
/// Returning `false` asks the scheduler to stop, exactly as a cancellation
/// request would.
pub trait DumpSink {
    /// Receive one generation
    fn dump(&mut self, view: &SimulationView<'_>) -> bool;
}

impl<F> DumpSink for F
where
    F: FnMut(&SimulationView<'_>) -> bool,
{
    fn dump(&mut self, view: &SimulationView<'_>) -> bool {
        self(view)
    }
}
