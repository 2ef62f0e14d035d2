//! Double-buffered cell storage
//!
//! `GridStore` owns two equal-length state buffers (ping-pong: read from one,
//! write the other, then swap) and the read-only parameter array. Swapping only
//! exchanges the buffer handles, so across a whole run exactly two state
//! allocations exist.

use super::{CellParams, CellState, GridDims};
use crate::error::GridError;
use tracing::debug;

/// Read view of the current generation paired with a write view of the next one.
pub struct StepBuffers<'a> {
    /// Generation being read; never mutated while a step is in flight
    pub current: &'a [CellState],
    /// Generation being written
    pub next: &'a mut [CellState],
    /// Per-cell parameters
    pub params: &'a [CellParams],
}

/// Owner of the grid's state buffers and parameters.
#[derive(Debug, Clone)]
pub struct GridStore {
    dims: GridDims,
    params: Vec<CellParams>,
    // Ping-pong buffers (read from `current`, write to `next`, then swap)
    current: Vec<CellState>,
    next: Vec<CellState>,
}

impl GridStore {
    /// Build a grid from fully populated parameter and state arrays.
    ///
    /// Both arrays must be in row-major order ([`GridDims::index`]). Wind
    /// directions are wrapped into `[0, 2π)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are zero or overflow, if an array has
    /// the wrong length, if a parameter is out of range, if a burning cell holds
    /// no fuel, or if the second state buffer cannot be allocated.
    pub fn new(
        dims: GridDims,
        params: Vec<CellParams>,
        states: Vec<CellState>,
    ) -> Result<Self, GridError> {
        let len = checked_cell_count(dims)?;

        if params.len() != len {
            return Err(GridError::LengthMismatch {
                what: "params",
                expected: len,
                actual: params.len(),
            });
        }
        if states.len() != len {
            return Err(GridError::LengthMismatch {
                what: "states",
                expected: len,
                actual: states.len(),
            });
        }

        let params: Vec<CellParams> = params.into_iter().map(CellParams::normalized).collect();
        for (idx, (p, s)) in params.iter().zip(&states).enumerate() {
            let (row, col) = dims.coords(idx);
            if let Some((field, value)) = p.first_invalid_field() {
                return Err(GridError::InvalidParameter {
                    row,
                    col,
                    field,
                    value,
                });
            }
            if !s.fuel.is_finite() || s.fuel < 0.0 {
                return Err(GridError::InvalidParameter {
                    row,
                    col,
                    field: "fuel",
                    value: s.fuel,
                });
            }
            if s.burning && s.fuel <= 0.0 {
                return Err(GridError::BurningWithoutFuel {
                    row,
                    col,
                    fuel: s.fuel,
                });
            }
        }

        let mut next = Vec::new();
        next.try_reserve_exact(len)
            .map_err(|_| GridError::Allocation { cells: len })?;
        next.extend_from_slice(&states);

        debug!("Grid store allocated: {}x{} cells", dims.rows, dims.cols);

        Ok(Self {
            dims,
            params,
            current: states,
            next,
        })
    }

    /// Build a grid where every cell shares the same parameters and state.
    ///
    /// # Errors
    ///
    /// Same conditions as [`GridStore::new`].
    pub fn uniform(dims: GridDims, params: CellParams, state: CellState) -> Result<Self, GridError> {
        let len = checked_cell_count(dims)?;
        let mut param_vec = Vec::new();
        param_vec
            .try_reserve_exact(len)
            .map_err(|_| GridError::Allocation { cells: len })?;
        param_vec.resize(len, params);

        let mut state_vec = Vec::new();
        state_vec
            .try_reserve_exact(len)
            .map_err(|_| GridError::Allocation { cells: len })?;
        state_vec.resize(len, state);

        Self::new(dims, param_vec, state_vec)
    }

    /// Set a cell of the current generation on fire before a run starts.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] for coordinates outside the grid and
    /// [`GridError::BurningWithoutFuel`] if the cell holds no fuel.
    pub fn ignite(&mut self, row: usize, col: usize) -> Result<(), GridError> {
        if !self.dims.contains(row, col) {
            return Err(GridError::OutOfBounds {
                row,
                col,
                rows: self.dims.rows,
                cols: self.dims.cols,
            });
        }
        let cell = &mut self.current[self.dims.index(row, col)];
        if cell.fuel <= 0.0 {
            return Err(GridError::BurningWithoutFuel {
                row,
                col,
                fuel: cell.fuel,
            });
        }
        cell.burning = true;
        Ok(())
    }

    /// Grid dimensions
    #[must_use]
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Per-cell parameters in row-major order
    #[must_use]
    pub fn params(&self) -> &[CellParams] {
        &self.params
    }

    /// Current generation in row-major order
    #[must_use]
    pub fn current(&self) -> &[CellState] {
        &self.current
    }

    /// State of one cell, `None` if out of bounds
    #[must_use]
    pub fn state(&self, row: usize, col: usize) -> Option<CellState> {
        self.dims
            .contains(row, col)
            .then(|| self.current[self.dims.index(row, col)])
    }

    /// Borrow the current generation for reading and the next for writing.
    pub fn split(&mut self) -> StepBuffers<'_> {
        StepBuffers {
            current: &self.current,
            next: &mut self.next,
            params: &self.params,
        }
    }

    /// Promote the next generation to current. O(1), no cell data is copied.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }

    /// Addresses of the `[current, next]` allocations.
    #[must_use]
    pub fn buffer_addresses(&self) -> [usize; 2] {
        [self.current.as_ptr() as usize, self.next.as_ptr() as usize]
    }
}

fn checked_cell_count(dims: GridDims) -> Result<usize, GridError> {
    if dims.is_empty() {
        return Err(GridError::EmptyGrid {
            rows: dims.rows,
            cols: dims.cols,
        });
    }
    dims.checked_len().ok_or(GridError::DimensionOverflow {
        rows: dims.rows,
        cols: dims.cols,
    })
}
