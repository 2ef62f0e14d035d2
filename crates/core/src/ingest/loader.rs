//! Grid population from one text row per cell
//!
//! Row layout (comma separated):
//!
//! ```text
//! row,col,altitude,flammability,wind_speed,wind_direction,initial_fuel,fuel,burning
//! ```
//!
//! `row`, `col` and `burning` (0 or 1) are integers, the rest are decimals.
//! Blank lines and lines starting with `#` are skipped. Rows may come in any
//! order, but every cell must appear exactly once.

use super::{read_row, FieldKind, FieldValue};
use crate::error::{GridError, IngestError};
use crate::grid::{CellParams, CellState, GridDims, GridStore};
use std::io::BufRead;
use tracing::{debug, warn};

/// Field kinds of one cell row
pub const CELL_ROW_KINDS: [FieldKind; 9] = [
    FieldKind::Int64,
    FieldKind::Int64,
    FieldKind::Double,
    FieldKind::Double,
    FieldKind::Double,
    FieldKind::Double,
    FieldKind::Double,
    FieldKind::Double,
    FieldKind::Int64,
];

/// One decoded cell row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRecord {
    pub row: usize,
    pub col: usize,
    pub params: CellParams,
    pub state: CellState,
}

impl CellRecord {
    /// Parse a cell row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row is malformed, a coordinate is negative, or
    /// the burning flag is not 0 or 1.
    pub fn parse(line: &str) -> Result<Self, IngestError> {
        let mut fields = [FieldValue::default(); CELL_ROW_KINDS.len()];
        read_row(line, &CELL_ROW_KINDS, &mut fields)?;
        Self::from_fields(&fields)
    }

    fn from_fields(fields: &[FieldValue; 9]) -> Result<Self, IngestError> {
        let int = |i: usize| fields[i].as_i64().unwrap_or_default();
        let real = |i: usize| fields[i].as_f64() as f32;

        let coordinate = |name: &str, value: i64| {
            usize::try_from(value).map_err(|_| IngestError::Record {
                line: 0,
                message: format!("{name} must be non-negative, got {value}"),
            })
        };
        let row = coordinate("row", int(0))?;
        let col = coordinate("col", int(1))?;

        let burning = match int(8) {
            0 => false,
            1 => true,
            other => {
                return Err(IngestError::Record {
                    line: 0,
                    message: format!("burning flag must be 0 or 1, got {other}"),
                })
            }
        };

        Ok(Self {
            row,
            col,
            params: CellParams {
                altitude: real(2),
                flammability: real(3),
                wind_speed: real(4),
                wind_direction: real(5),
                initial_fuel: real(6),
            },
            state: CellState {
                fuel: real(7),
                burning,
            },
        })
    }

    /// Format as a cell row (inverse of [`CellRecord::parse`])
    #[must_use]
    pub fn to_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{}",
            self.row,
            self.col,
            self.params.altitude,
            self.params.flammability,
            self.params.wind_speed,
            self.params.wind_direction,
            self.params.initial_fuel,
            self.state.fuel,
            u8::from(self.state.burning)
        )
    }
}

/// Accumulates cell rows into a grid.
#[derive(Debug, Clone)]
pub struct GridLoader {
    dims: GridDims,
    params: Vec<CellParams>,
    states: Vec<CellState>,
    assigned: Vec<bool>,
    filled: usize,
}

impl GridLoader {
    /// Start an empty grid of `dims`.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are zero or overflow.
    pub fn new(dims: GridDims) -> Result<Self, GridError> {
        if dims.is_empty() {
            return Err(GridError::EmptyGrid {
                rows: dims.rows,
                cols: dims.cols,
            });
        }
        let len = dims.checked_len().ok_or(GridError::DimensionOverflow {
            rows: dims.rows,
            cols: dims.cols,
        })?;
        Ok(Self {
            dims,
            params: vec![CellParams::default(); len],
            states: vec![CellState::default(); len],
            assigned: vec![false; len],
            filled: 0,
        })
    }

    /// Apply one line. Returns `Ok(false)` for skipped blank/comment lines.
    ///
    /// # Errors
    ///
    /// Returns an error, tagged with `line_no`, if the line is malformed, lies
    /// outside the grid, or repeats a cell. Nothing is applied on error.
    pub fn load_line(&mut self, line_no: usize, line: &str) -> Result<bool, IngestError> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(false);
        }

        let record = CellRecord::parse(trimmed).map_err(|err| match err {
            IngestError::Record { message, .. } => IngestError::Record {
                line: line_no,
                message,
            },
            other => IngestError::Line {
                line: line_no,
                source: Box::new(other),
            },
        })?;

        if !self.dims.contains(record.row, record.col) {
            return Err(IngestError::Line {
                line: line_no,
                source: Box::new(
                    GridError::OutOfBounds {
                        row: record.row,
                        col: record.col,
                        rows: self.dims.rows,
                        cols: self.dims.cols,
                    }
                    .into(),
                ),
            });
        }

        let idx = self.dims.index(record.row, record.col);
        if self.assigned[idx] {
            return Err(IngestError::DuplicateCell {
                row: record.row,
                col: record.col,
                line: line_no,
            });
        }

        self.params[idx] = record.params;
        self.states[idx] = record.state;
        self.assigned[idx] = true;
        self.filled += 1;
        Ok(true)
    }

    /// Validate completeness and build the grid.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::MissingCells`] if any cell has no row, or a grid
    /// error if the assembled data violates a grid invariant.
    pub fn finish(self) -> Result<GridStore, IngestError> {
        let total = self.dims.len();
        if let Some(first) = self.assigned.iter().position(|&done| !done) {
            let (row, col) = self.dims.coords(first);
            return Err(IngestError::MissingCells {
                missing: total - self.filled,
                total,
                row,
                col,
            });
        }
        debug!("Loaded {} cell rows", self.filled);
        Ok(GridStore::new(self.dims, self.params, self.states)?)
    }

    /// Read every line of `reader` and build the grid.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed line, on I/O errors and on incomplete grids.
    pub fn read_from<R: BufRead>(dims: GridDims, reader: R) -> Result<GridStore, IngestError> {
        let mut loader = Self::new(dims)?;
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            loader.load_line(i + 1, &line)?;
        }
        if loader.filled == 0 {
            warn!("Input contained no cell rows");
        }
        loader.finish()
    }
}
