//! Grid coordinate ↔ storage index mapping
//!
//! All per-cell arrays in the workspace (cell states, cell parameters, ingested
//! rows) share one layout: row-major, `index = row * cols + col`. This mapping is
//! part of the public contract; the loader and the engine both rely on it.

use serde::{Deserialize, Serialize};

/// Fixed grid dimensions and the row-major index mapping.
///
/// `rows` is the number of cells along the first axis (`Wstar`), `cols` the
/// number along the second (`Lstar`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDims {
    /// Number of rows (`Wstar`)
    pub rows: usize,
    /// Number of columns (`Lstar`)
    pub cols: usize,
}

impl GridDims {
    /// Create new grid dimensions
    ///
    /// # Arguments
    ///
    /// * `rows` - Number of rows
    /// * `cols` - Number of columns
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Map `(row, col)` to the flat storage index.
    ///
    /// Callers must guarantee `row < rows` and `col < cols`. Out-of-range input
    /// is a contract violation; only debug builds check it.
    #[inline(always)]
    #[must_use]
    pub const fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.cols);
        row * self.cols + col
    }

    /// Inverse of [`GridDims::index`].
    #[inline]
    #[must_use]
    pub const fn coords(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    /// Whether `(row, col)` lies inside the grid.
    ///
    /// Use this to validate external coordinates before calling [`GridDims::index`].
    #[inline]
    #[must_use]
    pub const fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Total number of cells, or `None` if `rows * cols` overflows.
    #[must_use]
    pub const fn checked_len(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }

    /// Total number of cells
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Whether the grid has no cells
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}
