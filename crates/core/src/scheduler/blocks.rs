//! Row-block tiling of the grid sweep
//!
//! A generation is computed in blocks of whole rows. Blocks are sized so the
//! rows being read, their parameters and the rows being written fit in roughly
//! half of the L2 cache. In parallel mode each block is one rayon task. Tiling
//! only changes speed: every cell draws from its own substream, so the output
//! is the same for any block size.

use crate::grid::{CellParams, CellState, GridDims};
use crate::platform::{CacheGeometry, CacheLevel};
use std::mem::size_of;

/// Bytes touched per cell in one step: read state, written state, parameters.
const BYTES_PER_CELL: u64 = (2 * size_of::<CellState>() + size_of::<CellParams>()) as u64;

/// Budget used when the platform reports no cache geometry.
pub const DEFAULT_BLOCK_BYTES: u64 = 256 * 1024;

/// How many rows each block of the sweep covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockPlan {
    rows: Option<usize>,
}

impl BlockPlan {
    /// Sweep the whole grid as a single block
    #[must_use]
    pub const fn whole_grid() -> Self {
        Self { rows: None }
    }

    /// Fixed number of rows per block (at least one)
    #[must_use]
    pub fn rows(rows: usize) -> Self {
        Self {
            rows: Some(rows.max(1)),
        }
    }

    /// Size blocks from reported cache levels.
    #[must_use]
    pub fn from_levels(levels: &[CacheLevel], dims: GridDims) -> Self {
        let budget = levels
            .iter()
            .filter(|level| level.holds_data() && level.level <= 2)
            .map(CacheLevel::size)
            .max()
            .map_or(DEFAULT_BLOCK_BYTES, |size| size / 2);
        let row_bytes = (dims.cols as u64 * BYTES_PER_CELL).max(1);
        let rows = (budget / row_bytes).max(1);
        Self::rows(usize::try_from(rows).unwrap_or(usize::MAX).min(dims.rows))
    }

    /// Size blocks from a platform cache query.
    #[must_use]
    pub fn from_geometry(geometry: &dyn CacheGeometry, dims: GridDims) -> Self {
        Self::from_levels(&geometry.cache_levels(), dims)
    }

    /// Rows per block for a grid of `dims`
    #[must_use]
    pub fn rows_per_block(&self, dims: GridDims) -> usize {
        self.rows.map_or(dims.rows, |rows| rows.min(dims.rows)).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::CacheKind;

    fn level(level: u8, kind: CacheKind, size_kib: u32) -> CacheLevel {
        CacheLevel {
            level,
            kind,
            line_size: 64,
            partitions: 1,
            ways: 8,
            sets: size_kib * 1024 / (64 * 8),
        }
    }

    #[test]
    fn test_whole_grid() {
        let dims = GridDims::new(40, 10);
        assert_eq!(BlockPlan::whole_grid().rows_per_block(dims), 40);
    }

    #[test]
    fn test_fixed_rows_clamped() {
        let dims = GridDims::new(5, 10);
        assert_eq!(BlockPlan::rows(0).rows_per_block(dims), 1);
        assert_eq!(BlockPlan::rows(3).rows_per_block(dims), 3);
        assert_eq!(BlockPlan::rows(99).rows_per_block(dims), 5);
    }

    #[test]
    fn test_sized_from_l2() {
        let levels = [
            level(1, CacheKind::Data, 32),
            level(1, CacheKind::Instruction, 32),
            level(2, CacheKind::Unified, 256),
            level(3, CacheKind::Unified, 8192),
        ];
        let dims = GridDims::new(10_000, 1024);
        let plan = BlockPlan::from_levels(&levels, dims);
        // 128 KiB budget / (1024 cells * 36 bytes)
        assert_eq!(plan.rows_per_block(dims), 3);
    }

    #[test]
    fn test_default_budget_without_levels() {
        let dims = GridDims::new(10_000, 256);
        let plan = BlockPlan::from_levels(&[], dims);
        assert_eq!(
            plan.rows_per_block(dims) as u64,
            DEFAULT_BLOCK_BYTES / (256 * BYTES_PER_CELL)
        );
    }

    #[test]
    fn test_wide_rows_get_one_row_blocks() {
        let levels = [level(2, CacheKind::Unified, 256)];
        let dims = GridDims::new(8, 1_000_000);
        assert_eq!(BlockPlan::from_levels(&levels, dims).rows_per_block(dims), 1);
    }
}
