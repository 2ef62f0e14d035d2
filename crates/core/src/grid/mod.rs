//! Grid storage: index mapping, cell records and double-buffered state

mod cell;
mod index;
mod store;

pub use cell::{CellParams, CellState};
pub use index::GridDims;
pub use store::{GridStore, StepBuffers};
