//! Wildfire Cellular Automaton Core Library
//!
//! Probabilistic cellular-automaton model of wildfire spread over a rectangular
//! terrain grid. Each cell carries fuel and fire state plus fixed physical
//! parameters (altitude, flammability, wind); every step, burning cells consume
//! fuel and may ignite their Moore neighbors with a probability shaped by wind
//! alignment and slope.
//!
//! ## Architecture
//!
//! - [`grid`]: row-major index mapping and double-buffered cell storage
//! - [`rng`]: seeded substreams keyed by step and cell, for reproducible runs
//! - [`transition`]: per-cell burn-down and ignition rule
//! - [`scheduler`]: step loop, snapshot cadence and cooperative stop
//! - [`interrupt`]: lock-free cancellation flag for external stop requests
//! - [`ingest`]: delimited row parsing and grid loading
//! - [`platform`]: cache geometry used to tile the sweep

// Core types and configuration
pub mod config;
pub mod error;
pub mod grid;

// Simulation engine
pub mod interrupt;
pub mod rng;
pub mod scheduler;
pub mod snapshot;
pub mod transition;

// Collaborators
pub mod ingest;
pub mod platform;
pub mod profiler;

// Re-export core types
pub use config::SimulationConfig;
pub use error::{ConfigError, GridError, IngestError};
pub use grid::{CellParams, CellState, GridDims, GridStore};

// Re-export engine types
pub use interrupt::CancellationFlag;
pub use rng::{CellRng, RngStream};
pub use scheduler::{BlockPlan, RunSummary, Scheduler, StopReason};
pub use snapshot::{DumpSink, SimulationView, SnapshotStats};
pub use transition::{TransitionRule, NEIGHBORS};

// Re-export collaborator types
pub use ingest::{read_row, FieldKind, FieldValue, GridLoader};
pub use platform::{CacheGeometry, CacheKind, CacheLevel};
