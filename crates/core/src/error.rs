//! Error types for grid construction, configuration and ingestion

use thiserror::Error;

/// Errors raised while building a [`crate::GridStore`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("grid dimensions must be non-zero, got {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },

    #[error("grid dimensions {rows}x{cols} overflow the addressable cell count")]
    DimensionOverflow { rows: usize, cols: usize },

    #[error("{what} has {actual} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("cell ({row}, {col}): {field} out of range ({value})")]
    InvalidParameter {
        row: usize,
        col: usize,
        field: &'static str,
        value: f32,
    },

    #[error("cell ({row}, {col}): burning with no fuel ({fuel})")]
    BurningWithoutFuel { row: usize, col: usize, fuel: f32 },

    #[error("cell ({row}, {col}) lies outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("failed to allocate {cells} cells of state storage")]
    Allocation { cells: usize },
}

/// Errors raised by [`crate::SimulationConfig::validate`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("snapshot cadence must be at least 1")]
    ZeroSnapshotCadence,

    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f32 },

    #[error("{name} must be {constraint}, got {value}")]
    OutOfRange {
        name: &'static str,
        constraint: &'static str,
        value: f32,
    },

    #[error("cell ({row}, {col}) is burning with fuel {fuel}, at or below theta {theta}")]
    BurningAtThreshold {
        row: usize,
        col: usize,
        fuel: f32,
        theta: f32,
    },
}

/// Errors raised while ingesting delimited text rows.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IngestError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("{kinds} field kinds but only {slots} output slots")]
    SlotsTooShort { kinds: usize, slots: usize },

    #[error("field {position}: cannot parse {text:?} as {kind}")]
    Parse {
        position: usize,
        kind: &'static str,
        text: String,
    },

    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<IngestError>,
    },

    #[error("line {line}: {message}")]
    Record { line: usize, message: String },

    #[error("cell ({row}, {col}) defined twice (line {line})")]
    DuplicateCell { row: usize, col: usize, line: usize },

    #[error("{missing} of {total} cells have no row, first missing is ({row}, {col})")]
    MissingCells {
        missing: usize,
        total: usize,
        row: usize,
        col: usize,
    },

    #[error("read error: {0}")]
    Io(String),

    #[error(transparent)]
    Grid(#[from] GridError),
}

impl From<std::io::Error> for IngestError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}
