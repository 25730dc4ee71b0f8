//! Error types for the core crate.

use std::path::PathBuf;

/// Caller contract violations on coordinate input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("invalid {field}: {value:?} is not a number")]
    InvalidCoordinate { field: &'static str, value: String },

    #[error("invalid {field}: {value} is outside [-{limit}, {limit}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        limit: f64,
    },

    #[error("invalid {field}: value is not finite")]
    NotFinite { field: &'static str },
}

/// Errors raised while loading or querying the airport table.
#[derive(Debug, thiserror::Error)]
pub enum AirportError {
    #[error("airport table not found at: {0}")]
    NotFound(PathBuf),

    #[error("failed to read airport table: {0}")]
    Csv(#[from] csv::Error),

    #[error("airport table row {row} has only {columns} columns")]
    ShortRow { row: usize, columns: usize },

    #[error("bad DMS coordinate {value:?}")]
    InvalidDms { value: String },

    #[error("unknown airport: {0}")]
    UnknownAirport(String),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
