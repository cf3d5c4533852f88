//! Spatial-subsystem error type.

use thiserror::Error;

use expo_core::{Coord, LonLat, TravelMode};

/// Errors produced by `expo-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("coordinate {at} lies outside the dataset extent")]
    OutOfBounds { at: Coord },

    #[error("cell window rows {row_start}..{row_end} cols {col_start}..{col_end} exceeds dataset grid {rows}x{cols}")]
    WindowOutOfBounds {
        row_start: i64,
        row_end:   i64,
        col_start: i64,
        col_end:   i64,
        rows:      usize,
        cols:      usize,
    },

    #[error("invalid grid extent: {0}")]
    InvalidExtent(String),

    #[error("buffer radius {0} must be finite and non-negative")]
    InvalidRadius(f64),

    #[error("travel mode {0} cannot be routed")]
    UnroutableMode(TravelMode),

    #[error("no route from {from} to {to} by {mode}")]
    NoRoute { from: LonLat, to: LonLat, mode: TravelMode },

    #[error("route has no vertices")]
    EmptyRoute,
}

impl SpatialError {
    /// `true` for geometry falling outside the dataset.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, SpatialError::OutOfBounds { .. } | SpatialError::WindowOutOfBounds { .. })
    }
}

pub type SpatialResult<T> = Result<T, SpatialError>;
