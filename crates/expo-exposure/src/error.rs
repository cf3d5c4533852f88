//! Exposure-subsystem error type.

use chrono::NaiveDateTime;
use thiserror::Error;

use expo_core::ExpoError;
use expo_schedule::ScheduleError;
use expo_spatial::SpatialError;

/// Errors produced by `expo-exposure`.
///
/// Missing data is never an error here; it is represented by
/// [`ExposureSample::Missing`][crate::ExposureSample::Missing] and `None`
/// aggregate values.
#[derive(Debug, Error)]
pub enum ExposureError {
    #[error("{variable}: data window is {actual:?}, mask is {expected:?}")]
    ShapeMismatch {
        variable: String,
        expected: (usize, usize),
        actual:   (usize, usize),
    },

    #[error("variable {0:?} not in dataset")]
    UnknownVariable(String),

    #[error("no dataset timestep at or before {0}")]
    NoTimestep(NaiveDateTime),

    #[error("invalid exposure cube: {0}")]
    InvalidCube(String),

    #[error("invalid weekly combination: {0}")]
    InvalidCombination(String),

    #[error("{agent}: expected {expected} variables, got {actual}")]
    VariableCount { agent: u32, expected: usize, actual: usize },

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Core(#[from] ExpoError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExposureResult<T> = Result<T, ExposureError>;
