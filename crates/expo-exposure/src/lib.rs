//! `expo-exposure`: from time slices to daily and weekly exposure.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`dataset`]   | `ExposureDataset` trait, `RasterCube`, `Grid`, CSV loader, `day_grid` |
//! | [`sampler`]   | `ExposureSampler`, `QualityRule`, `ExposureSample`, `SampledSlice` |
//! | [`aggregate`] | `ActivityAggregator`, `ActivityExposure`, `DailySummary`   |
//! | [`weekly`]    | `WeeklyCombiner`, `DayType`, `WeeklyVariable`, `Stats`     |
//! | [`error`]     | `ExposureError`, `ExposureResult<T>`                       |
//!
//! # Missing data
//!
//! Missing values are explicit at every level (`ExposureSample::Missing`,
//! then `None`) and propagate upward: a missing slice value makes its
//! activity and its day missing, and a missing day makes the realisation's
//! weekly value missing.

pub mod aggregate;
pub mod dataset;
pub mod error;
pub mod sampler;
pub mod weekly;

#[cfg(test)]
mod tests;

pub use aggregate::{ActivityAggregator, ActivityExposure, DailySummary};
pub use dataset::{
    ExposureDataset, Grid, RasterCube, RasterCubeBuilder, day_grid, load_cube_csv,
    load_cube_reader,
};
pub use error::{ExposureError, ExposureResult};
pub use sampler::{ExposureSample, ExposureSampler, QualityRule, SampledSlice};
pub use weekly::{
    Combination, DayType, DayValues, Stats, WeeklyCombiner, WeeklyRecord, WeeklyTable,
    WeeklyVariable,
};
