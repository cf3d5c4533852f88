//! The `OutputWriter` trait implemented by all backend writers.

use crate::{ActivityRow, DailyRow, OutputResult, SliceRow};

/// Trait implemented by CSV, SQLite, and Parquet writers.
///
/// Writers are created with the realisation's variable list, which fixes
/// the value columns; every row must carry exactly that many values.
///
/// Errors are stored by [`ArtifactObserver`][crate::ArtifactObserver] and
/// retrieved with its `take_error`.
pub trait OutputWriter {
    /// Write one agent's slices.
    fn write_slices(&mut self, rows: &[SliceRow]) -> OutputResult<()>;

    /// Write one agent's activities.
    fn write_activities(&mut self, rows: &[ActivityRow]) -> OutputResult<()>;

    /// Write one agent's day summary.
    fn write_daily(&mut self, row: &DailyRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
