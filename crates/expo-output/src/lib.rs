//! `expo-output`: realisation and weekly artifacts for the expo exposure
//! engine.
//!
//! Three realisation backends are provided behind Cargo features:
//!
//! | Feature   | Backend     | Files created in `<output>/<artifact>/`                   |
//! |-----------|-------------|-----------------------------------------------------------|
//! | *(none)*  | CSV         | `slices.csv`, `activities.csv`, `daily.csv`               |
//! | `sqlite`  | SQLite      | `output.db` (tables `slices`, `activities`, `daily`)      |
//! | `parquet` | Parquet     | `slices.parquet`, `activities.parquet`, `daily.parquet`   |
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`ArtifactObserver`], which implements `expo_sim::RunObserver`.
//!
//! The weekly phase ([`run_weekly`]) reads the day summaries back with
//! [`load_daily_artifact`] (CSV, or SQLite with the `sqlite` feature) and
//! writes `weekly_<variable>.csv` plus the `<variable>_<name>.csv` summary
//! export.  `write_weekly_sqlite` (feature `sqlite`) stores the weekly tables in
//! `weekly.db`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use expo_output::{ArtifactObserver, CsvWriter, artifact_dir, artifact_name};
//!
//! let name = artifact_name(pipeline.profile().name(), None, r);
//! let writer = CsvWriter::new(&artifact_dir(output, &name), pipeline.variables())?;
//! let mut obs = ArtifactObserver::new(writer, *pipeline.clock());
//! pipeline.run_realisation(r, &mut obs)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod layout;
pub mod observer;
pub mod reader;
pub mod row;
pub mod weekly;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;


pub use crate::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use layout::{artifact_dir, artifact_name, log_path};
pub use observer::ArtifactObserver;
pub use reader::{DailyTable, load_daily_artifact, load_daily_csv, load_daily_reader};
pub use row::{ActivityRow, DailyRow, SliceRow, WeeklyRow, activity_rows, slice_rows};
pub use weekly::{
    DayTypeSource, WeeklyCombination, WeeklyReport, run_weekly, write_summary_csv, write_weekly_csv,
};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use crate::reader::load_daily_sqlite;

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteWriter, write_weekly_sqlite};

#[cfg(feature = "parquet")]
pub use crate::parquet::ParquetWriter;
