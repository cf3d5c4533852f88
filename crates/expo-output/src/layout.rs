//! Artifact directory and file names.
//!
//! ```text
//! <output>/
//!   <profile>[_ODnn]_<r>/      one per realisation
//!     slices.csv  activities.csv  daily.csv   (or output.db / *.parquet)
//!   log/<profile>[_ODnn]_<r>.log
//!   <name>/                    one per weekly combination
//!     weekly_<variable>.csv
//!     <variable>_<name>.csv
//!     weekly.db                (sqlite feature)
//! ```

use std::path::{Path, PathBuf};

pub const SLICES_CSV:     &str = "slices.csv";
pub const ACTIVITIES_CSV: &str = "activities.csv";
pub const DAILY_CSV:      &str = "daily.csv";
pub const SQLITE_DB:      &str = "output.db";
pub const WEEKLY_DB:      &str = "weekly.db";
pub const LOG_DIR:        &str = "log";

/// `<profile>_<r>`, or `<profile>_OD<nn>_<r>` when an OD id is given.
pub fn artifact_name(profile: &str, od: Option<u32>, realisation: u32) -> String {
    match od {
        Some(od) => format!("{profile}_OD{od:02}_{realisation}"),
        None     => format!("{profile}_{realisation}"),
    }
}

pub fn artifact_dir(output: &Path, artifact: &str) -> PathBuf {
    output.join(artifact)
}

pub fn log_path(output: &Path, artifact: &str) -> PathBuf {
    output.join(LOG_DIR).join(format!("{artifact}.log"))
}
