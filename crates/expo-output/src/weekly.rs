//! Weekly phase: combine persisted day summaries into weekly artifacts.
//!
//! A combination names its day types and the realisation artifacts they
//! come from:
//!
//! ```json
//! {
//!   "name": "commuter_week",
//!   "realisations": 10,
//!   "day_types": [
//!     { "label": "workday", "weight": 5, "artifact": "commuter_workday" },
//!     { "label": "weekend", "weight": 2, "artifact": "homemaker_buffer_weekend",
//!       "per_realisation": false }
//!   ]
//! }
//! ```
//!
//! Day type `i` of realisation `r` is read from the artifact directory
//! `<output>/<artifact>_<r>/`, or from `<artifact>_1` for every `r` when
//! `per_realisation` is false.  Either backend's day summary is accepted:
//! `daily.csv`, or `output.db` with the `sqlite` feature.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::Writer;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use expo_exposure::{DayType, DayValues, WeeklyCombiner, WeeklyTable, WeeklyVariable};

use crate::csv::cell;
use crate::reader::{DailyTable, load_daily_artifact};
use crate::{OutputError, OutputResult, WeeklyRow};

fn yes() -> bool {
    true
}

/// One weighted day type and where its day summaries live.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayTypeSource {
    pub label:           String,
    pub weight:          f64,
    /// Artifact stem, `<profile>[_ODnn]`.
    pub artifact:        String,
    #[serde(default = "yes")]
    pub per_realisation: bool,
}

impl DayTypeSource {
    /// Realisation artifact directory holding this day type's summary.
    pub fn artifact_dir(&self, output: &Path, realisation: u32) -> PathBuf {
        let r = if self.per_realisation { realisation } else { 1 };
        output.join(format!("{}_{r}", self.artifact))
    }
}

/// A weekly combination over realisations `1..=realisations`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeeklyCombination {
    /// Output directory name under `<output>`.
    pub name:         String,
    pub realisations: u32,
    pub day_types:    Vec<DayTypeSource>,
    #[serde(default = "WeeklyVariable::defaults")]
    pub variables:    Vec<WeeklyVariable>,
}

impl WeeklyCombination {
    pub fn from_json_str(json: &str) -> OutputResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> OutputResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    fn combiner(&self) -> OutputResult<WeeklyCombiner> {
        let day_types = self.day_types.iter().map(|d| DayType::new(d.label.clone(), d.weight)).collect();
        Ok(WeeklyCombiner::new(day_types, self.variables.clone())?)
    }
}

/// Result of [`run_weekly`].
#[derive(Clone, Debug)]
pub struct WeeklyReport {
    pub tables: Vec<WeeklyTable>,
    /// Every file written, weekly tables first.
    pub files:  Vec<PathBuf>,
}

/// Combine, summarise and write the weekly artifacts of `combination`.
///
/// # Errors
///
/// - [`OutputError::MissingArtifact`] if an artifact has no day summary.
/// - [`OutputError::Exposure`] for invalid weights or a day summary whose
///   variable count differs from the weekly variable list.
pub fn run_weekly(output: &Path, combination: &WeeklyCombination) -> OutputResult<WeeklyReport> {
    let combiner = combiner_checked(combination)?;
    let mut cache: FxHashMap<PathBuf, DailyTable> = FxHashMap::default();
    let mut combined: Vec<DayValues> = Vec::with_capacity(combination.realisations as usize);

    for r in 1..=combination.realisations {
        let dirs: Vec<PathBuf> = combination.day_types.iter().map(|d| d.artifact_dir(output, r)).collect();
        for dir in &dirs {
            if !cache.contains_key(dir) {
                let table = load_daily_artifact(dir)?;
                cache.insert(dir.clone(), table);
            }
        }
        let days: Vec<&DayValues> = dirs.iter().filter_map(|d| cache.get(d)).map(|t| &t.values).collect();
        combined.push(combiner.combine(&days)?);
        tracing::info!(realisation = r, agents = combined.last().map_or(0, |c| c.len()), "realisation combined");
    }

    let tables = combiner.summarise(&combined);
    let dir = output.join(&combination.name);
    std::fs::create_dir_all(&dir)?;

    let mut files = Vec::with_capacity(tables.len() * 2);
    for table in &tables {
        files.push(write_weekly_csv(&dir, table, combination.realisations as usize)?);
    }
    for table in &tables {
        files.push(write_summary_csv(&dir, &combination.name, table)?);
    }
    tracing::info!(name = %combination.name, files = files.len(), "weekly artifacts written");
    Ok(WeeklyReport { tables, files })
}

fn combiner_checked(combination: &WeeklyCombination) -> OutputResult<WeeklyCombiner> {
    if combination.realisations == 0 {
        return Err(OutputError::Exposure(expo_exposure::ExposureError::InvalidCombination(
            "at least one realisation is required".into(),
        )));
    }
    combination.combiner()
}

/// `weekly_<variable>.csv`: `agent_id,R1..RN,mean,std,var,min,max`.
pub fn write_weekly_csv(dir: &Path, table: &WeeklyTable, realisations: usize) -> OutputResult<PathBuf> {
    let path = dir.join(format!("weekly_{}.csv", table.variable.name));
    let mut w: Writer<File> = Writer::from_path(&path)?;

    let mut header = vec!["agent_id".to_string()];
    header.extend((1..=realisations).map(|r| format!("R{r}")));
    header.extend(["mean", "std", "var", "min", "max"].map(String::from));
    w.write_record(&header)?;

    for record in &table.records {
        let row = WeeklyRow::from(record);
        let mut out = vec![row.agent_id.to_string()];
        out.extend(row.realisations.iter().map(|v| cell(*v)));
        out.extend([row.mean, row.std, row.var, row.min, row.max].map(cell));
        w.write_record(&out)?;
    }
    w.flush()?;
    Ok(path)
}

/// `<variable>_<name>.csv`: `agent_id,mean,std` with two decimals.
pub fn write_summary_csv(dir: &Path, name: &str, table: &WeeklyTable) -> OutputResult<PathBuf> {
    let path = dir.join(format!("{}_{name}.csv", table.variable.name));
    let mut w: Writer<File> = Writer::from_path(&path)?;
    w.write_record(["agent_id", "mean", "std"])?;

    let two = |v: Option<f64>| v.map(|v| format!("{v:.2}")).unwrap_or_default();
    for record in &table.records {
        let row = WeeklyRow::from(record);
        w.write_record([row.agent_id.to_string(), two(row.mean), two(row.std)])?;
    }
    w.flush()?;
    Ok(path)
}
