//! CSV output backend.
//!
//! Creates three files in the artifact directory:
//! - `slices.csv`
//! - `activities.csv`
//! - `daily.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::layout::{ACTIVITIES_CSV, DAILY_CSV, SLICES_CSV};
use crate::writer::OutputWriter;
use crate::{ActivityRow, DailyRow, OutputResult, SliceRow};

/// Writes realisation output to three CSV files.
pub struct CsvWriter {
    slices:     Writer<File>,
    activities: Writer<File>,
    daily:      Writer<File>,
    finished:   bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open the three files and write the header
    /// rows with one column per variable.
    pub fn new(dir: &Path, variables: &[String]) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut slices = Writer::from_path(dir.join(SLICES_CSV))?;
        slices.write_record(header(
            &[
                "slice_id", "agent_id", "activity_idx", "time_start", "time_end",
                "activity_group", "activity_description", "travel_mode",
            ],
            variables,
        ))?;

        let mut activities = Writer::from_path(dir.join(ACTIVITIES_CSV))?;
        activities.write_record(header(
            &["agent_id", "act_idx", "duration", "activity_type", "activity_description", "commute_mode"],
            variables,
        ))?;

        let mut daily = Writer::from_path(dir.join(DAILY_CSV))?;
        daily.write_record(header(&["agent_id"], variables))?;

        Ok(Self { slices, activities, daily, finished: false })
    }
}

fn header(fixed: &[&str], variables: &[String]) -> Vec<String> {
    fixed.iter().map(|s| s.to_string()).chain(variables.iter().cloned()).collect()
}

/// Empty cell for missing.
pub(crate) fn cell<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

fn with_values(mut fixed: Vec<String>, values: &[Option<f64>]) -> Vec<String> {
    fixed.extend(values.iter().map(|v| cell(*v)));
    fixed
}

impl OutputWriter for CsvWriter {
    fn write_slices(&mut self, rows: &[SliceRow]) -> OutputResult<()> {
        for row in rows {
            self.slices.write_record(with_values(
                vec![
                    row.slice_id.to_string(),
                    row.agent_id.to_string(),
                    row.activity_idx.to_string(),
                    row.time_start.clone(),
                    row.time_end.clone(),
                    row.activity_group.to_string(),
                    row.activity_description.to_string(),
                    cell(row.travel_mode),
                ],
                &row.values,
            ))?;
        }
        Ok(())
    }

    fn write_activities(&mut self, rows: &[ActivityRow]) -> OutputResult<()> {
        for row in rows {
            self.activities.write_record(with_values(
                vec![
                    row.agent_id.to_string(),
                    row.act_idx.to_string(),
                    row.duration.to_string(),
                    row.activity_type.to_string(),
                    row.activity_description.to_string(),
                    cell(row.commute_mode),
                ],
                &row.values,
            ))?;
        }
        Ok(())
    }

    fn write_daily(&mut self, row: &DailyRow) -> OutputResult<()> {
        self.daily.write_record(with_values(vec![row.agent_id.to_string()], &row.values))?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.slices.flush()?;
        self.activities.flush()?;
        self.daily.flush()?;
        Ok(())
    }
}
