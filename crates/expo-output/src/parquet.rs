//! Parquet output backend (feature `parquet`).
//!
//! Creates three files in the artifact directory:
//! - `slices.parquet`
//! - `activities.parquet`
//! - `daily.parquet`
//!
//! Variable columns are nullable `Float64`.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Builder, Int32Builder, StringBuilder, UInt32Builder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::OutputWriter;
use crate::{ActivityRow, DailyRow, OutputResult, SliceRow};

/// Daily rows are buffered and written in batches of this size.
const DAILY_BATCH: usize = 8_192;

fn schema(fixed: Vec<Field>, variables: &[String]) -> Arc<Schema> {
    let mut fields = fixed;
    fields.extend(variables.iter().map(|v| Field::new(v.as_str(), DataType::Float64, true)));
    Arc::new(Schema::new(fields))
}

fn slice_schema(variables: &[String]) -> Arc<Schema> {
    schema(
        vec![
            Field::new("slice_id",             DataType::UInt64, false),
            Field::new("agent_id",             DataType::UInt32, false),
            Field::new("activity_idx",         DataType::UInt32, false),
            Field::new("time_start",           DataType::Utf8,   false),
            Field::new("time_end",             DataType::Utf8,   false),
            Field::new("activity_group",       DataType::Int32,  false),
            Field::new("activity_description", DataType::Int32,  false),
            Field::new("travel_mode",          DataType::Int32,  true),
        ],
        variables,
    )
}

fn activity_schema(variables: &[String]) -> Arc<Schema> {
    schema(
        vec![
            Field::new("agent_id",             DataType::UInt32,  false),
            Field::new("act_idx",              DataType::UInt32,  false),
            Field::new("duration",             DataType::Float64, false),
            Field::new("activity_type",        DataType::Int32,   false),
            Field::new("activity_description", DataType::Int32,   false),
            Field::new("commute_mode",         DataType::Int32,   true),
        ],
        variables,
    )
}

fn daily_schema(variables: &[String]) -> Arc<Schema> {
    schema(vec![Field::new("agent_id", DataType::UInt32, false)], variables)
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// One nullable column per variable.
fn value_columns<'a>(rows: impl Iterator<Item = &'a [Option<f64>]>, variables: usize) -> Vec<ArrayRef> {
    let mut builders: Vec<Float64Builder> = (0..variables).map(|_| Float64Builder::new()).collect();
    for values in rows {
        for (i, b) in builders.iter_mut().enumerate() {
            b.append_option(values.get(i).copied().flatten());
        }
    }
    builders.into_iter().map(|mut b| Arc::new(b.finish()) as ArrayRef).collect()
}

fn open(dir: &Path, name: &str, schema: &Arc<Schema>) -> OutputResult<ArrowWriter<File>> {
    let file = File::create(dir.join(name))?;
    Ok(ArrowWriter::try_new(file, Arc::clone(schema), Some(snappy_props()))?)
}

/// Writes realisation output to three Parquet files.
///
/// `finish()` **must** be called to write the Parquet file footers; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    slices:          Option<ArrowWriter<File>>,
    activities:      Option<ArrowWriter<File>>,
    daily:           Option<ArrowWriter<File>>,
    slice_schema:    Arc<Schema>,
    activity_schema: Arc<Schema>,
    daily_schema:    Arc<Schema>,
    daily_rows:      Vec<DailyRow>,
    variables:       usize,
}

impl ParquetWriter {
    /// Create `dir` if needed and the three Parquet files in it.
    pub fn new(dir: &Path, variables: &[String]) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        let slice_schema = slice_schema(variables);
        let activity_schema = activity_schema(variables);
        let daily_schema = daily_schema(variables);

        Ok(Self {
            slices:     Some(open(dir, "slices.parquet", &slice_schema)?),
            activities: Some(open(dir, "activities.parquet", &activity_schema)?),
            daily:      Some(open(dir, "daily.parquet", &daily_schema)?),
            slice_schema,
            activity_schema,
            daily_schema,
            daily_rows: Vec::new(),
            variables:  variables.len(),
        })
    }

    fn flush_daily(&mut self) -> OutputResult<()> {
        if self.daily_rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.daily.as_mut() else {
            return Ok(());
        };

        let mut agent_ids = UInt32Builder::new();
        for row in &self.daily_rows {
            agent_ids.append_value(row.agent_id);
        }
        let mut columns: Vec<ArrayRef> = vec![Arc::new(agent_ids.finish())];
        columns.extend(value_columns(self.daily_rows.iter().map(|r| r.values.as_slice()), self.variables));

        writer.write(&RecordBatch::try_new(Arc::clone(&self.daily_schema), columns)?)?;
        self.daily_rows.clear();
        Ok(())
    }
}

impl OutputWriter for ParquetWriter {
    fn write_slices(&mut self, rows: &[SliceRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.slices.as_mut() else {
            return Ok(());
        };

        let mut slice_ids    = UInt64Builder::new();
        let mut agent_ids    = UInt32Builder::new();
        let mut activity_idx = UInt32Builder::new();
        let mut starts       = StringBuilder::new();
        let mut ends         = StringBuilder::new();
        let mut groups       = Int32Builder::new();
        let mut kinds        = Int32Builder::new();
        let mut modes        = Int32Builder::new();

        for row in rows {
            slice_ids.append_value(row.slice_id);
            agent_ids.append_value(row.agent_id);
            activity_idx.append_value(row.activity_idx);
            starts.append_value(&row.time_start);
            ends.append_value(&row.time_end);
            groups.append_value(row.activity_group);
            kinds.append_value(row.activity_description);
            modes.append_option(row.travel_mode);
        }

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(slice_ids.finish()),
            Arc::new(agent_ids.finish()),
            Arc::new(activity_idx.finish()),
            Arc::new(starts.finish()),
            Arc::new(ends.finish()),
            Arc::new(groups.finish()),
            Arc::new(kinds.finish()),
            Arc::new(modes.finish()),
        ];
        columns.extend(value_columns(rows.iter().map(|r| r.values.as_slice()), self.variables));

        writer.write(&RecordBatch::try_new(Arc::clone(&self.slice_schema), columns)?)?;
        Ok(())
    }

    fn write_activities(&mut self, rows: &[ActivityRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.activities.as_mut() else {
            return Ok(());
        };

        let mut agent_ids = UInt32Builder::new();
        let mut act_idx   = UInt32Builder::new();
        let mut durations = Float64Builder::new();
        let mut groups    = Int32Builder::new();
        let mut kinds     = Int32Builder::new();
        let mut modes     = Int32Builder::new();

        for row in rows {
            agent_ids.append_value(row.agent_id);
            act_idx.append_value(row.act_idx);
            durations.append_value(row.duration);
            groups.append_value(row.activity_type);
            kinds.append_value(row.activity_description);
            modes.append_option(row.commute_mode);
        }

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(agent_ids.finish()),
            Arc::new(act_idx.finish()),
            Arc::new(durations.finish()),
            Arc::new(groups.finish()),
            Arc::new(kinds.finish()),
            Arc::new(modes.finish()),
        ];
        columns.extend(value_columns(rows.iter().map(|r| r.values.as_slice()), self.variables));

        writer.write(&RecordBatch::try_new(Arc::clone(&self.activity_schema), columns)?)?;
        Ok(())
    }

    fn write_daily(&mut self, row: &DailyRow) -> OutputResult<()> {
        self.daily_rows.push(row.clone());
        if self.daily_rows.len() >= DAILY_BATCH {
            self.flush_daily()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.flush_daily()?;
        for w in [self.slices.take(), self.activities.take(), self.daily.take()].into_iter().flatten() {
            w.close()?;
        }
        Ok(())
    }
}
