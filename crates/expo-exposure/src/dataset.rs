//! Exposure dataset: an immutable `(variable, timestep) → grid` cube.
//!
//! # CSV format
//!
//! One row per populated cell.  Cells that no row mentions are missing.
//!
//! ```csv
//! variable,timestep,row,col,value
//! NO2_hour_weekday,2020-07-01 00:00:00,0,0,21.5
//! NO2_hour_weekday,2020-07-01 00:00:00,0,1,22.0
//! noise,2020-07-01 00:00:00,0,0,1.2e5
//! ```
//!
//! Row 0 is the northernmost row, matching
//! [`GridExtent`][expo_spatial::GridExtent].

use std::io::Read;
use std::path::Path;

use chrono::{Duration, NaiveDateTime};
use rustc_hash::FxHashMap;
use serde::Deserialize;

use expo_core::{AgendaClock, Tick, parse_timestamp};
use expo_schedule::TimestepGrid;
use expo_spatial::{CellWindow, GridExtent};

use crate::{ExposureError, ExposureResult};

// ── Grid ──────────────────────────────────────────────────────────────────────

/// A row-major 2-D block of raster values.  `NaN` marks no-data.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    rows:   usize,
    cols:   usize,
    values: Vec<f32>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize, values: Vec<f32>) -> ExposureResult<Self> {
        if values.len() != rows * cols {
            return Err(ExposureError::InvalidCube(format!(
                "grid {rows}x{cols} needs {} values, got {}",
                rows * cols,
                values.len()
            )));
        }
        Ok(Self { rows, cols, values })
    }

    pub fn filled(rows: usize, cols: usize, value: f32) -> Self {
        Self { rows, cols, values: vec![value; rows * cols] }
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    /// Cell value, or `None` outside the grid.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.index(row, col).map(|i| self.values[i])
    }

    #[inline]
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut f32> {
        self.index(row, col).map(|i| &mut self.values[i])
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Copy out the cells of `window`.
    ///
    /// A window running past the grid edge is truncated, so the result may
    /// be smaller than requested; callers compare shapes.
    pub fn window(&self, window: CellWindow) -> Grid {
        let row_end = (window.row_off + window.rows).min(self.rows);
        let col_end = (window.col_off + window.cols).min(self.cols);
        let rows = row_end.saturating_sub(window.row_off);
        let cols = col_end.saturating_sub(window.col_off);

        let mut values = Vec::with_capacity(rows * cols);
        for r in window.row_off..window.row_off + rows {
            let base = r * self.cols;
            values.extend_from_slice(&self.values[base + window.col_off..base + window.col_off + cols]);
        }
        Grid { rows, cols, values }
    }
}

// ── ExposureDataset ───────────────────────────────────────────────────────────

/// Read-only access to a spatio-temporal exposure cube.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`; all worker threads of a
/// realisation read the same dataset concurrently.
pub trait ExposureDataset: Send + Sync {
    /// Fixed raster extent shared by every layer.
    fn extent(&self) -> &GridExtent;

    /// Timesteps in strictly increasing order.
    fn timesteps(&self) -> &[NaiveDateTime];

    fn variables(&self) -> &[String];

    /// The full grid of `variable` at exactly `timestep`.
    fn read(&self, variable: &str, timestep: NaiveDateTime) -> ExposureResult<&Grid>;

    /// Latest timestep `<= at`, or `None` if every timestep is later.
    fn nearest_timestep_at_or_before(&self, at: NaiveDateTime) -> Option<NaiveDateTime> {
        let ts = self.timesteps();
        let idx = ts.partition_point(|&t| t <= at);
        idx.checked_sub(1).map(|i| ts[i])
    }

    /// Temporal resolution: the gap between the first two timesteps, or one
    /// hour for single-timestep datasets.
    fn resolution(&self) -> Duration {
        match self.timesteps() {
            [a, b, ..] => *b - *a,
            _ => Duration::hours(1),
        }
    }
}

/// Grid of dataset-resolution windows over `[start, end)`.
///
/// The last window is shortened when the agenda is not a whole number of
/// dataset timesteps.
pub fn day_grid(
    clock:      &AgendaClock,
    resolution: Duration,
    start:      Tick,
    end:        Tick,
) -> ExposureResult<TimestepGrid> {
    let secs = resolution.num_seconds();
    if secs <= 0 {
        return Err(ExposureError::InvalidCube(format!(
            "temporal resolution {secs} s must be positive"
        )));
    }
    let step = clock.ticks_for_secs(secs as u64).max(1);
    let mut boundaries = Vec::new();
    let mut t = start;
    while t < end {
        boundaries.push(t);
        t = t + step;
    }
    boundaries.push(end);
    Ok(TimestepGrid::from_boundaries(&boundaries)?)
}

// ── RasterCube ────────────────────────────────────────────────────────────────

/// In-memory [`ExposureDataset`].
pub struct RasterCube {
    extent:    GridExtent,
    timesteps: Vec<NaiveDateTime>,
    variables: Vec<String>,
    var_index: FxHashMap<String, usize>,
    /// `layers[var * timesteps.len() + ts]`.
    layers:    Vec<Grid>,
}

impl RasterCube {
    /// Every cell of every layer set to `value`.
    pub fn uniform(
        extent:    GridExtent,
        variables: &[&str],
        timesteps: &[NaiveDateTime],
        value:     f32,
    ) -> Self {
        let mut b = RasterCubeBuilder::new(extent);
        for v in variables {
            for &t in timesteps {
                b.layer(v, t, Grid::filled(extent.rows, extent.cols, value));
            }
        }
        b.build_unchecked()
    }

    fn timestep_index(&self, at: NaiveDateTime) -> Option<usize> {
        self.timesteps.binary_search(&at).ok()
    }
}

impl ExposureDataset for RasterCube {
    fn extent(&self) -> &GridExtent {
        &self.extent
    }

    fn timesteps(&self) -> &[NaiveDateTime] {
        &self.timesteps
    }

    fn variables(&self) -> &[String] {
        &self.variables
    }

    fn read(&self, variable: &str, timestep: NaiveDateTime) -> ExposureResult<&Grid> {
        let v = *self
            .var_index
            .get(variable)
            .ok_or_else(|| ExposureError::UnknownVariable(variable.to_owned()))?;
        let t = self.timestep_index(timestep).ok_or(ExposureError::NoTimestep(timestep))?;
        Ok(&self.layers[v * self.timesteps.len() + t])
    }
}

/// Incremental [`RasterCube`] construction.
///
/// Timesteps are sorted and de-duplicated at build time; layers that were
/// never supplied are filled with no-data.
pub struct RasterCubeBuilder {
    extent: GridExtent,
    layers: FxHashMap<(String, NaiveDateTime), Grid>,
    order:  Vec<String>,
}

impl RasterCubeBuilder {
    pub fn new(extent: GridExtent) -> Self {
        Self { extent, layers: FxHashMap::default(), order: Vec::new() }
    }

    fn entry(&mut self, variable: &str, timestep: NaiveDateTime) -> &mut Grid {
        if !self.order.iter().any(|v| v == variable) {
            self.order.push(variable.to_owned());
        }
        let (rows, cols) = (self.extent.rows, self.extent.cols);
        self.layers
            .entry((variable.to_owned(), timestep))
            .or_insert_with(|| Grid::filled(rows, cols, f32::NAN))
    }

    /// Insert or replace a whole layer.
    pub fn layer(&mut self, variable: &str, timestep: NaiveDateTime, grid: Grid) -> &mut Self {
        *self.entry(variable, timestep) = grid;
        self
    }

    /// Set one cell, creating the layer on first use.
    pub fn cell(
        &mut self,
        variable: &str,
        timestep: NaiveDateTime,
        row:      usize,
        col:      usize,
        value:    f32,
    ) -> ExposureResult<&mut Self> {
        if row >= self.extent.rows || col >= self.extent.cols {
            return Err(ExposureError::InvalidCube(format!(
                "cell ({row}, {col}) outside grid {}x{}",
                self.extent.rows, self.extent.cols
            )));
        }
        let grid = self.entry(variable, timestep);
        let shape = grid.shape();
        match grid.get_mut(row, col) {
            Some(cell) => *cell = value,
            None => {
                return Err(ExposureError::InvalidCube(format!(
                    "cell ({row}, {col}) outside layer {variable} @ {timestep} of shape {shape:?}"
                )));
            }
        }
        Ok(self)
    }

    /// Validate layer shapes and assemble the cube.
    pub fn build(self) -> ExposureResult<RasterCube> {
        let expected = (self.extent.rows, self.extent.cols);
        if let Some(((v, t), g)) = self.layers.iter().find(|(_, g)| g.shape() != expected) {
            return Err(ExposureError::InvalidCube(format!(
                "layer {v} @ {t} is {:?}, extent is {expected:?}",
                g.shape()
            )));
        }
        if self.layers.is_empty() {
            return Err(ExposureError::InvalidCube("cube has no layers".into()));
        }
        Ok(self.build_unchecked())
    }

    fn build_unchecked(mut self) -> RasterCube {
        let mut timesteps: Vec<NaiveDateTime> = self.layers.keys().map(|(_, t)| *t).collect();
        timesteps.sort_unstable();
        timesteps.dedup();

        let (rows, cols) = (self.extent.rows, self.extent.cols);
        let mut layers = Vec::with_capacity(self.order.len() * timesteps.len());
        for v in &self.order {
            for &t in &timesteps {
                let grid = self
                    .layers
                    .remove(&(v.clone(), t))
                    .unwrap_or_else(|| Grid::filled(rows, cols, f32::NAN));
                layers.push(grid);
            }
        }

        let var_index = self.order.iter().enumerate().map(|(i, v)| (v.clone(), i)).collect();
        tracing::debug!(
            variables = self.order.len(),
            timesteps = timesteps.len(),
            rows,
            cols,
            "exposure cube assembled"
        );
        RasterCube { extent: self.extent, timesteps, variables: self.order, var_index, layers }
    }
}

// ── CSV loading ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CellRecord {
    variable: String,
    timestep: String,
    row:      usize,
    col:      usize,
    value:    f32,
}

/// Load a [`RasterCube`] from a CSV file.
pub fn load_cube_csv(path: &Path, extent: GridExtent) -> ExposureResult<RasterCube> {
    let file = std::fs::File::open(path)?;
    load_cube_reader(file, extent)
}

/// Like [`load_cube_csv`] but accepts any `Read` source.
pub fn load_cube_reader<R: Read>(reader: R, extent: GridExtent) -> ExposureResult<RasterCube> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut builder = RasterCubeBuilder::new(extent);
    // Most files repeat the same timestamp for many rows.
    let mut last: Option<(String, NaiveDateTime)> = None;

    for result in csv_reader.deserialize::<CellRecord>() {
        let rec = result.map_err(|e| ExposureError::Parse(e.to_string()))?;
        let timestep = match &last {
            Some((raw, t)) if *raw == rec.timestep => *t,
            _ => parse_timestamp(&rec.timestep)?,
        };
        builder.cell(&rec.variable, timestep, rec.row, rec.col, rec.value)?;
        last = Some((rec.timestep, timestep));
    }

    builder.build()
}
