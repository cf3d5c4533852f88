//! Raster metadata of the exposure dataset.

use expo_core::{Coord, Envelope};

use crate::{SpatialError, SpatialResult};

/// Fixed extent and cell layout of the dataset's base grid.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridExtent {
    pub min_x:  f64,
    pub max_y:  f64,
    pub max_x:  f64,
    pub min_y:  f64,
    pub cell_x: f64,
    pub cell_y: f64,
    pub rows:   usize,
    pub cols:   usize,
}

impl GridExtent {
    /// Extent anchored at the upper-left corner `(min_x, max_y)`.
    pub fn new(
        min_x:  f64,
        max_y:  f64,
        cell_x: f64,
        cell_y: f64,
        rows:   usize,
        cols:   usize,
    ) -> SpatialResult<Self> {
        if !(cell_x > 0.0 && cell_y > 0.0) {
            return Err(SpatialError::InvalidExtent(format!(
                "cell size {cell_x}x{cell_y} must be positive"
            )));
        }
        if rows == 0 || cols == 0 {
            return Err(SpatialError::InvalidExtent(format!("grid {rows}x{cols} is empty")));
        }
        Ok(Self {
            min_x,
            max_y,
            max_x: min_x + cell_x * cols as f64,
            min_y: max_y - cell_y * rows as f64,
            cell_x,
            cell_y,
            rows,
            cols,
        })
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn envelope(&self) -> Envelope {
        Envelope { min_x: self.min_x, max_x: self.max_x, min_y: self.min_y, max_y: self.max_y }
    }

    /// `(row, col)` of the cell containing `p`.
    ///
    /// Points on the east or south edge of the extent belong to no cell and
    /// are rejected.
    pub fn cell_of(&self, p: Coord) -> SpatialResult<(usize, usize)> {
        if !(p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y) {
            return Err(SpatialError::OutOfBounds { at: p });
        }
        let row = ((self.max_y - p.y) / self.cell_y).floor() as usize;
        let col = ((p.x - self.min_x) / self.cell_x).floor() as usize;
        if row >= self.rows || col >= self.cols {
            return Err(SpatialError::OutOfBounds { at: p });
        }
        Ok((row, col))
    }

    /// Fractional `(row, col)` position of `p`; unbounded.
    #[inline]
    pub fn cell_position(&self, p: Coord) -> (f64, f64) {
        ((self.max_y - p.y) / self.cell_y, (p.x - self.min_x) / self.cell_x)
    }

    /// Centre of cell `(row, col)`.
    pub fn cell_center(&self, row: usize, col: usize) -> Coord {
        Coord::new(
            self.min_x + self.cell_x * (col as f64 + 0.5),
            self.max_y - self.cell_y * (row as f64 + 0.5),
        )
    }

    /// Envelope covering exactly the cells of `window`.
    pub fn window_envelope(&self, window: &CellWindow) -> Envelope {
        Envelope {
            min_x: self.min_x + self.cell_x * window.col_off as f64,
            max_x: self.min_x + self.cell_x * (window.col_off + window.cols) as f64,
            max_y: self.max_y - self.cell_y * window.row_off as f64,
            min_y: self.max_y - self.cell_y * (window.row_off + window.rows) as f64,
        }
    }

    /// Check that the signed window lies inside the grid and convert it.
    pub fn checked_window(
        &self,
        row_start: i64,
        col_start: i64,
        rows:      usize,
        cols:      usize,
    ) -> SpatialResult<CellWindow> {
        let row_end = row_start + rows as i64;
        let col_end = col_start + cols as i64;
        if row_start < 0 || col_start < 0 || row_end > self.rows as i64 || col_end > self.cols as i64 {
            return Err(SpatialError::WindowOutOfBounds {
                row_start,
                row_end,
                col_start,
                col_end,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(CellWindow { row_off: row_start as usize, col_off: col_start as usize, rows, cols })
    }
}

/// A rectangular block of dataset cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CellWindow {
    pub row_off: usize,
    pub col_off: usize,
    pub rows:    usize,
    pub cols:    usize,
}

impl CellWindow {
    #[inline]
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
