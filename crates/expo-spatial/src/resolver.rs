//! `SpatialContextResolver`: point, buffer and route footprints.
//!
//! # Snapping
//!
//! A requested envelope is expanded outward to whole dataset cells: the
//! upper-left corner is floored into the cell containing `(min_x, max_y)`
//! and the lower-right corner into the cell containing `(max_x, min_y)`.
//! The snapped envelope is the union of the cells in between, so
//! `snapped_min <= requested_min` and `snapped_max >= requested_max` on both
//! axes.
//!
//! # Route rasterisation
//!
//! Each polyline segment is walked cell by cell in grid space (a DDA
//! traversal), burning every cell the segment passes through.  This matches
//! an "all touched" rasteriser for line geometry.
//!
//! The resolver holds only the immutable dataset extent; every method takes
//! `&self` and may be called from any number of threads.

use expo_core::{Coord, Envelope, LonLat, TravelMode};

use crate::{
    CellWindow, GridExtent, Projection, Router, SpatialContext, SpatialError, SpatialResult,
};

pub struct SpatialContextResolver {
    extent: GridExtent,
}

impl SpatialContextResolver {
    pub fn new(extent: GridExtent) -> Self {
        Self { extent }
    }

    pub fn extent(&self) -> &GridExtent {
        &self.extent
    }

    /// Snap `env` outward to whole cells of the dataset grid.
    pub fn snap(&self, env: Envelope) -> SpatialResult<(CellWindow, Envelope)> {
        let (row_min, col_min) = self.extent.cell_of(Coord::new(env.min_x, env.max_y))?;
        let (row_max, col_max) = self.extent.cell_of(Coord::new(env.max_x, env.min_y))?;
        let window = CellWindow {
            row_off: row_min,
            col_off: col_min,
            rows:    row_max - row_min + 1,
            cols:    col_max - col_min + 1,
        };
        Ok((window, self.extent.window_envelope(&window)))
    }

    /// The single cell enclosing `at`.
    pub fn point(&self, at: Coord) -> SpatialResult<SpatialContext> {
        let (window, envelope) = self.snap(Envelope::of_point(at))?;
        Ok(SpatialContext::new(window, envelope, vec![1]))
    }

    /// Disc of `radius` around the cell enclosing `at`.
    ///
    /// The radius is converted to whole cells (`floor(radius / cell_x)`);
    /// the mask is `(2r + 1)²` cells with the query cell in the centre, and
    /// a cell is included when its centre offset satisfies `dx² + dy² <= r²`.
    /// A radius below one cell degenerates to the point footprint; a disc
    /// wider than the grid is [`SpatialError::WindowOutOfBounds`].
    pub fn buffer(&self, at: Coord, radius: f64) -> SpatialResult<SpatialContext> {
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(SpatialError::InvalidRadius(radius));
        }
        let (row, col) = self.extent.cell_of(at)?;
        let (row, col) = (row as i64, col as i64);
        let limit = self.extent.rows.max(self.extent.cols) as i64;
        let out_of_bounds = |r: i64| SpatialError::WindowOutOfBounds {
            row_start: row.saturating_sub(r),
            row_end:   row.saturating_add(r).saturating_add(1),
            col_start: col.saturating_sub(r),
            col_end:   col.saturating_add(r).saturating_add(1),
            rows:      self.extent.rows,
            cols:      self.extent.cols,
        };

        // A disc wider than the grid can never fit.
        let cells = (radius / self.extent.cell_x).floor();
        if cells >= limit as f64 {
            return Err(out_of_bounds(limit));
        }
        let r = cells as i64;
        let side = r
            .checked_mul(2)
            .and_then(|d| d.checked_add(1))
            .and_then(|s| usize::try_from(s).ok())
            .ok_or_else(|| out_of_bounds(r))?;

        let window = self.extent.checked_window(row - r, col - r, side, side)?;

        let mut mask = Vec::with_capacity(side * side);
        for dy in -r..=r {
            for dx in -r..=r {
                mask.push(u8::from(dx * dx + dy * dy <= r * r));
            }
        }
        Ok(SpatialContext::new(window, self.extent.window_envelope(&window), mask))
    }

    /// Rasterise a polyline already expressed in dataset coordinates.
    pub fn route_polyline(&self, line: &[Coord]) -> SpatialResult<SpatialContext> {
        let env = Envelope::of_points(line).ok_or(SpatialError::EmptyRoute)?;
        let (window, envelope) = self.snap(env)?;
        let mut mask = vec![0u8; window.len()];

        let local = |p: Coord| {
            let (r, c) = self.extent.cell_position(p);
            (r - window.row_off as f64, c - window.col_off as f64)
        };
        let mut burn = |row: i64, col: i64| {
            let row = row.clamp(0, window.rows as i64 - 1) as usize;
            let col = col.clamp(0, window.cols as i64 - 1) as usize;
            mask[row * window.cols + col] = 1;
        };

        match line {
            [only] => {
                let (r, c) = local(*only);
                burn(r.floor() as i64, c.floor() as i64);
            }
            _ => {
                for seg in line.windows(2) {
                    traverse_cells(local(seg[0]), local(seg[1]), &mut burn);
                }
            }
        }

        Ok(SpatialContext::new(window, envelope, mask))
    }

    /// Route between two geographic points and rasterise the result.
    ///
    /// # Errors
    ///
    /// [`SpatialError::UnroutableMode`] for the out-of-band travel mode;
    /// otherwise whatever the router or the snapping step reports.
    pub fn route(
        &self,
        router:     &dyn Router,
        projection: &dyn Projection,
        from:       LonLat,
        to:         LonLat,
        mode:       TravelMode,
    ) -> SpatialResult<SpatialContext> {
        if !mode.is_routable() {
            return Err(SpatialError::UnroutableMode(mode));
        }
        let path = router.route(from, to, mode)?;
        let line: Vec<Coord> = path.into_iter().map(|p| projection.project(p)).collect();
        tracing::trace!(vertices = line.len(), %mode, "rasterising route");
        self.route_polyline(&line)
    }
}

/// Visit every cell crossed by the segment `a → b` (grid-space
/// `(row, col)` positions), endpoints included.
fn traverse_cells(a: (f64, f64), b: (f64, f64), visit: &mut impl FnMut(i64, i64)) {
    let (mut row, mut col) = (a.0.floor() as i64, a.1.floor() as i64);
    let (end_row, end_col) = (b.0.floor() as i64, b.1.floor() as i64);

    let d_row = b.0 - a.0;
    let d_col = b.1 - a.1;

    let axis = |d: f64, pos: f64, cell: i64| -> (i64, f64, f64) {
        if d > 0.0 {
            (1, ((cell + 1) as f64 - pos) / d, 1.0 / d)
        } else if d < 0.0 {
            (-1, (cell as f64 - pos) / d, -1.0 / d)
        } else {
            (0, f64::INFINITY, f64::INFINITY)
        }
    };
    let (step_row, mut t_row, dt_row) = axis(d_row, a.0, row);
    let (step_col, mut t_col, dt_col) = axis(d_col, a.1, col);

    visit(row, col);
    let steps = (end_row - row).abs() + (end_col - col).abs();
    for _ in 0..steps {
        if t_row < t_col {
            row += step_row;
            t_row += dt_row;
        } else {
            col += step_col;
            t_col += dt_col;
        }
        visit(row, col);
    }
}
