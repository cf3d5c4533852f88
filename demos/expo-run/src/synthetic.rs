//! Synthetic city around Amersfoort, used when no input directory is given.
//!
//! A 10 km × 10 km grid of 100 m cells in RD New coordinates, four zones
//! (the quadrants around the centre), homes and work locations scattered
//! within 3.5 km of the centre, and hourly air quality and noise layers that
//! peak in the centre and during the rush hours.

use anyhow::Result;
use chrono::Duration;

use expo_core::{AgentId, AgentRng, Coord, LocationId, LonLat, Tick, ZoneId};
use expo_exposure::{Grid, RasterCube, RasterCubeBuilder};
use expo_profile::{LocationRecord, LocationRegistry, OdTable, weekday_variables, weekend_variables};
use expo_sim::PipelineConfig;
use expo_spatial::{GridExtent, Projection, RdNew};

use crate::inputs::Inputs;

// ── Constants ─────────────────────────────────────────────────────────────────

const CENTRE:      LonLat = LonLat { lon: 5.387_206, lat: 52.155_174 };
const CENTRE_RD:   Coord  = Coord { x: 155_000.0, y: 463_000.0 };
const CELL:        f64    = 100.0;
const CELLS:       usize  = 100;
/// Half-widths of the settled area in degrees (about 3.4 km × 3.3 km).
const SPREAD_LON:  f64    = 0.05;
const SPREAD_LAT:  f64    = 0.03;
const WORK_COUNT:  usize  = 120;
/// Keeps work-location draws independent of home draws.
const WORK_SALT:   u64    = 0x5EED_0F_3A9E;
const ZONES:       [u32; 4] = [1, 2, 3, 4];

fn zone_of(p: Coord) -> ZoneId {
    let east = u32::from(p.x >= CENTRE_RD.x);
    let north = u32::from(p.y >= CENTRE_RD.y);
    ZoneId(1 + east + 2 * north)
}

fn scatter(seed: u64, count: usize) -> Vec<LocationRecord> {
    (0..count as u32)
        .map(|i| {
            let mut rng = AgentRng::new(seed, 0, AgentId(i));
            let geographic = LonLat::new(
                CENTRE.lon + rng.gen_range(-SPREAD_LON..SPREAD_LON),
                CENTRE.lat + rng.gen_range(-SPREAD_LAT..SPREAD_LAT),
            );
            let projected = RdNew.project(geographic);
            LocationRecord { id: LocationId(i), zone: zone_of(projected), projected, geographic }
        })
        .collect()
}

/// Own zone four times as likely as each other zone.
fn od_table() -> Result<OdTable> {
    let rows = ZONES.map(|o| {
        let cells = ZONES.map(|d| (ZoneId(d), if o == d { 4.0 } else { 1.0 })).to_vec();
        (ZoneId(o), cells)
    });
    Ok(OdTable::from_rows(rows)?)
}

fn extent() -> Result<GridExtent> {
    let half = CELL * CELLS as f64 / 2.0;
    Ok(GridExtent::new(CENTRE_RD.x - half, CENTRE_RD.y + half, CELL, CELL, CELLS, CELLS)?)
}

/// `(background, centre excess)` of a variable.
fn levels(variable: &str) -> (f64, f64) {
    match variable {
        v if v.starts_with("NO2")  => (18.0, 22.0),
        v if v.starts_with("PM25") => (9.0, 4.0),
        _                          => (45.0, 20.0),
    }
}

/// Rush-hour bumps at 08:00 and 17:00.
fn diurnal(hour: u32) -> f64 {
    let bump = |peak: f64| (-((hour as f64 - peak) / 2.0).powi(2)).exp();
    0.7 + 0.4 * bump(8.0) + 0.4 * bump(17.0)
}

fn layer(extent: &GridExtent, variable: &str, hour: u32) -> Result<Grid> {
    let (background, excess) = levels(variable);
    let weekend = if variable.ends_with("weekend") { 0.8 } else { 1.0 };
    let sigma = 2_500.0;

    let mut values = Vec::with_capacity(extent.cell_count());
    for row in 0..extent.rows {
        for col in 0..extent.cols {
            let d = extent.cell_center(row, col).distance(CENTRE_RD);
            let spatial = background + excess * (-(d / sigma).powi(2)).exp();
            values.push((spatial * diurnal(hour) * weekend) as f32);
        }
    }
    Ok(Grid::new(extent.rows, extent.cols, values)?)
}

fn cube(config: &PipelineConfig) -> Result<RasterCube> {
    let extent = extent()?;
    let clock = config.clock()?;
    let first = clock.floor_to_hour(Tick(0));
    let hours = config.agenda_minutes.div_ceil(60).max(1);

    let mut variables = weekday_variables();
    for v in weekend_variables() {
        if !variables.contains(&v) {
            variables.push(v);
        }
    }

    let mut b = RasterCubeBuilder::new(extent);
    for v in &variables {
        for h in 0..hours {
            let at = first + Duration::hours(h as i64);
            b.layer(v, at, layer(&extent, v, (h % 24) as u32)?);
        }
    }
    Ok(b.build()?)
}

/// Synthetic inputs with `homes` agents; an OD table when `od` is given.
pub fn city(config: &PipelineConfig, homes: usize, od: Option<u32>) -> Result<Inputs> {
    let registry = LocationRegistry::new(scatter(config.seed, homes), scatter(config.seed ^ WORK_SALT, WORK_COUNT));
    let od = od.map(|_| od_table()).transpose()?;
    let cube = cube(config)?;
    tracing::info!(homes, work = WORK_COUNT, cells = CELLS * CELLS, "synthetic city generated");
    Ok(Inputs { registry, cube, od })
}
