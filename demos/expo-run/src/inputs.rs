//! Run inputs: locations, OD table and exposure cube.
//!
//! An input directory holds:
//!
//! | File            | Content                                               |
//! |-----------------|-------------------------------------------------------|
//! | `extent.json`   | `{min_x, max_y, cell_x, cell_y, rows, cols}`          |
//! | `homes.csv`     | `id,zone,x,y,lon,lat`                                 |
//! | `work.csv`      | same columns; optional, commuters only                |
//! | `cube.csv`      | `variable,timestep,row,col,value`                     |
//! | `odNN.csv`      | OD weights, selected with `--arg NN`                  |
//!
//! Without `--inputs` the run uses the synthetic city from
//! [`crate::synthetic`].

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use expo_exposure::{RasterCube, load_cube_csv};
use expo_profile::{LocationRegistry, OdTable, load_locations_csv, load_od_csv};
use expo_spatial::GridExtent;

pub struct Inputs {
    pub registry: LocationRegistry,
    pub cube:     RasterCube,
    pub od:       Option<OdTable>,
}

#[derive(Deserialize)]
struct ExtentFile {
    min_x:  f64,
    max_y:  f64,
    cell_x: f64,
    cell_y: f64,
    rows:   usize,
    cols:   usize,
}

/// Load every input from `dir`; `od` selects `od<NN>.csv`.
pub fn load(dir: &Path, od: Option<u32>) -> Result<Inputs> {
    let extent_path = dir.join("extent.json");
    let json = std::fs::read_to_string(&extent_path)
        .with_context(|| format!("reading {}", extent_path.display()))?;
    let e: ExtentFile = serde_json::from_str(&json)
        .with_context(|| format!("parsing {}", extent_path.display()))?;
    let extent = GridExtent::new(e.min_x, e.max_y, e.cell_x, e.cell_y, e.rows, e.cols)?;

    let homes = load_locations_csv(&dir.join("homes.csv")).context("loading homes.csv")?;
    let work_path = dir.join("work.csv");
    let work = if work_path.is_file() {
        load_locations_csv(&work_path).context("loading work.csv")?
    } else {
        Vec::new()
    };

    let cube = load_cube_csv(&dir.join("cube.csv"), extent).context("loading cube.csv")?;

    let od = match od {
        Some(id) => {
            let name = format!("od{id:02}.csv");
            Some(load_od_csv(&dir.join(&name)).with_context(|| format!("loading {name}"))?)
        }
        None => None,
    };

    tracing::info!(
        dir = %dir.display(),
        homes = homes.len(),
        work = work.len(),
        od = od.as_ref().map_or(0, OdTable::len),
        "inputs loaded"
    );
    Ok(Inputs { registry: LocationRegistry::new(homes, work), cube, od })
}
