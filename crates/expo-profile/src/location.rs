//! Home and work location registry.
//!
//! # CSV format
//!
//! Homes and work locations use the same layout; `x`/`y` are in the
//! exposure dataset's projected system, `lon`/`lat` in WGS-84.
//!
//! ```csv
//! id,zone,x,y,lon,lat
//! 0,3511,136942.1,455871.3,5.121420,52.090737
//! 1,3511,137005.8,455902.0,5.122350,52.091020
//! ```

use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use expo_core::{AgentId, Coord, LocationId, LonLat, ZoneId};

use crate::{ProfileError, ProfileResult};

/// One building with coordinates in both reference systems.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LocationRecord {
    pub id:         LocationId,
    pub zone:       ZoneId,
    pub projected:  Coord,
    pub geographic: LonLat,
}

impl LocationRecord {
    /// Agents are identified by their home record.
    #[inline]
    pub fn agent(&self) -> AgentId {
        AgentId(self.id.0)
    }
}

/// Home records plus work records indexed by zone.
pub struct LocationRegistry {
    homes:        Vec<LocationRecord>,
    work:         Vec<LocationRecord>,
    work_by_zone: FxHashMap<ZoneId, Vec<LocationRecord>>,
}

impl LocationRegistry {
    pub fn new(homes: Vec<LocationRecord>, work: Vec<LocationRecord>) -> Self {
        let mut work_by_zone: FxHashMap<ZoneId, Vec<LocationRecord>> = FxHashMap::default();
        for w in &work {
            work_by_zone.entry(w.zone).or_default().push(*w);
        }
        tracing::debug!(homes = homes.len(), work = work.len(), zones = work_by_zone.len(), "location registry built");
        Self { homes, work, work_by_zone }
    }

    pub fn homes(&self) -> &[LocationRecord] {
        &self.homes
    }

    pub fn work(&self) -> &[LocationRecord] {
        &self.work
    }

    /// Work locations in `zone`; empty for an unknown zone.
    pub fn work_in_zone(&self, zone: ZoneId) -> &[LocationRecord] {
        self.work_by_zone.get(&zone).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Keep only the first `n` homes (smoke runs).
    pub fn truncate_homes(&mut self, n: usize) {
        self.homes.truncate(n);
    }
}

#[derive(Deserialize)]
struct LocationRow {
    id:   u32,
    zone: u32,
    x:    f64,
    y:    f64,
    lon:  f64,
    lat:  f64,
}

/// Load location records from a CSV file.
pub fn load_locations_csv(path: &Path) -> ProfileResult<Vec<LocationRecord>> {
    let file = std::fs::File::open(path)?;
    load_locations_reader(file)
}

/// Like [`load_locations_csv`] but accepts any `Read` source.
pub fn load_locations_reader<R: Read>(reader: R) -> ProfileResult<Vec<LocationRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<LocationRow>()
        .map(|row| {
            let r = row.map_err(|e| ProfileError::Parse(e.to_string()))?;
            Ok(LocationRecord {
                id:         LocationId(r.id),
                zone:       ZoneId(r.zone),
                projected:  Coord::new(r.x, r.y),
                geographic: LonLat::new(r.lon, r.lat),
            })
        })
        .collect()
}
