//! Origin–destination zone selection.
//!
//! # CSV format
//!
//! A square-ish matrix: the header row lists destination zones, the first
//! column origin zones, cells are non-negative weights.  Empty cells are
//! dropped and each row is normalised by its sum.
//!
//! ```csv
//! origin,3511,3512,3513
//! 3511,120,30,
//! 3512,15,200,5
//! ```

use std::io::Read;
use std::path::Path;

use rand::distributions::{Distribution, WeightedIndex};
use rustc_hash::FxHashMap;

use expo_core::{AgentRng, ZoneId};

use crate::{ProfileError, ProfileResult};

/// Draws a destination zone for an origin zone.
///
/// The RNG is the caller's per-agent RNG, so draws stay deterministic under
/// parallel execution.
pub trait OriginDestinationSelector: Send + Sync {
    /// Destination for `origin`, or `None` when the origin is unknown.
    fn obtain(&self, origin: ZoneId, rng: &mut AgentRng) -> Option<ZoneId>;
}

struct OdRow {
    destinations: Vec<ZoneId>,
    weights:      WeightedIndex<f64>,
}

/// Precomputed weighted OD table.
pub struct OdTable {
    rows: FxHashMap<ZoneId, OdRow>,
}

impl OdTable {
    /// Build from `(origin, [(destination, weight)])` rows.
    ///
    /// Rows whose weights are all zero are skipped; their origins behave
    /// as unknown.
    pub fn from_rows<I>(rows: I) -> ProfileResult<Self>
    where
        I: IntoIterator<Item = (ZoneId, Vec<(ZoneId, f64)>)>,
    {
        let mut table = FxHashMap::default();
        for (origin, cells) in rows {
            if let Some(bad) = cells.iter().find(|(_, w)| !(w.is_finite() && *w >= 0.0)) {
                return Err(ProfileError::Parse(format!(
                    "OD weight {} for {origin} → {} is invalid",
                    bad.1, bad.0
                )));
            }
            let (destinations, weights): (Vec<ZoneId>, Vec<f64>) = cells.into_iter().unzip();
            match WeightedIndex::new(&weights) {
                Ok(weights) => {
                    table.insert(origin, OdRow { destinations, weights });
                }
                Err(_) => tracing::warn!(%origin, "OD row has no positive weight, skipped"),
            }
        }
        Ok(Self { rows: table })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl OriginDestinationSelector for OdTable {
    fn obtain(&self, origin: ZoneId, rng: &mut AgentRng) -> Option<ZoneId> {
        let row = self.rows.get(&origin)?;
        Some(row.destinations[row.weights.sample(rng.inner())])
    }
}

/// Load an [`OdTable`] from a CSV file.
pub fn load_od_csv(path: &Path) -> ProfileResult<OdTable> {
    let file = std::fs::File::open(path)?;
    load_od_reader(file)
}

/// Like [`load_od_csv`] but accepts any `Read` source.
pub fn load_od_reader<R: Read>(reader: R) -> ProfileResult<OdTable> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let parse_zone = |s: &str| -> ProfileResult<ZoneId> {
        s.trim()
            .parse::<u32>()
            .map(ZoneId)
            .map_err(|_| ProfileError::Parse(format!("invalid zone id {s:?}")))
    };

    let headers = csv_reader.headers().map_err(|e| ProfileError::Parse(e.to_string()))?;
    let destinations: Vec<ZoneId> = headers.iter().skip(1).map(parse_zone).collect::<ProfileResult<_>>()?;

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|e| ProfileError::Parse(e.to_string()))?;
        let Some(origin) = record.get(0) else { continue };
        let origin = parse_zone(origin)?;

        let mut cells = Vec::new();
        for (dest, cell) in destinations.iter().zip(record.iter().skip(1)) {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            let w = cell
                .parse::<f64>()
                .map_err(|_| ProfileError::Parse(format!("invalid OD weight {cell:?}")))?;
            cells.push((*dest, w));
        }
        rows.push((origin, cells));
    }

    OdTable::from_rows(rows)
}
