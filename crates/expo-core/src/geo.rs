//! Coordinate types.
//!
//! Two reference systems are in play: the projected system of the exposure
//! dataset (metres, [`Coord`]) and WGS-84 geographic coordinates used by the
//! routing collaborator ([`LonLat`]).  Both use `f64`; raster snapping
//! compares coordinates against cell edges and single precision would move
//! points across cell boundaries.

/// A coordinate in the exposure dataset's projected reference system.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Planar euclidean distance in the projected units.
    #[inline]
    pub fn distance(self, other: Coord) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: LonLat) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }
}

impl std::fmt::Display for LonLat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lon, self.lat)
    }
}

/// Axis-aligned bounding box in projected coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Envelope {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Envelope {
    /// Degenerate envelope around a single coordinate.
    pub fn of_point(p: Coord) -> Self {
        Self { min_x: p.x, max_x: p.x, min_y: p.y, max_y: p.y }
    }

    /// Smallest envelope containing every point, or `None` for an empty slice.
    pub fn of_points(points: &[Coord]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut env = Self::of_point(*first);
        for p in rest {
            env.min_x = env.min_x.min(p.x);
            env.max_x = env.max_x.max(p.x);
            env.min_y = env.min_y.min(p.y);
            env.max_y = env.max_y.max(p.y);
        }
        Some(env)
    }

    /// `true` if `other` lies entirely inside (or on the edge of) `self`.
    pub fn contains(&self, other: &Envelope) -> bool {
        self.min_x <= other.min_x
            && self.max_x >= other.max_x
            && self.min_y <= other.min_y
            && self.max_y >= other.max_y
    }
}
