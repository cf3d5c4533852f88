//! Reprojection of WGS-84 route vertices into the dataset's system.

use expo_core::{Coord, LonLat};

/// Forward projection from WGS-84 longitude/latitude.
pub trait Projection: Send + Sync {
    fn project(&self, p: LonLat) -> Coord;
}

/// Dutch national grid (EPSG:28992, "Rijksdriehoeksstelsel").
///
/// Polynomial approximation of the full transformation, accurate to well
/// under a metre inside the Netherlands, centred on Amersfoort.
pub struct RdNew;

impl RdNew {
    const PHI0: f64 = 52.155_174_40;
    const LAM0: f64 = 5.387_206_21;
    const X0:   f64 = 155_000.0;
    const Y0:   f64 = 463_000.0;
}

impl Projection for RdNew {
    fn project(&self, p: LonLat) -> Coord {
        let dp = 0.36 * (p.lat - Self::PHI0);
        let dl = 0.36 * (p.lon - Self::LAM0);

        let x = Self::X0
            + 190_094.945 * dl
            - 11_832.228 * dp * dl
            - 114.221 * dp.powi(2) * dl
            - 32.391 * dl.powi(3)
            - 0.705 * dp
            - 2.340 * dp.powi(3) * dl
            - 0.608 * dp * dl.powi(3)
            - 0.008 * dl.powi(2)
            + 0.148 * dp.powi(2) * dl.powi(3);

        let y = Self::Y0
            + 309_056.544 * dp
            + 3_638.893 * dl.powi(2)
            + 73.077 * dp.powi(2)
            - 157.984 * dp * dl.powi(2)
            + 59.788 * dp.powi(3)
            + 0.433 * dl
            - 6.439 * dp.powi(2) * dl.powi(2)
            - 0.032 * dp * dl
            + 0.092 * dl.powi(4)
            - 0.054 * dp * dl.powi(4);

        Coord::new(x, y)
    }
}

/// Datasets gridded directly in degrees: `x = lon`, `y = lat`.
pub struct LonLatIdentity;

impl Projection for LonLatIdentity {
    #[inline]
    fn project(&self, p: LonLat) -> Coord {
        Coord::new(p.lon, p.lat)
    }
}

/// Configuration-level projection choice.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ProjectionKind {
    #[default]
    RdNew,
    LonLat,
}

impl Projection for ProjectionKind {
    fn project(&self, p: LonLat) -> Coord {
        match self {
            ProjectionKind::RdNew  => RdNew.project(p),
            ProjectionKind::LonLat => LonLatIdentity.project(p),
        }
    }
}
