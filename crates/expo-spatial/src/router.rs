//! Routing trait and a straight-line default.
//!
//! # Pluggability
//!
//! Profiles ask for travel distance and duration, the resolver asks for the
//! geometry; both go through the [`Router`] trait so a real network router
//! can be swapped in without touching the engine.

use expo_core::{LonLat, TravelMode};

use crate::{SpatialError, SpatialResult};

/// Length and duration of one trip.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Trip {
    pub meters:  f64,
    pub minutes: f64,
}

/// Pluggable routing engine working in WGS-84.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`; one router is shared by all
/// worker threads of a realisation.
pub trait Router: Send + Sync {
    /// Travel distance and duration from `from` to `to`.
    fn distance(&self, from: LonLat, to: LonLat, mode: TravelMode) -> SpatialResult<Trip>;

    /// Ordered route vertices from `from` to `to`.
    fn route(&self, from: LonLat, to: LonLat, mode: TravelMode) -> SpatialResult<Vec<LonLat>>;
}

// ── StraightLineRouter ────────────────────────────────────────────────────────

/// Great-circle router with a fixed speed per mode.
///
/// | Mode                    | Speed     |
/// |-------------------------|-----------|
/// | Foot                    | 1.4 m/s   |
/// | Bike                    | 4.2 m/s   |
/// | Car                     | 13.9 m/s  |
/// | Train, PublicTransport  | 8.3 m/s   |
///
/// The route geometry is the two-vertex line between the end points.
pub struct StraightLineRouter;

impl StraightLineRouter {
    /// Speed in metres per second, or `None` for the out-of-band mode.
    pub fn speed_mps(mode: TravelMode) -> Option<f64> {
        match mode {
            TravelMode::Foot                               => Some(1.4),
            TravelMode::Bike                               => Some(4.2),
            TravelMode::Car                                => Some(13.9),
            TravelMode::Train | TravelMode::PublicTransport => Some(8.3),
            TravelMode::Unknown                            => None,
        }
    }
}

impl Router for StraightLineRouter {
    fn distance(&self, from: LonLat, to: LonLat, mode: TravelMode) -> SpatialResult<Trip> {
        let speed = Self::speed_mps(mode).ok_or(SpatialError::UnroutableMode(mode))?;
        let meters = from.distance_m(to);
        Ok(Trip { meters, minutes: meters / speed / 60.0 })
    }

    fn route(&self, from: LonLat, to: LonLat, mode: TravelMode) -> SpatialResult<Vec<LonLat>> {
        if !mode.is_routable() {
            return Err(SpatialError::UnroutableMode(mode));
        }
        Ok(vec![from, to])
    }
}
