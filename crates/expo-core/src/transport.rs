//! Travel mode enum shared by the schedule, spatial and output crates.

/// The means by which an agent travels during a route activity.
///
/// `Unknown` is the out-of-band sentinel: route activities carrying it are
/// not routed or sampled, and receive a fixed marker value instead.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TravelMode {
    #[default]
    Unknown,
    Car,
    Bike,
    Foot,
    Train,
    PublicTransport,
}

impl TravelMode {
    /// Integer code used in persisted artifacts.
    pub fn code(self) -> i32 {
        match self {
            TravelMode::Unknown         => -1,
            TravelMode::Car             => 0,
            TravelMode::Bike            => 1,
            TravelMode::Foot            => 2,
            TravelMode::Train           => 3,
            TravelMode::PublicTransport => 4,
        }
    }

    /// Inverse of [`code`][Self::code].  Unrecognised codes map to `Unknown`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => TravelMode::Car,
            1 => TravelMode::Bike,
            2 => TravelMode::Foot,
            3 => TravelMode::Train,
            4 => TravelMode::PublicTransport,
            _ => TravelMode::Unknown,
        }
    }

    /// `false` for the out-of-band sentinel.
    #[inline]
    pub fn is_routable(self) -> bool {
        !matches!(self, TravelMode::Unknown)
    }

    /// Human-readable label, useful for log lines and CSV values.
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Unknown         => "unknown",
            TravelMode::Car             => "car",
            TravelMode::Bike            => "bike",
            TravelMode::Foot            => "foot",
            TravelMode::Train           => "train",
            TravelMode::PublicTransport => "public_transport",
        }
    }
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
