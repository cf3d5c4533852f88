//! Activity types: what an agent does, where, and for how long.
//!
//! # Variant model
//!
//! An activity is the product of two independent choices:
//!
//! - a [`Footprint`]: the spatial query it is sampled with: a single
//!   enclosing cell (`Point`), a disc (`Buffer`), or a routed polyline
//!   (`Route`);
//! - a [`Timing`] rule: how its end is computed from the scheduler's
//!   cursor: a fixed number of ticks, whatever remains of the agenda, or an
//!   externally supplied travel duration.
//!
//! Both are plain enums, so every consumer matches exhaustively and there is
//! no "unknown" fallback branch.

use expo_core::{Coord, LonLat, Tick, TravelMode};

// ── Descriptions and codes ────────────────────────────────────────────────────

/// What the agent is doing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActivityKind {
    Home,
    Work,
    CommuteHomeToWork,
    CommuteWorkToHome,
    Leisure,
}

impl ActivityKind {
    /// Integer code used in persisted artifacts.
    pub fn code(self) -> i32 {
        match self {
            ActivityKind::Home              => 1,
            ActivityKind::Work              => 2,
            ActivityKind::CommuteHomeToWork => 3,
            ActivityKind::CommuteWorkToHome => 4,
            ActivityKind::Leisure           => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::Home              => "home",
            ActivityKind::Work              => "work",
            ActivityKind::CommuteHomeToWork => "commute_home_to_work",
            ActivityKind::CommuteWorkToHome => "commute_work_to_home",
            ActivityKind::Leisure           => "leisure",
        }
    }
}

/// Spatial query family, as persisted in the `activity_group` column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ActivityGroup {
    Point,
    Buffer,
    Route,
}

impl ActivityGroup {
    pub fn code(self) -> i32 {
        match self {
            ActivityGroup::Point  => 1,
            ActivityGroup::Buffer => 2,
            ActivityGroup::Route  => 3,
        }
    }
}

/// How masked raster cells of a buffer are combined into one value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BufferMethod {
    /// Algebraic sum of the valid cells.
    Sum,
    /// Arithmetic mean of the valid cells.
    #[default]
    Mean,
}

impl BufferMethod {
    pub fn code(self) -> i32 {
        match self {
            BufferMethod::Sum  => 1,
            BufferMethod::Mean => 2,
        }
    }
}

// ── Footprint ─────────────────────────────────────────────────────────────────

/// The geometry an activity is sampled with.
///
/// Point and buffer locations are in the dataset's projected system; route
/// end points are geographic because the routing collaborator works in
/// WGS-84.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Footprint {
    Point { at: Coord },
    Buffer { at: Coord, radius: f64, method: BufferMethod },
    Route { from: LonLat, to: LonLat, mode: TravelMode },
}

impl Footprint {
    pub fn group(&self) -> ActivityGroup {
        match self {
            Footprint::Point { .. }  => ActivityGroup::Point,
            Footprint::Buffer { .. } => ActivityGroup::Buffer,
            Footprint::Route { .. }  => ActivityGroup::Route,
        }
    }

    /// Travel mode of a route footprint; `None` for stationary footprints.
    pub fn travel_mode(&self) -> Option<TravelMode> {
        match self {
            Footprint::Route { mode, .. } => Some(*mode),
            Footprint::Point { .. } | Footprint::Buffer { .. } => None,
        }
    }
}

// ── Timing ────────────────────────────────────────────────────────────────────

/// Rule for computing an activity's end from the scheduler cursor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Timing {
    /// Lasts exactly this many ticks.
    Fixed(u64),
    /// Lasts until the agenda end.
    FillsRemaining,
    /// Lasts for a travel duration supplied by the routing collaborator,
    /// already converted to ticks.
    Travel(u64),
}

impl Timing {
    /// End tick of an activity that starts at `cursor`.
    #[inline]
    pub fn compute_end(self, cursor: Tick, agenda_end: Tick) -> Tick {
        match self {
            Timing::Fixed(ticks) | Timing::Travel(ticks) => cursor + ticks,
            Timing::FillsRemaining => agenda_end,
        }
    }
}

// ── Descriptor ────────────────────────────────────────────────────────────────

/// An unscheduled activity: kind, footprint and timing rule.
///
/// Descriptors are handed to [`ActivityScheduler`][crate::ActivityScheduler]
/// in chronological order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActivityDescriptor {
    pub kind:      ActivityKind,
    pub footprint: Footprint,
    pub timing:    Timing,
}

impl ActivityDescriptor {
    pub fn point(kind: ActivityKind, at: Coord, timing: Timing) -> Self {
        Self { kind, footprint: Footprint::Point { at }, timing }
    }

    /// Buffer aggregated with [`BufferMethod::Mean`].
    pub fn buffer(kind: ActivityKind, at: Coord, radius: f64, timing: Timing) -> Self {
        Self::buffer_with(kind, at, radius, BufferMethod::Mean, timing)
    }

    pub fn buffer_with(
        kind:   ActivityKind,
        at:     Coord,
        radius: f64,
        method: BufferMethod,
        timing: Timing,
    ) -> Self {
        Self { kind, footprint: Footprint::Buffer { at, radius, method }, timing }
    }

    /// A commute between two geographic points lasting `travel_ticks`.
    pub fn commute(
        kind:         ActivityKind,
        from:         LonLat,
        to:           LonLat,
        mode:         TravelMode,
        travel_ticks: u64,
    ) -> Self {
        Self {
            kind,
            footprint: Footprint::Route { from, to, mode },
            timing:    Timing::Travel(travel_ticks),
        }
    }
}

// ── ScheduledActivity ─────────────────────────────────────────────────────────

/// A descriptor placed on the agenda with absolute `[start, end)` bounds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduledActivity {
    /// Position in the agent's schedule, starting at 0.  Downstream
    /// consumers key per-activity output by this ordinal.
    pub ordinal:   u32,
    pub kind:      ActivityKind,
    pub footprint: Footprint,
    pub start:     Tick,
    pub end:       Tick,
}

impl ScheduledActivity {
    #[inline]
    pub fn duration(&self) -> u64 {
        self.end - self.start
    }
}
