//! Agenda time model.
//!
//! # Design
//!
//! Time inside a schedule is a monotonically increasing `Tick` counter.  The
//! mapping to wall-clock time is held in `AgendaClock`:
//!
//!   wall_time = start + tick * tick_secs
//!
//! Integer ticks keep every schedule and slice boundary exact, so the
//! partition invariants (durations summing to the agenda length) are checked
//! with `==` rather than a tolerance.
//!
//! The default tick is 60 s (1 simulated minute), which makes one day exactly
//! 1,440 ticks.

use std::fmt;

use chrono::{NaiveDateTime, Timelike};

use crate::{ExpoError, ExpoResult};

/// Wall-clock format used for every persisted timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute tick counter measured from the agenda clock start.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`, or `None` if `earlier > self`.
    #[inline]
    pub fn checked_since(self, earlier: Tick) -> Option<u64> {
        self.0.checked_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    /// # Panics
    /// Panics in debug mode if `rhs > self`; use [`Tick::checked_since`]
    /// where the order is not already established.
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── AgendaClock ───────────────────────────────────────────────────────────────

/// Converts between ticks and wall-clock timestamps.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgendaClock {
    /// Wall-clock time of tick 0 (typically the simulated day at 00:00).
    pub start: NaiveDateTime,
    /// Seconds per tick.  Must evenly divide 3600.
    pub tick_secs: u32,
}

impl AgendaClock {
    /// Create a clock, rejecting tick lengths that do not divide an hour.
    pub fn new(start: NaiveDateTime, tick_secs: u32) -> ExpoResult<Self> {
        if tick_secs == 0 || 3_600 % tick_secs != 0 {
            return Err(ExpoError::Config(format!(
                "tick length {tick_secs} s must be positive and divide 3600"
            )));
        }
        Ok(Self { start, tick_secs })
    }

    /// One-minute clock starting at `start`.
    pub fn minutes(start: NaiveDateTime) -> Self {
        Self { start, tick_secs: 60 }
    }

    /// Wall-clock time of `tick`.
    pub fn datetime(&self, tick: Tick) -> NaiveDateTime {
        self.start + chrono::Duration::seconds(tick.0 as i64 * self.tick_secs as i64)
    }

    /// Tick containing `at` (floored to the tick boundary).
    pub fn tick_at(&self, at: NaiveDateTime) -> ExpoResult<Tick> {
        let secs = at.signed_duration_since(self.start).num_seconds();
        if secs < 0 {
            return Err(ExpoError::BeforeClockStart(at));
        }
        Ok(Tick(secs as u64 / self.tick_secs as u64))
    }

    /// Wall-clock time of `tick`, floored to the whole hour.
    pub fn floor_to_hour(&self, tick: Tick) -> NaiveDateTime {
        let at = self.datetime(tick);
        at.date().and_hms_opt(at.hour(), 0, 0).unwrap_or(at)
    }

    /// Formatted wall-clock timestamp of `tick`.
    pub fn format(&self, tick: Tick) -> String {
        self.datetime(tick).format(TIMESTAMP_FORMAT).to_string()
    }

    // ── Tick-count helpers ────────────────────────────────────────────────

    /// How many ticks span `secs` seconds? (rounds up: a trip never ends early)
    #[inline]
    pub fn ticks_for_secs(&self, secs: u64) -> u64 {
        secs.div_ceil(self.tick_secs as u64)
    }

    /// Ticks covering `minutes` (fractional minutes round up).
    pub fn ticks_for_minutes(&self, minutes: f64) -> u64 {
        let secs = (minutes.max(0.0) * 60.0).ceil() as u64;
        self.ticks_for_secs(secs)
    }

    #[inline]
    pub fn ticks_per_hour(&self) -> u64 {
        3_600 / self.tick_secs as u64
    }

    #[inline]
    pub fn ticks_per_day(&self) -> u64 {
        86_400 / self.tick_secs as u64
    }

    /// Length of `ticks` in minutes.
    #[inline]
    pub fn to_minutes(&self, ticks: u64) -> f64 {
        ticks as f64 * self.tick_secs as f64 / 60.0
    }
}

impl fmt::Display for AgendaClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} s/tick)", self.start.format(TIMESTAMP_FORMAT), self.tick_secs)
    }
}

/// Parse a timestamp in [`TIMESTAMP_FORMAT`].
pub fn parse_timestamp(s: &str) -> ExpoResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
        .map_err(|e| ExpoError::Parse(format!("invalid timestamp {s:?}: {e}")))
}
