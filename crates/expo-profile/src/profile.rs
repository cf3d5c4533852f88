//! The `Profile` trait and the shared context profiles draw from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use expo_core::{AgendaClock, AgentRng, Tick};
use expo_schedule::Schedule;
use expo_spatial::Router;

use crate::{
    CommuterWorkday, HomemakerBuffer, LocationRecord, LocationRegistry,
    OriginDestinationSelector, ProfileError, ProfileResult,
};

/// Read-only collaborators shared by every agent of a realisation.
pub struct ProfileContext<'a> {
    pub registry:       &'a LocationRegistry,
    /// `None` when the run has no OD table; commuters then work in their
    /// home zone.
    pub od:             Option<&'a dyn OriginDestinationSelector>,
    pub router:         &'a dyn Router,
    pub clock:          AgendaClock,
    pub agenda_start:   Tick,
    pub agenda_end:     Tick,
    /// Radius of the leisure buffer in metres.
    pub leisure_radius: f64,
}

impl ProfileContext<'_> {
    /// Whole ticks covering `minutes`.
    #[inline]
    pub fn ticks(&self, minutes: f64) -> u64 {
        self.clock.ticks_for_minutes(minutes)
    }
}

/// Pluggable schedule generator.
///
/// # Thread safety
///
/// The pipeline calls [`build`][Self::build] for many agents in parallel, so
/// implementations must be `Send + Sync` and keep per-agent state on the
/// stack or in the supplied RNG.
pub trait Profile: Send + Sync {
    /// Artifact name stem, e.g. `commuter_workday`.
    fn name(&self) -> &'static str;

    /// Exposure variables sampled for agents of this profile.
    fn variables(&self) -> Vec<String>;

    /// One agent's schedule over the context's agenda.
    fn build(
        &self,
        home: &LocationRecord,
        ctx:  &ProfileContext<'_>,
        rng:  &mut AgentRng,
    ) -> ProfileResult<Schedule>;
}

/// Which variable set a day samples.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    Workday,
    Weekend,
}

/// `NO2_hour_weekday`, `PM25_hour_weekday`, `noise`.
pub fn weekday_variables() -> Vec<String> {
    ["NO2_hour_weekday", "PM25_hour_weekday", "noise"].map(String::from).to_vec()
}

/// `NO2_hour_weekend`, `PM25_hour_weekend`, `noise`.
pub fn weekend_variables() -> Vec<String> {
    ["NO2_hour_weekend", "PM25_hour_weekend", "noise"].map(String::from).to_vec()
}

// ── ProfileKind ───────────────────────────────────────────────────────────────

/// The built-in profiles, selectable by name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    HomemakerBufferWorkday,
    HomemakerBufferWeekend,
    CommuterWorkday,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 3] = [
        ProfileKind::HomemakerBufferWorkday,
        ProfileKind::HomemakerBufferWeekend,
        ProfileKind::CommuterWorkday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProfileKind::HomemakerBufferWorkday => "homemaker_buffer_workday",
            ProfileKind::HomemakerBufferWeekend => "homemaker_buffer_weekend",
            ProfileKind::CommuterWorkday        => "commuter_workday",
        }
    }

    /// Instantiate with default parameters.
    pub fn instantiate(self) -> Box<dyn Profile> {
        match self {
            ProfileKind::HomemakerBufferWorkday => Box::new(HomemakerBuffer::new(DayKind::Workday)),
            ProfileKind::HomemakerBufferWeekend => Box::new(HomemakerBuffer::new(DayKind::Weekend)),
            ProfileKind::CommuterWorkday        => Box::new(CommuterWorkday::default()),
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileKind {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ProfileError::UnknownProfile(s.to_owned()))
    }
}
