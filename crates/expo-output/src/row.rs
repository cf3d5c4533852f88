//! Plain data row types written by output backends.
//!
//! Variable values are `None` for missing; backends write them as an empty
//! CSV cell, SQL `NULL` or a Parquet null.

use expo_core::AgendaClock;
use expo_exposure::{DailySummary, WeeklyRecord};
use expo_sim::AgentExposure;

/// One time slice of one activity.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceRow {
    /// Running number within the artifact.
    pub slice_id:             u64,
    pub agent_id:             u32,
    pub activity_idx:         u32,
    /// `YYYY-MM-DD HH:MM:SS`.
    pub time_start:           String,
    pub time_end:             String,
    pub activity_group:       i32,
    pub activity_description: i32,
    /// Mode code for route activities, `None` otherwise.
    pub travel_mode:          Option<i32>,
    /// Persisted values: out-of-band routes carry the `-7` marker.
    pub values:               Vec<Option<f64>>,
}

/// One scheduled activity.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRow {
    pub agent_id:             u32,
    pub act_idx:              u32,
    /// Minutes.
    pub duration:             f64,
    pub activity_type:        i32,
    pub activity_description: i32,
    pub commute_mode:         Option<i32>,
    pub values:               Vec<Option<f64>>,
}

/// One agent's day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRow {
    pub agent_id: u32,
    pub values:   Vec<Option<f64>>,
}

/// One agent's weekly value per realisation plus statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyRow {
    pub agent_id:     u32,
    pub realisations: Vec<Option<f64>>,
    pub mean:         Option<f64>,
    pub std:          Option<f64>,
    pub var:          Option<f64>,
    pub min:          Option<f64>,
    pub max:          Option<f64>,
}

// ── Conversions ───────────────────────────────────────────────────────────────

/// Slice rows of one agent, numbered from `first_id`.
pub fn slice_rows(exposure: &AgentExposure, clock: &AgendaClock, first_id: u64) -> Vec<SliceRow> {
    let acts = exposure.schedule.activities();
    exposure
        .slices
        .iter()
        .zip(first_id..)
        .filter_map(|(s, slice_id)| {
            let act = acts.iter().find(|a| a.ordinal == s.slice.activity)?;
            Some(SliceRow {
                slice_id,
                agent_id:             exposure.agent.get(),
                activity_idx:         act.ordinal,
                time_start:           clock.format(s.slice.start),
                time_end:             clock.format(s.slice.end),
                activity_group:       act.footprint.group().code(),
                activity_description: act.kind.code(),
                travel_mode:          act.footprint.travel_mode().map(|m| m.code()),
                values:               s.values.iter().map(|v| v.persisted()).collect(),
            })
        })
        .collect()
}

/// Activity rows of one agent, in schedule order.
pub fn activity_rows(exposure: &AgentExposure, clock: &AgendaClock) -> Vec<ActivityRow> {
    exposure
        .activities
        .iter()
        .map(|a| ActivityRow {
            agent_id:             a.agent.get(),
            act_idx:              a.ordinal,
            duration:             clock.to_minutes(a.duration()),
            activity_type:        a.group.code(),
            activity_description: a.kind.code(),
            commute_mode:         a.travel_mode.map(|m| m.code()),
            values:               a.values.clone(),
        })
        .collect()
}

impl From<&DailySummary> for DailyRow {
    fn from(d: &DailySummary) -> Self {
        Self { agent_id: d.agent.get(), values: d.values.clone() }
    }
}

impl From<&WeeklyRecord> for WeeklyRow {
    fn from(r: &WeeklyRecord) -> Self {
        let stat = |f: fn(&expo_exposure::Stats) -> f64| r.stats.as_ref().map(f);
        Self {
            agent_id:     r.agent.get(),
            realisations: r.realisations.clone(),
            mean:         stat(|s| s.mean),
            std:          stat(|s| s.std),
            var:          stat(|s| s.var),
            min:          stat(|s| s.min),
            max:          stat(|s| s.max),
        }
    }
}
