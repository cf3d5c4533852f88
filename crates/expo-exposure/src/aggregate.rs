//! Duration-weighted per-activity and per-day aggregation.
//!
//! Both levels use `Σ(value × slice_duration) / divisor`.  A single missing
//! slice value makes the aggregate it contributes to missing; other
//! variables and other activities are unaffected.

use expo_core::{AgendaClock, AgentId, Tick, TravelMode};
use expo_schedule::{ActivityGroup, ActivityKind, Schedule};

use crate::SampledSlice;

/// Duration-weighted exposure of one activity.
#[derive(Clone, Debug, PartialEq)]
pub struct ActivityExposure {
    pub agent:       AgentId,
    pub ordinal:     u32,
    pub kind:        ActivityKind,
    pub group:       ActivityGroup,
    pub travel_mode: Option<TravelMode>,
    pub start:       Tick,
    pub end:         Tick,
    pub values:      Vec<Option<f64>>,
}

impl ActivityExposure {
    #[inline]
    pub fn duration(&self) -> u64 {
        self.end - self.start
    }
}

/// One agent's day, one value per variable.
#[derive(Clone, Debug, PartialEq)]
pub struct DailySummary {
    pub agent:  AgentId,
    pub values: Vec<Option<f64>>,
}

/// Collapses sampled slices into activity and day values.
#[derive(Copy, Clone, Debug)]
pub struct ActivityAggregator {
    day_ticks: u64,
}

impl ActivityAggregator {
    /// `day_ticks` is the daily divisor (1440 on a one-minute clock).
    pub fn new(day_ticks: u64) -> Self {
        Self { day_ticks: day_ticks.max(1) }
    }

    pub fn from_clock(clock: &AgendaClock) -> Self {
        Self::new(clock.ticks_per_day())
    }

    /// One entry per scheduled activity, in schedule order.
    pub fn activities(
        &self,
        schedule:  &Schedule,
        sampled:   &[SampledSlice],
        variables: usize,
    ) -> Vec<ActivityExposure> {
        let mut rest = sampled;
        schedule
            .activities()
            .iter()
            .map(|act| {
                let n = rest.iter().take_while(|s| s.slice.activity == act.ordinal).count();
                let (mine, tail) = rest.split_at(n);
                rest = tail;

                let duration = act.duration() as f64;
                let values = weighted_sums(mine, variables)
                    .into_iter()
                    .map(|s| s.map(|s| s / duration))
                    .collect();

                ActivityExposure {
                    agent:       schedule.agent(),
                    ordinal:     act.ordinal,
                    kind:        act.kind,
                    group:       act.footprint.group(),
                    travel_mode: act.footprint.travel_mode(),
                    start:       act.start,
                    end:         act.end,
                    values,
                }
            })
            .collect()
    }

    /// Day value over all of the agent's slices.
    pub fn daily(&self, agent: AgentId, sampled: &[SampledSlice], variables: usize) -> DailySummary {
        let day = self.day_ticks as f64;
        let values = weighted_sums(sampled, variables)
            .into_iter()
            .map(|s| s.map(|s| s / day))
            .collect();
        DailySummary { agent, values }
    }
}

/// `Σ(value × duration)` per variable; `None` once any input is missing.
fn weighted_sums(slices: &[SampledSlice], variables: usize) -> Vec<Option<f64>> {
    let mut sums = vec![Some(0.0f64); variables];
    for s in slices {
        let d = s.slice.duration() as f64;
        for (i, acc) in sums.iter_mut().enumerate() {
            let v = s.values.get(i).and_then(|v| v.value());
            *acc = match (*acc, v) {
                (Some(a), Some(v)) => Some(a + v * d),
                _ => None,
            };
        }
    }
    sums
}
