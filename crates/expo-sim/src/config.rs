//! Run configuration, loadable from JSON.
//!
//! Every field has a default, so a config file only lists what it changes:
//!
//! ```json
//! { "seed": 7, "workers": 4, "failure_policy": "abort_run" }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use expo_core::{AgendaClock, Tick, parse_timestamp};
use expo_exposure::QualityRule;
use expo_spatial::ProjectionKind;

use crate::{SimError, SimResult};

/// What happens to a realisation when one agent's pipeline fails.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The first failing agent (in `AgentId` order) aborts the realisation.
    AbortRun,
    /// The agent is logged, reported to the observer and left out of the
    /// artifacts; the realisation continues.
    #[default]
    IsolateAgent,
}

/// Global configuration of a pipeline run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Wall-clock time of tick 0, `YYYY-MM-DD HH:MM:SS`.
    pub agenda_start: String,

    /// Agenda length.  Default: one day.
    pub agenda_minutes: u64,

    /// Seconds per tick.  Must divide 3600.  Default: 60.
    pub tick_secs: u32,

    /// Master seed; with the realisation index and agent id it fixes every
    /// random draw.
    pub seed: u64,

    /// Worker thread count for the per-agent phase.  `None` uses all logical
    /// cores.  Ignored without the `parallel` feature.
    pub workers: Option<usize>,

    pub failure_policy: FailurePolicy,

    pub quality: QualityRule,

    /// Overrides the profile's own variable list.
    pub variables: Option<Vec<String>>,

    /// Leisure buffer radius in metres.
    pub leisure_radius: f64,

    /// Reprojection from geographic route vertices to dataset coordinates.
    pub projection: ProjectionKind,

    /// Log progress every N finished agents; 0 disables.
    pub progress_every: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            agenda_start:   "2020-07-01 00:00:00".to_owned(),
            agenda_minutes: 24 * 60,
            tick_secs:      60,
            seed:           42,
            workers:        None,
            failure_policy: FailurePolicy::default(),
            quality:        QualityRule::default(),
            variables:      None,
            leisure_radius: 500.0,
            projection:     ProjectionKind::default(),
            progress_every: 1_000,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> SimResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject values that cannot describe a run.
    pub fn validate(&self) -> SimResult<()> {
        if self.agenda_minutes == 0 {
            return Err(SimError::Config("agenda_minutes must be positive".into()));
        }
        if self.workers == Some(0) {
            return Err(SimError::Config("workers must be at least 1".into()));
        }
        if !(self.leisure_radius.is_finite() && self.leisure_radius >= 0.0) {
            return Err(SimError::Config(format!(
                "leisure_radius {} must be a finite non-negative number",
                self.leisure_radius
            )));
        }
        if matches!(&self.variables, Some(v) if v.is_empty()) {
            return Err(SimError::Config("variables override must not be empty".into()));
        }
        self.clock()?;
        Ok(())
    }

    /// Clock anchored at `agenda_start`.
    pub fn clock(&self) -> SimResult<AgendaClock> {
        let start = parse_timestamp(&self.agenda_start)?;
        Ok(AgendaClock::new(start, self.tick_secs)?)
    }

    /// `[start, end)` of the agenda in ticks of `clock`.
    pub fn agenda(&self, clock: &AgendaClock) -> (Tick, Tick) {
        let ticks = clock.ticks_for_secs(self.agenda_minutes * 60);
        (Tick(0), Tick(ticks))
    }
}
