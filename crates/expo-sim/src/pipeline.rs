//! The `Pipeline` struct and its per-realisation run.

use std::sync::atomic::{AtomicUsize, Ordering};

use expo_core::{AgendaClock, AgentId, AgentRng, Tick};
use expo_exposure::{
    ActivityAggregator, ActivityExposure, DailySummary, ExposureDataset, ExposureSampler,
    SampledSlice,
};
use expo_profile::{
    LocationRecord, LocationRegistry, OriginDestinationSelector, Profile, ProfileContext,
};
use expo_schedule::{Schedule, TimestepGrid, resample};
use expo_spatial::{Projection, Router};

use crate::{AgentError, FailurePolicy, PipelineConfig, RunObserver, SimError, SimResult};

// ── Per-agent output ──────────────────────────────────────────────────────────

/// Everything one agent contributes to a realisation's artifacts.
#[derive(Clone, Debug)]
pub struct AgentExposure {
    pub agent:      AgentId,
    pub schedule:   Schedule,
    /// Sampled slices in chronological order.
    pub slices:     Vec<SampledSlice>,
    /// One entry per scheduled activity, in schedule order.
    pub activities: Vec<ActivityExposure>,
    pub daily:      DailySummary,
}

/// Outcome counts of one realisation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RealisationSummary {
    pub realisation: u32,
    pub agents:      usize,
    pub failed:      usize,
}

impl RealisationSummary {
    pub fn succeeded(&self) -> usize {
        self.agents - self.failed
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// The exposure pipeline for one profile over one dataset.
///
/// A realisation runs in two phases:
///
/// 1. **Agent phase** (optionally parallel with the `parallel` feature):
///    for every home record, build the schedule from the agent's own RNG,
///    resample it onto the dataset's timestep grid, sample every slice and
///    aggregate per activity and per day.  Nothing is shared but read-only
///    inputs.
/// 2. **Apply phase** (sequential, ascending `AgentId`): results are handed
///    to the observer one agent at a time and the failure policy is applied.
///
/// Create via [`PipelineBuilder`][crate::PipelineBuilder].
pub struct Pipeline {
    pub(crate) config:       PipelineConfig,
    pub(crate) clock:        AgendaClock,
    pub(crate) agenda_start: Tick,
    pub(crate) agenda_end:   Tick,
    pub(crate) profile:      Box<dyn Profile>,
    pub(crate) registry:     LocationRegistry,
    pub(crate) dataset:      Box<dyn ExposureDataset>,
    pub(crate) od:           Option<Box<dyn OriginDestinationSelector>>,
    pub(crate) router:       Box<dyn Router>,
    pub(crate) projection:   Box<dyn Projection>,
    pub(crate) variables:    Vec<String>,
    pub(crate) grid:         TimestepGrid,
    #[cfg(feature = "parallel")]
    pub(crate) pool:         Option<rayon::ThreadPool>,
}

impl Pipeline {
    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn clock(&self) -> &AgendaClock {
        &self.clock
    }

    pub fn profile(&self) -> &dyn Profile {
        self.profile.as_ref()
    }

    pub fn registry(&self) -> &LocationRegistry {
        &self.registry
    }

    /// Variables sampled for every agent, in artifact column order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Timestep grid every schedule is resampled onto.
    pub fn grid(&self) -> &TimestepGrid {
        &self.grid
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run realisation `realisation` over every home in the registry.
    ///
    /// # Errors
    ///
    /// [`SimError::Agent`] for the first failing agent under
    /// [`FailurePolicy::AbortRun`].  Under `IsolateAgent` failures are only
    /// counted and reported to the observer.
    pub fn run_realisation<O: RunObserver>(
        &self,
        realisation: u32,
        observer:    &mut O,
    ) -> SimResult<RealisationSummary> {
        let homes = self.registry.homes();
        tracing::info!(
            realisation,
            profile = self.profile.name(),
            agents = homes.len(),
            variables = ?self.variables,
            "realisation started"
        );
        observer.on_realisation_start(realisation, &self.variables, &self.clock);

        // ── Agent phase (produce) ─────────────────────────────────────────
        let mut results = self.compute_agents(realisation, homes);

        // ── Apply phase (consume) ─────────────────────────────────────────
        //
        // Registry order is arbitrary; delivery is by ascending AgentId.
        results.sort_by_key(|(agent, _)| *agent);

        let mut failed = 0;
        for (agent, result) in results {
            match result {
                Ok(exposure) => observer.on_agent(realisation, &exposure),
                Err(error) => {
                    observer.on_agent_failed(realisation, agent, &error);
                    match self.config.failure_policy {
                        FailurePolicy::AbortRun => {
                            tracing::error!(realisation, %agent, %error, "agent failed; aborting realisation");
                            return Err(SimError::Agent { agent, source: error });
                        }
                        FailurePolicy::IsolateAgent => {
                            tracing::warn!(realisation, %agent, %error, "agent failed; isolated");
                            failed += 1;
                        }
                    }
                }
            }
        }

        let summary = RealisationSummary { realisation, agents: homes.len(), failed };
        tracing::info!(
            realisation,
            agents = summary.agents,
            failed = summary.failed,
            "realisation finished"
        );
        observer.on_realisation_end(&summary);
        Ok(summary)
    }

    /// One agent's full pipeline.
    pub fn process_agent(
        &self,
        realisation: u32,
        home:        &LocationRecord,
    ) -> Result<AgentExposure, AgentError> {
        let ctx = self.profile_context();
        let sampler = self.sampler();
        self.run_agent(realisation, home, &ctx, &sampler, ActivityAggregator::from_clock(&self.clock))
    }

    // ── Agent phase ───────────────────────────────────────────────────────

    fn profile_context(&self) -> ProfileContext<'_> {
        ProfileContext {
            registry:       &self.registry,
            od:             self.od.as_deref(),
            router:         self.router.as_ref(),
            clock:          self.clock,
            agenda_start:   self.agenda_start,
            agenda_end:     self.agenda_end,
            leisure_radius: self.config.leisure_radius,
        }
    }

    fn sampler(&self) -> ExposureSampler<'_> {
        ExposureSampler::new(
            self.dataset.as_ref(),
            self.router.as_ref(),
            self.projection.as_ref(),
            self.clock,
        )
        .with_quality(self.config.quality)
    }

    fn run_agent(
        &self,
        realisation: u32,
        home:        &LocationRecord,
        ctx:         &ProfileContext<'_>,
        sampler:     &ExposureSampler<'_>,
        aggregator:  ActivityAggregator,
    ) -> Result<AgentExposure, AgentError> {
        let agent = home.agent();
        let mut rng = AgentRng::new(self.config.seed, realisation, agent);

        let schedule = self.profile.build(home, ctx, &mut rng)?;
        let slices = resample(&schedule, &self.grid)?;
        let sampled = sampler.sample_schedule(&schedule, &slices, &self.variables)?;

        let n = self.variables.len();
        let activities = aggregator.activities(&schedule, &sampled, n);
        let daily = aggregator.daily(agent, &sampled, n);
        tracing::debug!(%agent, activities = activities.len(), slices = sampled.len(), "agent done");

        Ok(AgentExposure { agent, schedule, slices: sampled, activities, daily })
    }

    /// Run every agent, in parallel with the `parallel` feature.
    fn compute_agents(
        &self,
        realisation: u32,
        homes:       &[LocationRecord],
    ) -> Vec<(AgentId, Result<AgentExposure, AgentError>)> {
        let ctx = self.profile_context();
        let sampler = self.sampler();
        let aggregator = ActivityAggregator::from_clock(&self.clock);
        let done = AtomicUsize::new(0);
        let every = self.config.progress_every;
        let total = homes.len();

        let work = |home: &LocationRecord| {
            let result = self.run_agent(realisation, home, &ctx, &sampler, aggregator);
            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            if every > 0 && n.is_multiple_of(every) {
                tracing::info!(realisation, done = n, total, "agents processed");
            }
            (home.agent(), result)
        };

        #[cfg(not(feature = "parallel"))]
        {
            homes.iter().map(work).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let run = || -> Vec<_> { homes.par_iter().map(work).collect() };
            match &self.pool {
                Some(pool) => pool.install(run),
                None => run(),
            }
        }
    }
}
