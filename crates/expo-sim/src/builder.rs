//! Fluent builder for constructing a [`Pipeline`].

use expo_exposure::{ExposureDataset, day_grid};
use expo_profile::{LocationRegistry, OriginDestinationSelector, Profile};
use expo_spatial::{Projection, Router, StraightLineRouter};

use crate::{Pipeline, PipelineConfig, SimError, SimResult};

/// Fluent builder for [`Pipeline`].
///
/// # Required inputs
///
/// - [`PipelineConfig`]: agenda, seed, workers, failure policy, …
/// - `Box<dyn Profile>`: e.g. from [`expo_profile::ProfileKind::instantiate`]
/// - [`LocationRegistry`]: home records (one agent each) and work records
/// - `D: ExposureDataset`: e.g. [`expo_exposure::RasterCube`]
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                                   |
/// |-------------------|-------------------------------------------|
/// | `.od(t)`          | None: commuters work in their home zone   |
/// | `.router(r)`      | [`StraightLineRouter`]                    |
/// | `.projection(p)`  | `config.projection`                       |
/// | `.variables(v)`   | `config.variables`, else the profile's    |
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = PipelineBuilder::new(config, ProfileKind::CommuterWorkday.instantiate(), registry, cube)
///     .od(od_table)
///     .build()?;
/// pipeline.run_realisation(1, &mut NoopObserver)?;
/// ```
pub struct PipelineBuilder {
    config:     PipelineConfig,
    profile:    Box<dyn Profile>,
    registry:   LocationRegistry,
    dataset:    Box<dyn ExposureDataset>,
    od:         Option<Box<dyn OriginDestinationSelector>>,
    router:     Option<Box<dyn Router>>,
    projection: Option<Box<dyn Projection>>,
    variables:  Option<Vec<String>>,
}

impl PipelineBuilder {
    /// Create a builder with all required inputs.
    pub fn new<D: ExposureDataset + 'static>(
        config:   PipelineConfig,
        profile:  Box<dyn Profile>,
        registry: LocationRegistry,
        dataset:  D,
    ) -> Self {
        Self {
            config,
            profile,
            registry,
            dataset:    Box::new(dataset),
            od:         None,
            router:     None,
            projection: None,
            variables:  None,
        }
    }

    /// Origin-destination selector for commuter work zones.
    pub fn od<S: OriginDestinationSelector + 'static>(mut self, od: S) -> Self {
        self.od = Some(Box::new(od));
        self
    }

    pub fn router<R: Router + 'static>(mut self, router: R) -> Self {
        self.router = Some(Box::new(router));
        self
    }

    /// Override the config's projection, e.g. for a custom reference system.
    pub fn projection<P: Projection + 'static>(mut self, projection: P) -> Self {
        self.projection = Some(Box::new(projection));
        self
    }

    /// Override the sampled variables (takes precedence over the config).
    pub fn variables(mut self, variables: Vec<String>) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Validate and construct the [`Pipeline`].
    ///
    /// # Errors
    ///
    /// - [`SimError::Config`] for an invalid config or an empty variable list.
    /// - [`SimError::UnknownVariable`] if a variable is not in the dataset.
    /// - [`SimError::Exposure`] if the dataset's resolution cannot grid the
    ///   agenda.
    pub fn build(self) -> SimResult<Pipeline> {
        self.config.validate()?;
        let clock = self.config.clock()?;
        let (agenda_start, agenda_end) = self.config.agenda(&clock);

        let variables = self
            .variables
            .or_else(|| self.config.variables.clone())
            .unwrap_or_else(|| self.profile.variables());
        if variables.is_empty() {
            return Err(SimError::Config("no exposure variables to sample".into()));
        }
        let known = self.dataset.variables();
        if let Some(missing) = variables.iter().find(|v| !known.contains(v)) {
            return Err(SimError::UnknownVariable(missing.clone()));
        }

        let grid = day_grid(&clock, self.dataset.resolution(), agenda_start, agenda_end)?;

        #[cfg(feature = "parallel")]
        let pool = match self.config.workers {
            None => None,
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SimError::Config(format!("worker pool: {e}")))?,
            ),
        };

        let projection = self
            .projection
            .unwrap_or_else(|| Box::new(self.config.projection));

        tracing::info!(
            profile = self.profile.name(),
            agents = self.registry.homes().len(),
            windows = grid.len(),
            %clock,
            "pipeline built"
        );

        Ok(Pipeline {
            config: self.config,
            clock,
            agenda_start,
            agenda_end,
            profile: self.profile,
            registry: self.registry,
            dataset: self.dataset,
            od: self.od,
            router: self.router.unwrap_or_else(|| Box::new(StraightLineRouter)),
            projection,
            variables,
            grid,
            #[cfg(feature = "parallel")]
            pool,
        })
    }
}
