//! `ExposureSampler`: raster values for each time slice of a schedule.
//!
//! # Per-slice steps
//!
//! 1. The slice start is floored to the whole hour and resolved to the
//!    latest dataset timestep at or before it.
//! 2. The activity's spatial context is cut out of that timestep's grid.
//! 3. Each masked cell passes the [`QualityRule`]: no-data and values below
//!    the sentinel become missing, the rest are floored.
//! 4. The surviving cells are reduced by the activity's [`BufferMethod`].
//!    Point and route footprints use the mean.
//!
//! Route activities with the out-of-band travel mode are never resolved or
//! sampled; every variable receives [`ExposureSample::OutOfBand`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use expo_core::{AgendaClock, Tick};
use expo_schedule::{BufferMethod, Footprint, Schedule, TimeSlice};
use expo_spatial::{Projection, Router, SpatialContext, SpatialContextResolver};

use crate::{ExposureDataset, ExposureError, ExposureResult};

// ── QualityRule ───────────────────────────────────────────────────────────────

/// Data-quality correction applied to every raw raster value.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityRule {
    /// Values strictly below this are treated as broken no-data.
    pub sentinel: f64,
    /// Valid values are clamped up to this floor.
    pub floor: f64,
}

impl Default for QualityRule {
    fn default() -> Self {
        Self { sentinel: -10.0, floor: 0.0 }
    }
}

impl QualityRule {
    /// Corrected value, or `None` for missing.
    #[inline]
    pub fn correct(&self, raw: f32) -> Option<f64> {
        let v = raw as f64;
        if v.is_nan() || v < self.sentinel {
            None
        } else {
            Some(v.max(self.floor))
        }
    }
}

// ── ExposureSample ────────────────────────────────────────────────────────────

/// Outcome of sampling one variable for one slice.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ExposureSample {
    Value(f64),
    /// Every masked cell was no-data.
    Missing,
    /// Route slice whose travel mode was the out-of-band sentinel.
    OutOfBand,
}

impl ExposureSample {
    /// Marker written to slice artifacts for [`ExposureSample::OutOfBand`].
    pub const OUT_OF_BAND_MARKER: f64 = -7.0;

    /// The value as input to aggregation; out-of-band counts as missing.
    #[inline]
    pub fn value(self) -> Option<f64> {
        match self {
            ExposureSample::Value(v) => Some(v),
            ExposureSample::Missing | ExposureSample::OutOfBand => None,
        }
    }

    /// The value as written to the per-slice artifact.
    #[inline]
    pub fn persisted(self) -> Option<f64> {
        match self {
            ExposureSample::Value(v) => Some(v),
            ExposureSample::Missing => None,
            ExposureSample::OutOfBand => Some(Self::OUT_OF_BAND_MARKER),
        }
    }
}

/// One time slice with a sample per requested variable.
#[derive(Clone, Debug, PartialEq)]
pub struct SampledSlice {
    pub slice:    TimeSlice,
    /// Dataset timestep the slice was sampled at.
    pub timestep: NaiveDateTime,
    /// One entry per variable, in request order.
    pub values:   Vec<ExposureSample>,
}

// ── ExposureSampler ───────────────────────────────────────────────────────────

/// Samples schedules against one dataset.
///
/// The sampler only borrows its collaborators, so one instance per
/// realisation can be shared by reference across worker threads.
pub struct ExposureSampler<'a> {
    dataset:    &'a dyn ExposureDataset,
    resolver:   SpatialContextResolver,
    router:     &'a dyn Router,
    projection: &'a dyn Projection,
    clock:      AgendaClock,
    quality:    QualityRule,
}

impl<'a> ExposureSampler<'a> {
    pub fn new(
        dataset:    &'a dyn ExposureDataset,
        router:     &'a dyn Router,
        projection: &'a dyn Projection,
        clock:      AgendaClock,
    ) -> Self {
        Self {
            dataset,
            resolver: SpatialContextResolver::new(*dataset.extent()),
            router,
            projection,
            clock,
            quality: QualityRule::default(),
        }
    }

    pub fn with_quality(mut self, quality: QualityRule) -> Self {
        self.quality = quality;
        self
    }

    pub fn quality(&self) -> QualityRule {
        self.quality
    }

    pub fn clock(&self) -> &AgendaClock {
        &self.clock
    }

    pub fn dataset(&self) -> &dyn ExposureDataset {
        self.dataset
    }

    /// Spatial context of `footprint`; `None` for an out-of-band route.
    pub fn resolve(&self, footprint: &Footprint) -> ExposureResult<Option<SpatialContext>> {
        let ctx = match *footprint {
            Footprint::Point { at } => self.resolver.point(at)?,
            Footprint::Buffer { at, radius, .. } => self.resolver.buffer(at, radius)?,
            Footprint::Route { mode, .. } if !mode.is_routable() => return Ok(None),
            Footprint::Route { from, to, mode } => {
                self.resolver.route(self.router, self.projection, from, to, mode)?
            }
        };
        Ok(Some(ctx))
    }

    /// Dataset timestep used for a slice starting at `tick`.
    pub fn timestep_for(&self, tick: Tick) -> ExposureResult<NaiveDateTime> {
        let hour = self.clock.floor_to_hour(tick);
        self.dataset
            .nearest_timestep_at_or_before(hour)
            .ok_or(ExposureError::NoTimestep(hour))
    }

    /// Reduce the masked cells of `variable` at `timestep`.
    ///
    /// # Errors
    ///
    /// [`ExposureError::ShapeMismatch`] if the data window cut from the
    /// grid does not have the mask's shape.
    pub fn sample(
        &self,
        ctx:      &SpatialContext,
        method:   BufferMethod,
        variable: &str,
        timestep: NaiveDateTime,
    ) -> ExposureResult<ExposureSample> {
        let data = self.dataset.read(variable, timestep)?.window(ctx.window());
        if data.shape() != ctx.shape() {
            return Err(ExposureError::ShapeMismatch {
                variable: variable.to_owned(),
                expected: ctx.shape(),
                actual:   data.shape(),
            });
        }

        let (mut sum, mut valid) = (0.0f64, 0usize);
        for (&m, &raw) in ctx.mask().iter().zip(data.values()) {
            if m == 0 {
                continue;
            }
            if let Some(v) = self.quality.correct(raw) {
                sum += v;
                valid += 1;
            }
        }

        Ok(match (valid, method) {
            (0, _) => ExposureSample::Missing,
            (_, BufferMethod::Sum) => ExposureSample::Value(sum),
            (n, BufferMethod::Mean) => ExposureSample::Value(sum / n as f64),
        })
    }

    /// Sample every slice of `schedule` for each of `variables`.
    ///
    /// `slices` must be the resampler output for `schedule`.  Each
    /// activity's spatial context is resolved once and reused for all of
    /// its slices.
    pub fn sample_schedule(
        &self,
        schedule:  &Schedule,
        slices:    &[TimeSlice],
        variables: &[String],
    ) -> ExposureResult<Vec<SampledSlice>> {
        let mut out = Vec::with_capacity(slices.len());
        let mut rest = slices;

        for act in schedule.activities() {
            let n = rest.iter().take_while(|s| s.activity == act.ordinal).count();
            let (mine, tail) = rest.split_at(n);
            rest = tail;
            if mine.is_empty() {
                continue;
            }

            let ctx = self.resolve(&act.footprint)?;
            let method = match act.footprint {
                Footprint::Buffer { method, .. } => method,
                Footprint::Point { .. } | Footprint::Route { .. } => BufferMethod::Mean,
            };

            for slice in mine {
                let timestep = self.timestep_for(slice.start)?;
                let values = match &ctx {
                    None => vec![ExposureSample::OutOfBand; variables.len()],
                    Some(ctx) => variables
                        .iter()
                        .map(|v| self.sample(ctx, method, v, timestep))
                        .collect::<ExposureResult<Vec<_>>>()?,
                };
                out.push(SampledSlice { slice: *slice, timestep, values });
            }
        }
        debug_assert!(rest.is_empty(), "slices left over after the last activity");

        Ok(out)
    }
}
