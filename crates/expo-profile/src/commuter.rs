//! Commuter: home, travel to work, eight hours at work, travel back.
//!
//! # Work location draw
//!
//! 1. A destination zone is drawn from the OD selector for the home zone.
//!    Without a selector, an unknown origin, or after `redraw_max` redraws,
//!    the home zone is used.
//! 2. A random work location in that zone is accepted when its euclidean
//!    distance from home lies in `(min_euclid, max_euclid)` and the routed
//!    duration in `(0, max_commute_minutes)`.
//! 3. The travel mode is drawn from the distance band (see
//!    [`CommuterWorkday::draw_mode`]) before routing.
//!
//! An agent with no acceptable location after `redraw_max + home_attempts`
//! draws fails with [`ProfileError::NoSuitableWork`].

use expo_core::{AgentRng, TravelMode};
use expo_schedule::{ActivityDescriptor, ActivityKind, ActivityScheduler, Schedule, Timing};
use expo_spatial::{SpatialError, Trip};

use crate::{LocationRecord, Profile, ProfileContext, ProfileError, ProfileResult, weekday_variables};

/// Accepted work location with the commute that reaches it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorkChoice {
    pub work: LocationRecord,
    pub mode: TravelMode,
    pub trip: Trip,
}

pub struct CommuterWorkday {
    pub min_euclid:          f64,
    pub max_euclid:          f64,
    pub max_commute_minutes: f64,
    pub redraw_max:          u32,
    pub home_attempts:       u32,
    /// The morning home period ends at a minute in `[min, max)`.
    pub departure_minutes:   (u32, u32),
    pub work_minutes:        f64,
    pub buffer_radius:       f64,
}

impl Default for CommuterWorkday {
    fn default() -> Self {
        Self {
            min_euclid:          25.0,
            max_euclid:          180_000.0,
            max_commute_minutes: 150.0,
            redraw_max:          20,
            home_attempts:       20,
            departure_minutes:   (6 * 60 + 30, 7 * 60 + 30),
            work_minutes:        8.0 * 60.0,
            buffer_radius:       50.0,
        }
    }
}

impl CommuterWorkday {
    /// Mode by euclidean distance, each option with probability ½:
    ///
    /// | Distance    | Modes      |
    /// |-------------|------------|
    /// | < 1 km      | foot, bike |
    /// | 1 – 10 km   | bike, car  |
    /// | ≥ 10 km     | car, train |
    pub fn draw_mode(distance_m: f64, rng: &mut AgentRng) -> TravelMode {
        let (a, b) = if distance_m < 1_000.0 {
            (TravelMode::Foot, TravelMode::Bike)
        } else if distance_m < 10_000.0 {
            (TravelMode::Bike, TravelMode::Car)
        } else {
            (TravelMode::Car, TravelMode::Train)
        };
        if rng.gen_bool(0.5) { a } else { b }
    }

    /// Draw a work location for `home`.
    pub fn draw_work(
        &self,
        home: &LocationRecord,
        ctx:  &ProfileContext<'_>,
        rng:  &mut AgentRng,
    ) -> ProfileResult<WorkChoice> {
        let agent = home.agent();
        let max_attempts = self.redraw_max + self.home_attempts;

        for attempt in 0..=max_attempts {
            let zone = if attempt > self.redraw_max {
                if attempt == self.redraw_max + 1 {
                    tracing::warn!(%agent, zone = %home.zone, "redraws exhausted, using home zone");
                }
                home.zone
            } else {
                match ctx.od.and_then(|od| od.obtain(home.zone, rng)) {
                    Some(zone) => zone,
                    None => {
                        if attempt == 0 {
                            tracing::warn!(%agent, zone = %home.zone, "no OD destination, using home zone");
                        }
                        home.zone
                    }
                }
            };

            let Some(work) = rng.choose(ctx.registry.work_in_zone(zone)).copied() else {
                tracing::debug!(%agent, %zone, "zone has no work locations");
                continue;
            };

            let distance = home.projected.distance(work.projected);
            if !(distance > self.min_euclid && distance < self.max_euclid) {
                continue;
            }

            let mode = Self::draw_mode(distance, rng);
            let trip = match ctx.router.distance(home.geographic, work.geographic, mode) {
                Ok(trip) => trip,
                Err(SpatialError::NoRoute { .. }) => continue,
                Err(e) => return Err(e.into()),
            };
            if trip.minutes > 0.0 && trip.minutes < self.max_commute_minutes {
                tracing::debug!(%agent, %mode, meters = trip.meters, minutes = trip.minutes, attempt, "work location accepted");
                return Ok(WorkChoice { work, mode, trip });
            }
        }

        Err(ProfileError::NoSuitableWork { agent, attempts: max_attempts + 1 })
    }
}

impl Profile for CommuterWorkday {
    fn name(&self) -> &'static str {
        "commuter_workday"
    }

    fn variables(&self) -> Vec<String> {
        weekday_variables()
    }

    fn build(
        &self,
        home: &LocationRecord,
        ctx:  &ProfileContext<'_>,
        rng:  &mut AgentRng,
    ) -> ProfileResult<Schedule> {
        let WorkChoice { work, mode, trip } = self.draw_work(home, ctx, rng)?;

        let (lo, hi) = self.departure_minutes;
        let departure = ctx.ticks(rng.gen_range(lo..hi) as f64);
        let travel = ctx.ticks(trip.minutes).max(1);

        let schedule = ActivityScheduler::new(home.agent(), ctx.agenda_start, ctx.agenda_end)
            .then(ActivityDescriptor::buffer(ActivityKind::Home, home.projected, self.buffer_radius, Timing::Fixed(departure)))
            .then(ActivityDescriptor::commute(
                ActivityKind::CommuteHomeToWork,
                home.geographic,
                work.geographic,
                mode,
                travel,
            ))
            .then(ActivityDescriptor::buffer(
                ActivityKind::Work,
                work.projected,
                self.buffer_radius,
                Timing::Fixed(ctx.ticks(self.work_minutes)),
            ))
            .then(ActivityDescriptor::commute(
                ActivityKind::CommuteWorkToHome,
                work.geographic,
                home.geographic,
                mode,
                travel,
            ))
            .then(ActivityDescriptor::buffer(ActivityKind::Home, home.projected, self.buffer_radius, Timing::FillsRemaining))
            .build()?;
        Ok(schedule)
    }
}
