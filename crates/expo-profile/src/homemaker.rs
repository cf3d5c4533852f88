//! Homemaker: at home all day apart from one leisure period.
//!
//! ```text
//! home (50 m buffer)  until a minute drawn from [08:00, 21:00)
//! leisure buffer      120 min, leisure radius, at home
//! home (50 m buffer)  rest of the agenda
//! ```

use expo_core::AgentRng;
use expo_schedule::{ActivityDescriptor, ActivityKind, ActivityScheduler, Schedule, Timing};

use crate::{DayKind, LocationRecord, Profile, ProfileContext, ProfileResult, weekday_variables, weekend_variables};

pub struct HomemakerBuffer {
    day:                DayKind,
    /// First home period ends at a minute in `[min, max)` after agenda start.
    first_end_minutes:  (u32, u32),
    leisure_minutes:    f64,
    home_radius:        f64,
}

impl HomemakerBuffer {
    pub fn new(day: DayKind) -> Self {
        Self { day, first_end_minutes: (8 * 60, 21 * 60), leisure_minutes: 120.0, home_radius: 50.0 }
    }
}

impl Profile for HomemakerBuffer {
    fn name(&self) -> &'static str {
        match self.day {
            DayKind::Workday => "homemaker_buffer_workday",
            DayKind::Weekend => "homemaker_buffer_weekend",
        }
    }

    fn variables(&self) -> Vec<String> {
        match self.day {
            DayKind::Workday => weekday_variables(),
            DayKind::Weekend => weekend_variables(),
        }
    }

    fn build(
        &self,
        home: &LocationRecord,
        ctx:  &ProfileContext<'_>,
        rng:  &mut AgentRng,
    ) -> ProfileResult<Schedule> {
        let (lo, hi) = self.first_end_minutes;
        let first_end = ctx.ticks(rng.gen_range(lo..hi) as f64);
        let at = home.projected;

        let schedule = ActivityScheduler::new(home.agent(), ctx.agenda_start, ctx.agenda_end)
            .then(ActivityDescriptor::buffer(ActivityKind::Home, at, self.home_radius, Timing::Fixed(first_end)))
            .then(ActivityDescriptor::buffer(
                ActivityKind::Leisure,
                at,
                ctx.leisure_radius,
                Timing::Fixed(ctx.ticks(self.leisure_minutes)),
            ))
            .then(ActivityDescriptor::buffer(ActivityKind::Home, at, self.home_radius, Timing::FillsRemaining))
            .build()?;
        Ok(schedule)
    }
}
