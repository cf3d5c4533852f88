//! `ActivityScheduler`: places descriptors on an agenda.
//!
//! The scheduler walks the descriptors with a cursor starting at the agenda
//! start.  Each activity ends where its [`Timing`][crate::Timing] rule says
//! and the cursor moves to that end.  The finished schedule must close on
//! the agenda end exactly; profiles are responsible for choosing rules that
//! add up (typically by ending with a `FillsRemaining` activity).

use expo_core::{AgentId, Tick};

use crate::{ActivityDescriptor, ScheduleError, ScheduleResult, ScheduledActivity};

// ── Schedule ──────────────────────────────────────────────────────────────────

/// One agent's contiguous activities over `[agenda_start, agenda_end)`.
///
/// Only [`ActivityScheduler::build`] constructs a `Schedule`, so every value
/// of this type satisfies `end[i] == start[i + 1]` and the durations sum to
/// the agenda length.
#[derive(Clone, Debug)]
pub struct Schedule {
    agent:        AgentId,
    agenda_start: Tick,
    agenda_end:   Tick,
    activities:   Vec<ScheduledActivity>,
}

impl Schedule {
    pub fn agent(&self) -> AgentId {
        self.agent
    }

    pub fn agenda_start(&self) -> Tick {
        self.agenda_start
    }

    pub fn agenda_end(&self) -> Tick {
        self.agenda_end
    }

    /// Agenda length in ticks.
    pub fn span(&self) -> u64 {
        self.agenda_end - self.agenda_start
    }

    /// Activities in chronological order.
    pub fn activities(&self) -> &[ScheduledActivity] {
        &self.activities
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

// ── ActivityScheduler ─────────────────────────────────────────────────────────

/// Builder that turns ordered descriptors into a [`Schedule`].
///
/// ```rust,ignore
/// let schedule = ActivityScheduler::new(agent, Tick(0), Tick(1440))
///     .then(ActivityDescriptor::buffer(Home, home, 50.0, Timing::Fixed(480)))
///     .then(ActivityDescriptor::buffer(Home, home, 50.0, Timing::FillsRemaining))
///     .build()?;
/// ```
pub struct ActivityScheduler {
    agent:        AgentId,
    agenda_start: Tick,
    agenda_end:   Tick,
    descriptors:  Vec<ActivityDescriptor>,
}

impl ActivityScheduler {
    pub fn new(agent: AgentId, agenda_start: Tick, agenda_end: Tick) -> Self {
        Self { agent, agenda_start, agenda_end, descriptors: Vec::new() }
    }

    /// Append the next activity.
    pub fn then(mut self, descriptor: ActivityDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// In-place variant of [`then`][Self::then].
    pub fn push(&mut self, descriptor: ActivityDescriptor) {
        self.descriptors.push(descriptor);
    }

    /// Assign absolute bounds to every activity.
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::EmptyAgenda`] if `agenda_end <= agenda_start`.
    /// - [`ScheduleError::EmptyActivity`] if a rule yields zero duration.
    /// - [`ScheduleError::Overrun`] if an activity would end before the
    ///   cursor or after the agenda end.
    /// - [`ScheduleError::Imbalance`] if the final cursor is not the agenda
    ///   end.
    pub fn build(self) -> ScheduleResult<Schedule> {
        let agent = self.agent;
        if self.agenda_end <= self.agenda_start {
            return Err(ScheduleError::EmptyAgenda {
                agent,
                start: self.agenda_start,
                end:   self.agenda_end,
            });
        }

        let mut cursor = self.agenda_start;
        let mut activities = Vec::with_capacity(self.descriptors.len());

        for (ordinal, desc) in self.descriptors.into_iter().enumerate() {
            let ordinal = ordinal as u32;
            let end = desc.timing.compute_end(cursor, self.agenda_end);

            if end == cursor {
                return Err(ScheduleError::EmptyActivity { agent, ordinal });
            }
            if end < cursor || end > self.agenda_end {
                return Err(ScheduleError::Overrun {
                    agent,
                    ordinal,
                    cursor,
                    end,
                    agenda_end: self.agenda_end,
                });
            }

            activities.push(ScheduledActivity {
                ordinal,
                kind:      desc.kind,
                footprint: desc.footprint,
                start:     cursor,
                end,
            });
            cursor = end;
        }

        if cursor != self.agenda_end {
            return Err(ScheduleError::Imbalance {
                agent,
                expected: self.agenda_end - self.agenda_start,
                actual:   cursor - self.agenda_start,
            });
        }

        tracing::trace!(%agent, activities = activities.len(), "schedule built");

        Ok(Schedule {
            agent,
            agenda_start: self.agenda_start,
            agenda_end:   self.agenda_end,
            activities,
        })
    }
}
