//! Exact re-slicing of a schedule onto a timestep grid.
//!
//! # Algorithm
//!
//! The schedule and the grid are two sorted partitions of the same span.
//! They are merged with two cursors, one on the current activity and one on
//! the current window.  At each step the slice runs from the shared cursor
//! to the earlier of the two ends:
//!
//! ```text
//! activity end >  window end   emit [cursor, window.end)    next window
//! activity end <  window end   emit [cursor, activity.end)  next activity
//! activity end == window end   emit [cursor, end)           next both
//! ```
//!
//! Every step advances at least one cursor, so the merge finishes in
//! `O(activities + windows)`.

use std::cmp::Ordering;

use expo_core::{AgentId, Tick};

use crate::{Schedule, ScheduleError, ScheduleResult, TimestepGrid};

/// Intersection of one activity with one grid window.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeSlice {
    pub agent: AgentId,
    /// Ordinal of the source activity in its schedule.
    pub activity: u32,
    pub start: Tick,
    pub end: Tick,
}

impl TimeSlice {
    #[inline]
    pub fn duration(&self) -> u64 {
        self.end - self.start
    }
}

/// Split every activity of `schedule` at the window boundaries of `grid`.
///
/// The output is sorted, contiguous and non-overlapping, and its durations
/// sum to the schedule span.
///
/// # Errors
///
/// - [`ScheduleError::SpanMismatch`] if schedule and grid cover different
///   spans.
/// - [`ScheduleError::Discontiguous`] if an activity does not start where
///   the previous one ended.
/// - [`ScheduleError::PartitionMismatch`] if the slices do not add up to
///   the schedule span.
pub fn resample(schedule: &Schedule, grid: &TimestepGrid) -> ScheduleResult<Vec<TimeSlice>> {
    let agent = schedule.agent();
    if schedule.agenda_start() != grid.start() || schedule.agenda_end() != grid.end() {
        return Err(ScheduleError::SpanMismatch {
            agent,
            schedule_start: schedule.agenda_start(),
            schedule_end:   schedule.agenda_end(),
            grid_start:     grid.start(),
            grid_end:       grid.end(),
        });
    }

    let activities = schedule.activities();
    let windows = grid.windows();
    let mut slices = Vec::with_capacity(activities.len() + windows.len());

    let (mut a, mut w) = (0usize, 0usize);
    let mut cursor = schedule.agenda_start();

    while a < activities.len() && w < windows.len() {
        let act = &activities[a];
        let win = &windows[w];

        let end = match act.end.cmp(&win.end) {
            Ordering::Greater => {
                w += 1;
                win.end
            }
            Ordering::Less => {
                a += 1;
                act.end
            }
            Ordering::Equal => {
                a += 1;
                w += 1;
                act.end
            }
        };

        slices.push(TimeSlice { agent, activity: act.ordinal, start: cursor, end });
        cursor = end;

        if let Some(next) = activities.get(a).filter(|_| end == act.end) {
            if next.start != cursor {
                return Err(ScheduleError::Discontiguous {
                    agent,
                    ordinal:  next.ordinal,
                    expected: cursor,
                    found:    next.start,
                });
            }
        }
    }

    let total: u64 = slices.iter().map(TimeSlice::duration).sum();
    if a != activities.len() || w != windows.len() || total != schedule.span() {
        return Err(ScheduleError::PartitionMismatch {
            agent,
            expected: schedule.span(),
            actual:   total,
        });
    }

    tracing::trace!(%agent, slices = slices.len(), "schedule resampled");
    Ok(slices)
}
