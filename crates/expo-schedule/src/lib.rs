//! `expo-schedule`: agent schedules and their re-slicing onto the exposure
//! dataset's time grid.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`activity`]  | `ActivityDescriptor`, `Footprint`, `Timing`, `ScheduledActivity` |
//! | [`scheduler`] | `ActivityScheduler`, `Schedule`                           |
//! | [`grid`]      | `TimestepGrid`, `Window`                                  |
//! | [`resample`]  | `resample`, `TimeSlice`                                   |
//! | [`error`]     | `ScheduleError`, `ScheduleResult<T>`                      |
//!
//! # Pipeline (summary)
//!
//! ```text
//! descriptors ──ActivityScheduler──▶ Schedule ──resample(grid)──▶ Vec<TimeSlice>
//! ```
//!
//! Both steps are exact: a schedule's activity durations sum to the agenda
//! length, and the slices of one agent partition the same span with no gap
//! or overlap.  Any violation is an error for that agent, never a rounding.

pub mod activity;
pub mod error;
pub mod grid;
pub mod resample;
pub mod scheduler;

#[cfg(test)]
mod tests;

pub use activity::{
    ActivityDescriptor, ActivityGroup, ActivityKind, BufferMethod, Footprint, ScheduledActivity,
    Timing,
};
pub use error::{ScheduleError, ScheduleResult};
pub use grid::{TimestepGrid, Window};
pub use resample::{TimeSlice, resample};
pub use scheduler::{ActivityScheduler, Schedule};
