//! `expo-profile`: synthetic daily schedules for a population.
//!
//! A [`Profile`] turns one home record into one agent's [`Schedule`]
//! using the shared [`ProfileContext`] (locations, OD selector, router,
//! agenda) and the agent's own RNG.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`profile`]   | `Profile` trait, `ProfileKind`, `ProfileContext`, variable sets |
//! | [`homemaker`] | `HomemakerBuffer` (workday and weekend)                   |
//! | [`commuter`]  | `CommuterWorkday`                                         |
//! | [`location`]  | `LocationRecord`, `LocationRegistry`, CSV loader          |
//! | [`od`]        | `OriginDestinationSelector` trait, `OdTable`, CSV loader  |
//! | [`error`]     | `ProfileError`, `ProfileResult<T>`                        |
//!
//! [`Schedule`]: expo_schedule::Schedule

pub mod commuter;
pub mod error;
pub mod homemaker;
pub mod location;
pub mod od;
pub mod profile;

#[cfg(test)]
mod tests;

pub use commuter::{CommuterWorkday, WorkChoice};
pub use error::{ProfileError, ProfileResult};
pub use homemaker::HomemakerBuffer;
pub use location::{LocationRecord, LocationRegistry, load_locations_csv, load_locations_reader};
pub use od::{OdTable, OriginDestinationSelector, load_od_csv, load_od_reader};
pub use profile::{
    DayKind, Profile, ProfileContext, ProfileKind, weekday_variables, weekend_variables,
};
