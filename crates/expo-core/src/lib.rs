//! `expo-core`: foundational types for the `expo` exposure engine.
//!
//! This crate is a dependency of every other `expo-*` crate.  It has no
//! `expo-*` dependencies and only a handful of external ones (`chrono`,
//! `rand`, `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `ActivityId`, `ZoneId`, `LocationId`       |
//! | [`geo`]         | `Coord`, `LonLat`, `Envelope`, haversine distance     |
//! | [`time`]        | `Tick`, `AgendaClock`                                 |
//! | [`rng`]         | `AgentRng` (per agent, per realisation)               |
//! | [`transport`]   | `TravelMode` enum                                     |
//! | [`error`]       | `ExpoError`, `ExpoResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;
pub mod transport;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{ExpoError, ExpoResult};
pub use geo::{Coord, Envelope, LonLat};
pub use ids::{ActivityId, AgentId, LocationId, ZoneId};
pub use rng::AgentRng;
pub use time::{AgendaClock, TIMESTAMP_FORMAT, Tick, parse_timestamp};
pub use transport::TravelMode;
