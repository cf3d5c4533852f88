//! `expo-spatial`: mapping activity geometry onto the exposure grid.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`extent`]     | `GridExtent` (dataset raster metadata), `CellWindow`      |
//! | [`context`]    | `SpatialContext` (snapped window + cell mask)             |
//! | [`resolver`]   | `SpatialContextResolver`: point, buffer, route            |
//! | [`router`]     | `Router` trait, `Trip`, `StraightLineRouter`              |
//! | [`projection`] | `Projection` trait, `RdNew`, `LonLatIdentity`, `ProjectionKind` |
//! | [`error`]      | `SpatialError`, `SpatialResult<T>`                        |
//!
//! # Grid convention
//!
//! Row 0 is the northernmost row (at `max_y`), column 0 the westernmost (at
//! `min_x`).  Every context returned by the resolver is aligned to whole
//! dataset cells and lies fully inside the dataset extent.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod context;
pub mod error;
pub mod extent;
pub mod projection;
pub mod resolver;
pub mod router;


pub use context::SpatialContext;
pub use error::{SpatialError, SpatialResult};
pub use extent::{CellWindow, GridExtent};
pub use projection::{LonLatIdentity, Projection, ProjectionKind, RdNew};
pub use resolver::SpatialContextResolver;
pub use router::{Router, StraightLineRouter, Trip};
