//! Strongly typed identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sort
//! keys.  Agent ids come from the location registry (the home record id), so
//! they are sparse; never use them as dense `Vec` indices.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            #[inline(always)]
            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(n: $inner) -> $name {
                $name(n)
            }
        }
    };
}

typed_id! {
    /// Identifier of one synthetic agent (its home record id).
    pub struct AgentId(u32);
}

typed_id! {
    /// Identifier of one scheduled activity, unique within a realisation.
    pub struct ActivityId(u32);
}

typed_id! {
    /// Origin/destination zone (postcode area) used by the OD selector.
    pub struct ZoneId(u32);
}

typed_id! {
    /// Identifier of a home or work location record.
    pub struct LocationId(u32);
}
