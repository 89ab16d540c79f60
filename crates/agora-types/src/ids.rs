//! Type-safe identifier wrappers.
//!
//! Agent identities are opaque integers assigned by the population manager.
//! The simulation core never allocates them; it only carries them through
//! snapshots so downstream consumers can join records across ticks.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around `u64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw integer identifier.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Return the inner integer value.
            pub const fn into_inner(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an agent in the simulation.
    AgentId
}
