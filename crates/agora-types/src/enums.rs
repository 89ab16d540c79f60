//! Enumeration types for the Agora simulation.
//!
//! Cultural groups are a small, fixed enumeration. Their declaration order
//! is load-bearing: affinity vectors are indexed by it, and dominant-group
//! selection breaks ties toward the lowest index.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Number of cultural groups an agent can belong to.
pub const CULTURAL_GROUP_COUNT: usize = 5;

// ---------------------------------------------------------------------------
// Cultural groups
// ---------------------------------------------------------------------------

/// A cultural group an agent can identify with.
///
/// Each agent belongs to exactly one group at a time and carries an affinity
/// toward every group. The discriminant is the group's index into the
/// affinity vector.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum CulturalGroup {
    /// Values cooperation and consensus.
    #[default]
    Harmonists = 0,
    /// Values construction and material progress.
    Builders = 1,
    /// Values protection and order.
    Guardians = 2,
    /// Values learning and discovery.
    Scholars = 3,
    /// Values exploration and independence.
    Wanderers = 4,
}

impl CulturalGroup {
    /// Every group in ascending index order.
    pub const ALL: [Self; CULTURAL_GROUP_COUNT] = [
        Self::Harmonists,
        Self::Builders,
        Self::Guardians,
        Self::Scholars,
        Self::Wanderers,
    ];

    /// Index of this group in an affinity vector.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a group by affinity index. Returns `None` when out of range.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Harmonists),
            1 => Some(Self::Builders),
            2 => Some(Self::Guardians),
            3 => Some(Self::Scholars),
            4 => Some(Self::Wanderers),
            _ => None,
        }
    }

    /// Lowercase display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Harmonists => "harmonists",
            Self::Builders => "builders",
            Self::Guardians => "guardians",
            Self::Scholars => "scholars",
            Self::Wanderers => "wanderers",
        }
    }
}

impl core::fmt::Display for CulturalGroup {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
