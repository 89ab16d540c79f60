//! Core entity structs for the Agora simulation.
//!
//! [`Agent`] is owned by the population manager; the simulation core only
//! mutates its fields in place, once per phase per tick. [`Affinity`] is a
//! fixed-size distribution over [`CulturalGroup`]s.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{CULTURAL_GROUP_COUNT, CulturalGroup};
use crate::ids::AgentId;

// ---------------------------------------------------------------------------
// Vec2
// ---------------------------------------------------------------------------

/// A two-dimensional vector used for positions and velocities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a vector from components.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Squared Euclidean distance to `other`.
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx.mul_add(dx, dy * dy)
    }
}

// ---------------------------------------------------------------------------
// Affinity
// ---------------------------------------------------------------------------

/// An agent's affinity toward each cultural group, indexed by
/// [`CulturalGroup::index`].
///
/// Aggregators keep every component in `[0, 1]` and renormalize the vector
/// to sum to 1 whenever the pre-normalization sum is positive. A vector
/// whose components are all zero is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Affinity(pub [f64; CULTURAL_GROUP_COUNT]);

impl Affinity {
    /// Wrap raw components.
    pub const fn new(values: [f64; CULTURAL_GROUP_COUNT]) -> Self {
        Self(values)
    }

    /// `weight` toward `group`, with the remaining mass split evenly across
    /// the other groups. `weight` is clamped to `[0, 1]`.
    pub fn favoring(group: CulturalGroup, weight: f64) -> Self {
        let weight = weight.clamp(0.0, 1.0);
        let rest = (1.0 - weight) / (group_count_f64() - 1.0);
        let mut values = [rest; CULTURAL_GROUP_COUNT];
        if let Some(slot) = values.get_mut(group.index()) {
            *slot = weight;
        }
        Self(values)
    }

    /// Affinity toward `group`.
    pub fn get(&self, group: CulturalGroup) -> f64 {
        self.0.get(group.index()).copied().unwrap_or(0.0)
    }

    /// Add `delta` to the affinity toward `group`. No clamping.
    pub fn add(&mut self, group: CulturalGroup, delta: f64) {
        if let Some(slot) = self.0.get_mut(group.index()) {
            *slot += delta;
        }
    }

    /// Clamp the affinity toward `group` into `[0, 1]`.
    pub fn clamp_unit(&mut self, group: CulturalGroup) {
        if let Some(slot) = self.0.get_mut(group.index()) {
            *slot = slot.clamp(0.0, 1.0);
        }
    }

    /// Sum of all components.
    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Divide every component by the sum when the sum is positive.
    ///
    /// Returns `true` when the vector was rescaled.
    pub fn renormalize(&mut self) -> bool {
        let total = self.sum();
        if total > 0.0 {
            for value in &mut self.0 {
                *value /= total;
            }
            true
        } else {
            false
        }
    }

    /// The group with the strictly greatest affinity.
    ///
    /// Scans in ascending index order starting from a maximum of 0, so ties
    /// resolve to the lowest index and an all-zero vector yields `None`.
    pub fn dominant(&self) -> Option<(CulturalGroup, f64)> {
        let mut best: Option<(CulturalGroup, f64)> = None;
        let mut best_value = 0.0;
        for (group, value) in self.iter() {
            if value > best_value {
                best_value = value;
                best = Some((group, value));
            }
        }
        best
    }

    /// Iterate `(group, affinity)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (CulturalGroup, f64)> + '_ {
        CulturalGroup::ALL.iter().copied().zip(self.0.iter().copied())
    }
}

fn group_count_f64() -> f64 {
    u32::try_from(CULTURAL_GROUP_COUNT).map_or(1.0, f64::from)
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// A spatially situated agent.
///
/// Range conventions: `energy`, `happiness`, `reputation`, and every
/// affinity component lie in `[0, 1]`; `food` and `age` are non-negative.
/// `age` is measured in years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Opaque identity assigned by the population manager.
    pub id: AgentId,
    /// Position in world coordinates.
    pub position: Vec2,
    /// Velocity in world units per tick.
    pub velocity: Vec2,
    /// Physical energy in `[0, 1]`.
    pub energy: f64,
    /// Food reserves, consumed each tick.
    pub food: f64,
    /// Age in years.
    pub age: f64,
    /// Happiness in `[0, 1]`.
    pub happiness: f64,
    /// Social reputation in `[0, 1]`.
    pub reputation: f64,
    /// Number of social connections formed so far.
    pub connection_count: u64,
    /// Cultural group the agent currently identifies with.
    pub group: CulturalGroup,
    /// Affinity toward every cultural group.
    pub affinity: Affinity,
}

impl Agent {
    /// Create an agent at rest at `position` with full energy, a small food
    /// reserve, neutral social standing, and a 0.6 affinity toward `group`.
    pub fn new(id: AgentId, position: Vec2, group: CulturalGroup) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            energy: 1.0,
            food: 1.0,
            age: 0.0,
            happiness: 0.5,
            reputation: 0.5,
            connection_count: 0,
            group,
            affinity: Affinity::favoring(group, 0.6),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn distance_squared_is_symmetric() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert!(approx(a.distance_squared(b), 25.0));
        assert!(approx(b.distance_squared(a), 25.0));
        assert!(approx(b.length(), 5.0));
    }

    #[test]
    fn favoring_sums_to_one() {
        let affinity = Affinity::favoring(CulturalGroup::Guardians, 0.6);
        assert!(approx(affinity.sum(), 1.0));
        assert!(approx(affinity.get(CulturalGroup::Guardians), 0.6));
        assert!(approx(affinity.get(CulturalGroup::Harmonists), 0.1));
    }

    #[test]
    fn renormalize_leaves_zero_vector_alone() {
        let mut affinity = Affinity::new([0.0; CULTURAL_GROUP_COUNT]);
        assert!(!affinity.renormalize());
        assert!(approx(affinity.sum(), 0.0));
    }

    #[test]
    fn renormalize_scales_to_unit_sum() {
        let mut affinity = Affinity::new([0.6, 0.2, 0.1, 0.1, 0.1]);
        assert!(affinity.renormalize());
        assert!(approx(affinity.sum(), 1.0));
        assert!(approx(affinity.get(CulturalGroup::Harmonists), 0.6 / 1.1));
    }

    #[test]
    fn dominant_breaks_ties_toward_lowest_index() {
        let affinity = Affinity::new([0.1, 0.35, 0.35, 0.1, 0.1]);
        let dominant = affinity.dominant();
        assert_eq!(dominant.map(|(g, _)| g), Some(CulturalGroup::Builders));
    }

    #[test]
    fn dominant_of_zero_vector_is_none() {
        let affinity = Affinity::new([0.0; CULTURAL_GROUP_COUNT]);
        assert!(affinity.dominant().is_none());
    }

    #[test]
    fn clamp_unit_bounds_component() {
        let mut affinity = Affinity::new([1.4, -0.2, 0.0, 0.0, 0.0]);
        affinity.clamp_unit(CulturalGroup::Harmonists);
        affinity.clamp_unit(CulturalGroup::Builders);
        assert!(approx(affinity.get(CulturalGroup::Harmonists), 1.0));
        assert!(approx(affinity.get(CulturalGroup::Builders), 0.0));
    }

    #[test]
    fn new_agent_is_at_rest() {
        let agent = Agent::new(AgentId::new(1), Vec2::new(5.0, 5.0), CulturalGroup::Scholars);
        assert_eq!(agent.velocity, Vec2::ZERO);
        assert_eq!(agent.group, CulturalGroup::Scholars);
        assert_eq!(agent.affinity.dominant().map(|(g, _)| g), Some(CulturalGroup::Scholars));
    }

    #[test]
    fn affinity_serializes_as_plain_array() {
        let affinity = Affinity::new([0.5, 0.25, 0.125, 0.0625, 0.0625]);
        let json = serde_json::to_string(&affinity).unwrap_or_default();
        assert_eq!(json, "[0.5,0.25,0.125,0.0625,0.0625]");
        let back: Result<Affinity, _> = serde_json::from_str(&json);
        assert_eq!(back.ok(), Some(affinity));
    }
}
