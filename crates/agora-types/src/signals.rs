//! Tick-scoped messages exchanged between agents.
//!
//! Signals are created during a broadcast phase, read during the matching
//! aggregate phase of the same tick, and then dropped. They carry a value
//! snapshot of the sender and never a reference back to it, so aggregation
//! cannot mutate the sender.

use crate::enums::CulturalGroup;
use crate::structs::Vec2;

/// A social presence signal. Strength is `min(1, reputation * energy)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SocialSignal {
    /// Sender position at broadcast time.
    pub position: Vec2,
    /// Sender cultural group at broadcast time.
    pub group: CulturalGroup,
    /// Interaction strength carried by the signal.
    pub strength: f64,
}

/// A cultural influence signal.
/// Strength is `reputation * happiness * influence_strength_factor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CulturalSignal {
    /// Influencer position at broadcast time.
    pub position: Vec2,
    /// Influencer cultural group at broadcast time.
    pub group: CulturalGroup,
    /// Influence strength carried by the signal.
    pub strength: f64,
}
