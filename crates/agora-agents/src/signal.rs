//! Broadcast phase: decide whether an agent emits a signal this tick.
//!
//! Both emitters return an immutable value snapshot of the sender. The
//! scheduler collects them into a closed, read-only slice before any
//! aggregation begins.

use agora_types::{Agent, CulturalSignal, SocialSignal};

use crate::config::InteractionParams;

/// Agents must have strictly more energy than this to emit a social signal.
pub const SOCIAL_BROADCAST_ENERGY_FLOOR: f64 = 0.2;

/// Influence strength must strictly exceed this to emit a cultural signal.
pub const CULTURAL_BROADCAST_STRENGTH_FLOOR: f64 = 0.1;

/// Social signal for `agent`, if it has the energy to socialize.
///
/// Strength is `min(1, reputation * energy)`.
pub fn social_signal(agent: &Agent) -> Option<SocialSignal> {
    if agent.energy <= SOCIAL_BROADCAST_ENERGY_FLOOR {
        return None;
    }
    Some(SocialSignal {
        position: agent.position,
        group: agent.group,
        strength: (agent.reputation * agent.energy).min(1.0),
    })
}

/// Cultural influence signal for `agent`, if its influence is strong enough.
///
/// Strength is `reputation * happiness * influence_strength_factor`.
pub fn cultural_signal(agent: &Agent, params: &InteractionParams) -> Option<CulturalSignal> {
    let strength = agent.reputation * agent.happiness * params.influence_strength_factor;
    if strength <= CULTURAL_BROADCAST_STRENGTH_FLOOR {
        return None;
    }
    Some(CulturalSignal {
        position: agent.position,
        group: agent.group,
        strength,
    })
}
