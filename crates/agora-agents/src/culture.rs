//! Cultural aggregation: affinity diffusion and group switching.
//!
//! A receiver sums the distance-weighted strength of every in-range
//! cultural signal per sender group. If the total clears a small noise
//! floor, each group that was heard from gains affinity in proportion to
//! its share of the total. The vector is renormalized and the agent may
//! switch to the dominant group.

use agora_types::{Agent, CULTURAL_GROUP_COUNT, CulturalGroup, CulturalSignal};

use crate::config::InteractionParams;
use crate::proximity::{SignalIndex, distance_factor};

/// Total received influence at or below this is ignored as noise.
pub const INFLUENCE_NOISE_FLOOR: f64 = 0.01;

/// What happened to one receiver during cultural aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CulturalOutcome {
    /// Total distance-weighted influence received.
    pub total_influence: f64,
    /// Whether the influence cleared the noise floor and was applied.
    pub applied: bool,
    /// The group the agent left, if it switched this tick.
    pub switched_from: Option<CulturalGroup>,
}

/// Apply one tick of cultural influence to `agent`.
///
/// `signals` indexes the closed set of cultural signals broadcast this
/// tick. Every in-range signal is counted; there is no interaction cap.
///
/// # Order of operations
///
/// 1. Accumulate `strength * distance_factor` per sender group and in total
/// 2. Stop if the total is at or below [`INFLUENCE_NOISE_FLOOR`]
/// 3. For each group heard from, add `share * cultural_shift_factor` and
///    clamp to `[0, 1]`
/// 4. Renormalize the vector
/// 5. Switch to the dominant group if it differs from the current one and
///    strictly exceeds `group_change_threshold`
pub fn aggregate_cultural(
    agent: &mut Agent,
    signals: &SignalIndex<'_, CulturalSignal>,
    params: &InteractionParams,
) -> CulturalOutcome {
    let radius = params.cultural_radius;
    let mut received = [0.0_f64; CULTURAL_GROUP_COUNT];
    let mut total = 0.0;

    for neighbor in signals.within(agent.position, radius) {
        let influence = neighbor.signal.strength * distance_factor(neighbor.distance, radius);
        if let Some(slot) = received.get_mut(neighbor.signal.group.index()) {
            *slot += influence;
        }
        total += influence;
    }

    let mut outcome = CulturalOutcome {
        total_influence: total,
        ..CulturalOutcome::default()
    };
    if total <= INFLUENCE_NOISE_FLOOR {
        return outcome;
    }
    outcome.applied = true;

    for (group, amount) in CulturalGroup::ALL.iter().copied().zip(received) {
        if amount > 0.0 {
            agent
                .affinity
                .add(group, amount / total * params.cultural_shift_factor);
            agent.affinity.clamp_unit(group);
        }
    }
    agent.affinity.renormalize();

    if let Some((dominant, value)) = agent.affinity.dominant()
        && dominant != agent.group
        && value > params.group_change_threshold
    {
        outcome.switched_from = Some(agent.group);
        agent.group = dominant;
    }

    outcome
}
