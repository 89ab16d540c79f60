//! Core-state update applied to every agent at the end of each tick.
//!
//! - Energy decays by a fixed amount
//! - Food is consumed; an agent that runs out pays an extra energy penalty
//! - Age advances by one tick's worth of a year
//!
//! This phase is unconditional and never kills an agent. Death and removal
//! belong to the population manager.

use agora_types::Agent;

use crate::config::InteractionParams;

/// Energy lost by every agent every tick.
pub const ENERGY_DECAY_PER_TICK: f64 = 0.005;

/// Food eaten per tick.
pub const FOOD_CONSUMPTION_PER_TICK: f64 = 0.01;

/// Extra energy lost in a tick where the agent could not eat.
pub const HUNGER_ENERGY_PENALTY: f64 = 0.01;

/// Apply one tick of energy decay, food consumption, and aging.
///
/// Returns `true` if the agent went hungry this tick.
pub fn apply_core_state(agent: &mut Agent, params: &InteractionParams) -> bool {
    agent.energy = (agent.energy - ENERGY_DECAY_PER_TICK).max(0.0);

    let hungry = agent.food <= FOOD_CONSUMPTION_PER_TICK;
    if hungry {
        agent.food = 0.0;
        agent.energy = (agent.energy - HUNGER_ENERGY_PENALTY).max(0.0);
    } else {
        agent.food -= FOOD_CONSUMPTION_PER_TICK;
    }

    agent.age += params.age_per_tick();
    hungry
}
