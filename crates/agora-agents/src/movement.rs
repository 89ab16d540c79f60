//! Movement phase: random-walk integration inside a reflecting box.
//!
//! Each tick an agent with enough energy perturbs its velocity, clamps its
//! speed, integrates its position, reflects off the world edges, and pays
//! an energy cost proportional to its post-reflection speed.

use agora_types::Agent;
use rand::Rng;

use crate::config::InteractionParams;

/// Agents at or below this energy do not move.
pub const MOVEMENT_ENERGY_FLOOR: f64 = 0.1;

/// Energy spent per tick when moving at full speed.
pub const MOVE_ENERGY_COST_FACTOR: f64 = 0.01;

/// Bound of the uniform velocity perturbation on each axis.
pub const VELOCITY_JITTER: f64 = 1.0;

/// Apply one tick of movement to `agent`.
///
/// Returns `true` if the agent moved. Agents with energy at or below
/// [`MOVEMENT_ENERGY_FLOOR`] are left exactly as they were, and no random
/// numbers are drawn for them.
///
/// # Order of operations
///
/// 1. Add a uniform `[-1, 1]` perturbation to each velocity component
/// 2. Rescale velocity to `max_speed` if it is faster
/// 3. Integrate position by velocity
/// 4. Clamp each axis to the world and negate that velocity component
/// 5. Charge `0.01 * speed / max_speed` energy, floored at 0
pub fn apply_movement(agent: &mut Agent, params: &InteractionParams, rng: &mut impl Rng) -> bool {
    if agent.energy <= MOVEMENT_ENERGY_FLOOR {
        return false;
    }

    let mut velocity = agent.velocity;
    velocity.x += rng.random_range(-VELOCITY_JITTER..=VELOCITY_JITTER);
    velocity.y += rng.random_range(-VELOCITY_JITTER..=VELOCITY_JITTER);

    let speed = velocity.length();
    if speed > params.max_speed {
        velocity.x = velocity.x / speed * params.max_speed;
        velocity.y = velocity.y / speed * params.max_speed;
    }

    let (x, vx) = reflect(agent.position.x + velocity.x, velocity.x, params.world_width);
    let (y, vy) = reflect(agent.position.y + velocity.y, velocity.y, params.world_height);
    agent.position.x = x;
    agent.position.y = y;
    velocity.x = vx;
    velocity.y = vy;
    agent.velocity = velocity;

    let cost = if params.max_speed > 0.0 {
        MOVE_ENERGY_COST_FACTOR * (velocity.length() / params.max_speed)
    } else {
        0.0
    };
    agent.energy = (agent.energy - cost).max(0.0);
    true
}

/// Reflect a coordinate off `[0, bound]`, negating the velocity on contact.
fn reflect(coordinate: f64, velocity: f64, bound: f64) -> (f64, f64) {
    if coordinate <= 0.0 {
        (0.0, -velocity)
    } else if coordinate >= bound {
        (bound, -velocity)
    } else {
        (coordinate, velocity)
    }
}
