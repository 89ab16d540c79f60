//! Population seeding at simulation start.
//!
//! The tick core never creates agents, so the engine stands in for the
//! population manager: it draws every agent's initial state from the
//! configured ranges with a generator seeded from the world seed, so the
//! same config always yields the same population.

use agora_core::config::{AgentsConfig, ValueRange, WorldConfig};
use agora_types::{Affinity, Agent, AgentId, CULTURAL_GROUP_COUNT, CulturalGroup, Vec2};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Largest absolute initial velocity component.
const INITIAL_VELOCITY: f64 = 1.0;

/// Spawn `agents.count` agents with sequential ids starting at 0.
pub fn spawn_population(agents: &AgentsConfig, world: &WorldConfig) -> Vec<Agent> {
    let mut rng = SmallRng::seed_from_u64(world.seed);
    let population: Vec<Agent> = (0..u64::from(agents.count))
        .map(|id| spawn_agent(AgentId::new(id), agents, world, &mut rng))
        .collect();

    info!(
        count = population.len(),
        seed = world.seed,
        width = world.width,
        height = world.height,
        "Population spawned"
    );
    population
}

fn spawn_agent(
    id: AgentId,
    config: &AgentsConfig,
    world: &WorldConfig,
    rng: &mut impl Rng,
) -> Agent {
    let group = CulturalGroup::from_index(rng.random_range(0..CULTURAL_GROUP_COUNT))
        .unwrap_or_default();
    let position = Vec2::new(
        rng.random_range(0.0..=world.width),
        rng.random_range(0.0..=world.height),
    );

    let mut agent = Agent::new(id, position, group);
    agent.velocity = Vec2::new(
        rng.random_range(-INITIAL_VELOCITY..=INITIAL_VELOCITY),
        rng.random_range(-INITIAL_VELOCITY..=INITIAL_VELOCITY),
    );
    agent.energy = draw(config.initial_energy, rng);
    agent.food = draw(config.initial_food, rng);
    agent.age = draw(config.initial_age, rng);
    agent.happiness = draw(config.initial_happiness, rng);
    agent.reputation = draw(config.initial_reputation, rng);
    agent.affinity = Affinity::favoring(group, config.dominant_affinity);
    agent
}

fn draw(range: ValueRange, rng: &mut impl Rng) -> f64 {
    rng.random_range(range.min..=range.max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world(seed: u64) -> WorldConfig {
        WorldConfig {
            seed,
            width: 40.0,
            height: 20.0,
            ..WorldConfig::default()
        }
    }

    #[test]
    fn spawns_requested_count_with_sequential_ids() {
        let config = AgentsConfig {
            count: 25,
            ..AgentsConfig::default()
        };
        let agents = spawn_population(&config, &world(1));
        assert_eq!(agents.len(), 25);
        assert!(
            agents
                .iter()
                .enumerate()
                .all(|(i, a)| a.id.into_inner() == u64::try_from(i).unwrap_or(u64::MAX))
        );
    }

    #[test]
    fn agents_start_inside_the_world_and_ranges() {
        let config = AgentsConfig {
            count: 200,
            ..AgentsConfig::default()
        };
        for agent in spawn_population(&config, &world(9)) {
            assert!((0.0..=40.0).contains(&agent.position.x));
            assert!((0.0..=20.0).contains(&agent.position.y));
            assert!(agent.velocity.x.abs() <= INITIAL_VELOCITY);
            assert!(agent.velocity.y.abs() <= INITIAL_VELOCITY);
            let energy = config.initial_energy;
            let age = config.initial_age;
            assert!((energy.min..=energy.max).contains(&agent.energy));
            assert!((age.min..=age.max).contains(&agent.age));
            assert!((agent.affinity.get(agent.group) - 0.6).abs() < 1e-12);
            assert!((agent.affinity.sum() - 1.0).abs() < 1e-12);
            assert_eq!(agent.connection_count, 0);
        }
    }

    #[test]
    fn same_seed_same_population() {
        let config = AgentsConfig::default();
        assert_eq!(
            spawn_population(&config, &world(5)),
            spawn_population(&config, &world(5))
        );
        assert_ne!(
            spawn_population(&config, &world(5)),
            spawn_population(&config, &world(6))
        );
    }

    #[test]
    fn degenerate_range_yields_the_single_value() {
        let config = AgentsConfig {
            count: 10,
            initial_food: ValueRange::new(2.0, 2.0),
            ..AgentsConfig::default()
        };
        assert!(
            spawn_population(&config, &world(3))
                .iter()
                .all(|a| (a.food - 2.0).abs() < f64::EPSILON)
        );
    }

    #[test]
    fn zero_count_is_empty() {
        let config = AgentsConfig {
            count: 0,
            ..AgentsConfig::default()
        };
        assert!(spawn_population(&config, &world(1)).is_empty());
    }
}
