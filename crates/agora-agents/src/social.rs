//! Social aggregation: agents react to nearby social signals.
//!
//! Each receiver ranks in-range signals nearest-first and processes at most
//! `max_interactions_per_step` of them. Every processed signal contributes
//! an interaction effect of `strength * similarity * distance_factor`,
//! where similarity is 1.0 for a same-group sender and 0.3 otherwise.
//!
//! Accumulated deltas are applied once after the loop, so the order in
//! which signals are processed only affects which signals are processed
//! (when the cap is hit) and the sequence of connection draws.

use agora_types::{Agent, SocialSignal};
use rand::Rng;

use crate::config::InteractionParams;
use crate::proximity::{SignalIndex, distance_factor};

/// Similarity applied to signals from another cultural group.
pub const CROSS_GROUP_SIMILARITY: f64 = 0.3;

/// Happiness gained per unit of interaction effect.
pub const HAPPINESS_PER_EFFECT: f64 = 0.05;

/// Reputation gained per unit of interaction effect.
pub const REPUTATION_PER_EFFECT: f64 = 0.02;

/// Probability of forming a connection per unit of interaction effect.
pub const CONNECTION_CHANCE_PER_EFFECT: f64 = 0.1;

/// Affinity toward a foreign sender's group gained per unit of effect.
pub const AFFINITY_DRIFT_PER_EFFECT: f64 = 0.01;

/// An affinity vector whose sum is within this distance of 1 and that
/// received no drift this pass is considered already normalized.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-12;

/// What happened to one receiver during social aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SocialOutcome {
    /// Signals processed (in range and under the cap).
    pub interactions: u32,
    /// Connections formed this tick.
    pub new_connections: u32,
}

/// Apply one tick of social interactions to `agent`.
///
/// `signals` indexes the closed set of social signals broadcast this tick. One
/// uniform draw is taken from `rng` per processed signal, in nearest-first
/// order.
///
/// # Order of operations
///
/// 1. Rank in-radius signals nearest-first and keep the first
///    `max_interactions_per_step`
/// 2. For each: accumulate happiness and reputation deltas, draw for a new
///    connection, and drift affinity toward a foreign sender's group
/// 3. Apply the deltas clamped to `[0, 1]` and add the connections
/// 4. Renormalize affinity if it drifted or does not already sum to 1
pub fn aggregate_social(
    agent: &mut Agent,
    signals: &SignalIndex<'_, SocialSignal>,
    params: &InteractionParams,
    rng: &mut impl Rng,
) -> SocialOutcome {
    let radius = params.social_radius;
    let neighbors =
        signals.nearest_within(agent.position, radius, params.max_interactions_per_step);

    let mut happiness_delta = 0.0;
    let mut reputation_delta = 0.0;
    let mut outcome = SocialOutcome::default();
    let mut drifted = false;

    for neighbor in &neighbors {
        let sender = neighbor.signal;
        let same_group = sender.group == agent.group;
        let similarity = if same_group { 1.0 } else { CROSS_GROUP_SIMILARITY };
        let effect = sender.strength * similarity * distance_factor(neighbor.distance, radius);

        happiness_delta += effect * HAPPINESS_PER_EFFECT;
        reputation_delta += effect * REPUTATION_PER_EFFECT;

        let chance = (effect * CONNECTION_CHANCE_PER_EFFECT).min(1.0);
        if rng.random::<f64>() < chance {
            outcome.new_connections = outcome.new_connections.saturating_add(1);
        }

        if !same_group {
            agent.affinity.add(sender.group, effect * AFFINITY_DRIFT_PER_EFFECT);
            drifted = true;
        }

        outcome.interactions = outcome.interactions.saturating_add(1);
    }

    agent.happiness = (agent.happiness + happiness_delta).clamp(0.0, 1.0);
    agent.reputation = (agent.reputation + reputation_delta).clamp(0.0, 1.0);
    agent.connection_count = agent
        .connection_count
        .saturating_add(u64::from(outcome.new_connections));

    if drifted || (agent.affinity.sum() - 1.0).abs() > NORMALIZATION_TOLERANCE {
        agent.affinity.renormalize();
    }

    outcome
}

#[cfg(test)]
mod tests {
    use agora_types::{Affinity, AgentId, CulturalGroup, Vec2};
    use rand::rngs::SmallRng;
    use rand::{RngCore, SeedableRng};

    use super::*;

    const EPS: f64 = 1e-9;
    const NO_SIGNALS: [SocialSignal; 0] = [];

    fn receiver() -> Agent {
        let mut agent = Agent::new(AgentId::new(0), Vec2::ZERO, CulturalGroup::Harmonists);
        agent.reputation = 0.5;
        agent.happiness = 0.5;
        agent.energy = 1.0;
        agent
    }

    fn signal(x: f64, y: f64, group: CulturalGroup, strength: f64) -> SocialSignal {
        SocialSignal {
            position: Vec2::new(x, y),
            group,
            strength,
        }
    }

    fn params(radius: f64) -> InteractionParams {
        InteractionParams {
            social_radius: radius,
            ..InteractionParams::default()
        }
    }

    #[test]
    fn same_group_neighbor_at_half_radius() {
        let mut agent = receiver();
        let signals = [signal(3.0, 4.0, CulturalGroup::Harmonists, 0.4)];
        let mut rng = SmallRng::seed_from_u64(1);
        let outcome = aggregate_social(
            &mut agent,
            &SignalIndex::linear(&signals),
            &params(10.0),
            &mut rng,
        );

        // distance 5, factor 0.5, similarity 1.0 -> effect 0.2
        assert_eq!(outcome.interactions, 1);
        assert!((agent.happiness - 0.51).abs() < EPS);
        assert!((agent.reputation - 0.504).abs() < EPS);
    }

    #[test]
    fn no_signals_is_identity() {
        let mut agent = receiver();
        agent.affinity = Affinity::new([0.2, 0.2, 0.2, 0.2, 0.2]);
        let before = agent.clone();
        let mut rng = SmallRng::seed_from_u64(1);
        let outcome = aggregate_social(
            &mut agent,
            &SignalIndex::linear(&NO_SIGNALS),
            &params(10.0),
            &mut rng,
        );
        assert_eq!(outcome, SocialOutcome::default());
        assert_eq!(agent, before);
    }

    #[test]
    fn foreign_sender_pulls_affinity() {
        let mut agent = receiver();
        let before = agent.affinity.get(CulturalGroup::Scholars);
        let signals = [signal(0.0, 0.0, CulturalGroup::Scholars, 1.0)];
        let mut rng = SmallRng::seed_from_u64(2);
        aggregate_social(&mut agent, &SignalIndex::linear(&signals), &params(10.0), &mut rng);

        assert!(agent.affinity.get(CulturalGroup::Scholars) > before);
        assert!((agent.affinity.sum() - 1.0).abs() < EPS);
        // Cross-group similarity: effect = 1.0 * 0.3 * 1.0
        assert!((agent.happiness - (0.5 + 0.3 * HAPPINESS_PER_EFFECT)).abs() < EPS);
    }

    #[test]
    fn cap_limits_processed_signals() {
        let mut agent = receiver();
        let signals: Vec<SocialSignal> = (0..20)
            .map(|i| signal(f64::from(i) * 0.1, 0.0, CulturalGroup::Harmonists, 0.5))
            .collect();
        let p = InteractionParams {
            social_radius: 10.0,
            max_interactions_per_step: 3,
            ..InteractionParams::default()
        };
        let mut rng = SmallRng::seed_from_u64(3);
        let outcome = aggregate_social(&mut agent, &SignalIndex::linear(&signals), &p, &mut rng);
        assert_eq!(outcome.interactions, 3);

        // Nearest three: distances 0.0, 0.1, 0.2
        let expected: f64 = [0.0, 0.1, 0.2]
            .iter()
            .map(|d| 0.5 * (1.0 - d / 10.0) * HAPPINESS_PER_EFFECT)
            .sum();
        assert!((agent.happiness - (0.5 + expected)).abs() < EPS);
    }

    #[test]
    fn out_of_range_signals_do_not_consume_cap() {
        let mut agent = receiver();
        let signals = [
            signal(50.0, 0.0, CulturalGroup::Harmonists, 1.0),
            signal(60.0, 0.0, CulturalGroup::Harmonists, 1.0),
            signal(1.0, 0.0, CulturalGroup::Harmonists, 1.0),
        ];
        let p = InteractionParams {
            social_radius: 10.0,
            max_interactions_per_step: 1,
            ..InteractionParams::default()
        };
        let mut rng = SmallRng::seed_from_u64(4);
        let outcome = aggregate_social(&mut agent, &SignalIndex::linear(&signals), &p, &mut rng);
        assert_eq!(outcome.interactions, 1);
        assert!(agent.happiness > 0.5);
    }

    #[test]
    fn values_stay_clamped() {
        let mut agent = receiver();
        agent.happiness = 0.999;
        agent.reputation = 0.999;
        let signals: Vec<SocialSignal> = (0..10)
            .map(|_| signal(0.0, 0.0, CulturalGroup::Harmonists, 1.0))
            .collect();
        let mut rng = SmallRng::seed_from_u64(5);
        aggregate_social(&mut agent, &SignalIndex::linear(&signals), &params(10.0), &mut rng);
        assert!(agent.happiness <= 1.0);
        assert!(agent.reputation <= 1.0);
    }

    /// Generator that always yields the same word, so every uniform `f64`
    /// draw returns the same value.
    struct FixedRng(u64);

    impl RngCore for FixedRng {
        #[allow(clippy::cast_possible_truncation)]
        fn next_u32(&mut self) -> u32 {
            (self.0 >> 32) as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            for (byte, source) in dst.iter_mut().zip(self.0.to_le_bytes().iter().cycle()) {
                *byte = *source;
            }
        }
    }

    /// A word whose uniform `f64` draw is exactly 2^-4 = 0.0625.
    const DRAW_0_0625: u64 = 1 << 60;

    fn co_located(count: usize, group: CulturalGroup) -> Vec<SocialSignal> {
        vec![signal(0.0, 0.0, group, 1.0); count]
    }

    #[test]
    fn zero_draw_connects_on_every_signal() {
        let mut agent = receiver();
        agent.connection_count = 4;
        let signals = co_located(10, CulturalGroup::Harmonists);
        let outcome = aggregate_social(
            &mut agent,
            &SignalIndex::linear(&signals),
            &params(10.0),
            &mut FixedRng(0),
        );
        assert_eq!(outcome.interactions, 10);
        assert_eq!(outcome.new_connections, 10);
        assert_eq!(agent.connection_count, 14);
    }

    #[test]
    fn high_draw_never_connects() {
        let mut agent = receiver();
        let signals = co_located(10, CulturalGroup::Harmonists);
        let outcome = aggregate_social(
            &mut agent,
            &SignalIndex::linear(&signals),
            &params(10.0),
            &mut FixedRng(u64::MAX),
        );
        assert_eq!(outcome.interactions, 10);
        assert_eq!(outcome.new_connections, 0);
        assert_eq!(agent.connection_count, 0);
    }

    #[test]
    fn connection_chance_scales_with_effect() {
        // A draw of 0.0625 is under the 0.1 chance of a same-group effect
        // of 1.0 but over the 0.03 chance of a cross-group effect of 0.3.
        let mut same = receiver();
        let signals = co_located(3, CulturalGroup::Harmonists);
        let outcome = aggregate_social(
            &mut same,
            &SignalIndex::linear(&signals),
            &params(10.0),
            &mut FixedRng(DRAW_0_0625),
        );
        assert_eq!(outcome.new_connections, 3);

        let mut foreign = receiver();
        let signals = co_located(3, CulturalGroup::Scholars);
        let outcome = aggregate_social(
            &mut foreign,
            &SignalIndex::linear(&signals),
            &params(10.0),
            &mut FixedRng(DRAW_0_0625),
        );
        assert_eq!(outcome.new_connections, 0);
    }

    #[test]
    fn seeded_runs_form_connections() {
        // Ten signals at a 0.1 chance each, over fifty seeds: about fifty
        // connections are expected and none at all is vanishingly unlikely.
        let signals = co_located(10, CulturalGroup::Harmonists);
        let mut total: u64 = 0;
        for seed in 0..50 {
            let mut agent = receiver();
            let mut rng = SmallRng::seed_from_u64(seed);
            let outcome = aggregate_social(
                &mut agent,
                &SignalIndex::linear(&signals),
                &params(10.0),
                &mut rng,
            );
            assert!(outcome.new_connections <= outcome.interactions);
            assert_eq!(agent.connection_count, u64::from(outcome.new_connections));
            total = total.saturating_add(agent.connection_count);
        }
        assert!(total > 0);
        assert!(total < 500);
    }

    #[test]
    fn same_seed_gives_same_connections() {
        let signals: Vec<SocialSignal> = (0..10)
            .map(|i| signal(f64::from(i) * 0.3, 0.0, CulturalGroup::Harmonists, 1.0))
            .collect();
        let run = |seed| {
            let mut agent = receiver();
            let mut rng = SmallRng::seed_from_u64(seed);
            aggregate_social(&mut agent, &SignalIndex::linear(&signals), &params(10.0), &mut rng)
        };
        assert_eq!(run(77), run(77));
    }

    #[test]
    fn unnormalized_affinity_is_renormalized() {
        let mut agent = receiver();
        agent.affinity = Affinity::new([0.5, 0.5, 0.5, 0.5, 0.5]);
        let mut rng = SmallRng::seed_from_u64(8);
        aggregate_social(&mut agent, &SignalIndex::linear(&NO_SIGNALS), &params(10.0), &mut rng);
        assert!((agent.affinity.sum() - 1.0).abs() < EPS);
    }
}
