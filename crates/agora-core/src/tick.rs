//! Tick cycle: the four-phase loop that drives the Agora population.
//!
//! Each tick runs these phases in order, with a barrier after every one:
//!
//! 1. **Movement** -- jitter, clamp, integrate, and reflect each agent's
//!    velocity and position.
//! 2. **Social** -- every agent with enough energy broadcasts a social
//!    signal; once the set is closed, every agent aggregates the signals
//!    within the social radius.
//! 3. **Cultural** -- every agent with enough standing broadcasts a
//!    cultural signal; once the set is closed, every agent aggregates the
//!    signals within the cultural radius and may switch groups.
//! 4. **Core state** -- unconditional energy decay, food consumption, and
//!    aging.
//!
//! Within a phase every agent reads only its own state plus the frozen
//! signal slice of that phase, so the phase runs over the agent slice with
//! rayon and needs no locks. The scheduler never adds, removes, or reorders
//! agents. All randomness comes from [`RandomStreams`], which makes a
//! parallel tick bit-identical to a sequential one.

use agora_agents::proximity::SignalIndex;
use agora_agents::{
    InteractionParams, aggregate_cultural, aggregate_social, apply_core_state, apply_movement,
    cultural_signal, social_signal,
};
use agora_types::{Agent, AgentSnapshot, CulturalSignal, PopulationStats, SocialSignal};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::clock::{ClockError, SimulationClock};
use crate::config::SimulationConfig;
use crate::rng::{RandomStreams, Stream};

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// How the per-agent work of each phase is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    /// Spread each phase across the rayon thread pool.
    #[default]
    Parallel,
    /// Visit agents one after another on the calling thread.
    Sequential,
}

impl Parallelism {
    /// Map the `simulation.parallel` config flag to a mode.
    pub const fn from_flag(parallel: bool) -> Self {
        if parallel {
            Self::Parallel
        } else {
            Self::Sequential
        }
    }
}

/// Everything a tick reads and writes.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// The simulation clock.
    pub clock: SimulationClock,
    /// The population, in stable slice order.
    pub agents: Vec<Agent>,
    /// Environment parameters shared by every phase.
    pub params: InteractionParams,
    /// World seed feeding [`RandomStreams`].
    pub seed: u64,
    /// Execution mode for the phases.
    pub parallelism: Parallelism,
}

impl SimulationState {
    /// Create a state at tick 0.
    pub fn new(
        agents: Vec<Agent>,
        params: InteractionParams,
        seed: u64,
        parallelism: Parallelism,
    ) -> Self {
        if params.social_radius <= 0.0 {
            warn!("social_radius is zero; only co-located social signals will be received");
        }
        if params.cultural_radius <= 0.0 {
            warn!("cultural_radius is zero; only co-located cultural signals will be received");
        }
        if params.max_interactions_per_step == 0 {
            warn!("max_interactions_per_step is zero; social signals will be ignored");
        }
        Self {
            clock: SimulationClock::new(params.steps_per_year),
            agents,
            params,
            seed,
            parallelism,
        }
    }

    /// Create a state from validated configuration and a seeded population.
    pub fn from_config(config: &SimulationConfig, agents: Vec<Agent>) -> Self {
        Self::new(
            agents,
            config.interaction_params(),
            config.world.seed,
            Parallelism::from_flag(config.simulation.parallel),
        )
    }

    /// Aggregate statistics for the current population.
    pub fn population_stats(&self) -> PopulationStats {
        PopulationStats::compute(&self.agents, self.clock.tick())
    }

    /// Observation records for every agent at the current tick.
    pub fn snapshots(&self) -> Vec<AgentSnapshot> {
        let tick = self.clock.tick();
        self.agents
            .iter()
            .map(|agent| AgentSnapshot::capture(agent, tick))
            .collect()
    }
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Population size (unchanged by the tick).
    pub agents: u32,
    /// Agents that had enough energy to move.
    pub moved: u64,
    /// Social signals broadcast.
    pub social_signals: u32,
    /// Social signals processed across all receivers.
    pub interactions: u64,
    /// Connections formed.
    pub new_connections: u64,
    /// Cultural signals broadcast.
    pub cultural_signals: u32,
    /// Receivers whose affinity was shifted by cultural influence.
    pub cultural_updates: u64,
    /// Agents that changed cultural group.
    pub group_switches: u64,
    /// Agents that entered the core-state phase without food.
    pub hungry: u64,
}

// ---------------------------------------------------------------------------
// Per-agent tallies
// ---------------------------------------------------------------------------

/// Integer counters folded over the agents of one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhaseTally {
    /// Agents that moved.
    pub moved: u64,
    /// Social signals processed.
    pub interactions: u64,
    /// Connections formed.
    pub new_connections: u64,
    /// Receivers whose affinity was shifted by cultural influence.
    pub cultural_updates: u64,
    /// Group switches.
    pub group_switches: u64,
    /// Hungry agents.
    pub hungry: u64,
}

impl PhaseTally {
    const fn merge(self, other: Self) -> Self {
        Self {
            moved: self.moved.saturating_add(other.moved),
            interactions: self.interactions.saturating_add(other.interactions),
            new_connections: self.new_connections.saturating_add(other.new_connections),
            cultural_updates: self.cultural_updates.saturating_add(other.cultural_updates),
            group_switches: self.group_switches.saturating_add(other.group_switches),
            hungry: self.hungry.saturating_add(other.hungry),
        }
    }
}

/// Run `work` on every agent and fold the tallies. Returns only after every
/// agent has been visited.
fn each_agent<F>(agents: &mut [Agent], mode: Parallelism, work: F) -> PhaseTally
where
    F: Fn(&mut Agent) -> PhaseTally + Sync + Send,
{
    match mode {
        Parallelism::Parallel => agents
            .par_iter_mut()
            .map(work)
            .reduce(PhaseTally::default, PhaseTally::merge),
        Parallelism::Sequential => agents
            .iter_mut()
            .map(work)
            .fold(PhaseTally::default(), PhaseTally::merge),
    }
}

/// Collect the signals emitted by `agents`, in agent slice order.
fn broadcast<S, F>(agents: &[Agent], mode: Parallelism, emit: F) -> Vec<S>
where
    S: Send,
    F: Fn(&Agent) -> Option<S> + Sync + Send,
{
    match mode {
        Parallelism::Parallel => agents.par_iter().filter_map(emit).collect(),
        Parallelism::Sequential => agents.iter().filter_map(emit).collect(),
    }
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Movement phase.
pub fn movement_phase(
    agents: &mut [Agent],
    params: &InteractionParams,
    streams: RandomStreams,
    mode: Parallelism,
) -> PhaseTally {
    each_agent(agents, mode, |agent| {
        let mut rng = streams.for_agent(agent.id, Stream::Movement);
        PhaseTally {
            moved: u64::from(apply_movement(agent, params, &mut rng)),
            ..PhaseTally::default()
        }
    })
}

/// Social broadcast: the closed set of social signals for this tick.
pub fn social_broadcast(agents: &[Agent], mode: Parallelism) -> Vec<SocialSignal> {
    broadcast(agents, mode, social_signal)
}

/// Social aggregation over a frozen signal set.
pub fn social_phase(
    agents: &mut [Agent],
    signals: &[SocialSignal],
    params: &InteractionParams,
    streams: RandomStreams,
    mode: Parallelism,
) -> PhaseTally {
    let index = SignalIndex::new(signals, params.social_radius);
    each_agent(agents, mode, |agent| {
        let mut rng = streams.for_agent(agent.id, Stream::Connection);
        let outcome = aggregate_social(agent, &index, params, &mut rng);
        PhaseTally {
            interactions: u64::from(outcome.interactions),
            new_connections: u64::from(outcome.new_connections),
            ..PhaseTally::default()
        }
    })
}

/// Cultural broadcast: the closed set of cultural signals for this tick.
pub fn cultural_broadcast(
    agents: &[Agent],
    params: &InteractionParams,
    mode: Parallelism,
) -> Vec<CulturalSignal> {
    broadcast(agents, mode, |agent| cultural_signal(agent, params))
}

/// Cultural aggregation over a frozen signal set.
pub fn cultural_phase(
    agents: &mut [Agent],
    signals: &[CulturalSignal],
    params: &InteractionParams,
    mode: Parallelism,
) -> PhaseTally {
    let index = SignalIndex::new(signals, params.cultural_radius);
    each_agent(agents, mode, |agent| {
        let outcome = aggregate_cultural(agent, &index, params);
        PhaseTally {
            cultural_updates: u64::from(outcome.applied),
            group_switches: u64::from(outcome.switched_from.is_some()),
            ..PhaseTally::default()
        }
    })
}

/// Core-state phase.
pub fn core_state_phase(
    agents: &mut [Agent],
    params: &InteractionParams,
    mode: Parallelism,
) -> PhaseTally {
    each_agent(agents, mode, |agent| PhaseTally {
        hungry: u64::from(apply_core_state(agent, params)),
        ..PhaseTally::default()
    })
}

// ---------------------------------------------------------------------------
// Tick
// ---------------------------------------------------------------------------

/// Execute one complete tick.
///
/// The clock advances first, so the first tick of a run is tick 1. Signal
/// vectors live only for the duration of their phase pair and are dropped
/// before this function returns.
///
/// # Errors
///
/// Returns [`TickError::Clock`] if the tick counter would overflow. In that
/// case no agent has been touched.
pub fn run_tick(state: &mut SimulationState) -> Result<TickSummary, TickError> {
    let tick = state.clock.advance()?;
    let mode = state.parallelism;
    let params = &state.params;
    let streams = RandomStreams::new(state.seed, tick);

    let movement = movement_phase(&mut state.agents, params, streams, mode);
    debug!(tick, moved = movement.moved, "Movement phase complete");

    let social_signals = social_broadcast(&state.agents, mode);
    let social = social_phase(&mut state.agents, &social_signals, params, streams, mode);
    debug!(
        tick,
        signals = social_signals.len(),
        interactions = social.interactions,
        new_connections = social.new_connections,
        "Social phase complete"
    );

    let cultural_signals = cultural_broadcast(&state.agents, params, mode);
    let cultural = cultural_phase(&mut state.agents, &cultural_signals, params, mode);
    debug!(
        tick,
        signals = cultural_signals.len(),
        updates = cultural.cultural_updates,
        group_switches = cultural.group_switches,
        "Cultural phase complete"
    );

    let core = core_state_phase(&mut state.agents, params, mode);
    debug!(tick, hungry = core.hungry, "Core-state phase complete");

    let summary = TickSummary {
        tick,
        agents: count(state.agents.len()),
        moved: movement.moved,
        social_signals: count(social_signals.len()),
        interactions: social.interactions,
        new_connections: social.new_connections,
        cultural_signals: count(cultural_signals.len()),
        cultural_updates: cultural.cultural_updates,
        group_switches: cultural.group_switches,
        hungry: core.hungry,
    };

    info!(
        tick,
        years = state.clock.elapsed_years(),
        agents = summary.agents,
        social_signals = summary.social_signals,
        cultural_signals = summary.cultural_signals,
        new_connections = summary.new_connections,
        group_switches = summary.group_switches,
        "Tick complete"
    );

    Ok(summary)
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
