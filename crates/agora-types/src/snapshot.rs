//! Read-only post-tick views of the population.
//!
//! The persistence and metrics collaborators never see live agents. They
//! receive [`AgentSnapshot`] records and aggregate [`PopulationStats`] built
//! after a tick has fully completed.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::CulturalGroup;
use crate::ids::AgentId;
use crate::structs::{Affinity, Agent, Vec2};

/// Per-agent fields exported after each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentSnapshot {
    /// Agent identity.
    pub id: AgentId,
    /// Tick at which the snapshot was taken.
    pub tick: u64,
    /// Position at end of tick.
    pub position: Vec2,
    /// Energy at end of tick.
    pub energy: f64,
    /// Happiness at end of tick.
    pub happiness: f64,
    /// Reputation at end of tick.
    pub reputation: f64,
    /// Total connections formed so far.
    pub connection_count: u64,
    /// Cultural group at end of tick.
    pub group: CulturalGroup,
    /// Affinity vector at end of tick.
    pub affinity: Affinity,
}

impl AgentSnapshot {
    /// Capture the exported fields of `agent` at `tick`.
    pub const fn capture(agent: &Agent, tick: u64) -> Self {
        Self {
            id: agent.id,
            tick,
            position: agent.position,
            energy: agent.energy,
            happiness: agent.happiness,
            reputation: agent.reputation,
            connection_count: agent.connection_count,
            group: agent.group,
            affinity: agent.affinity,
        }
    }
}

/// Number of agents identifying with one cultural group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GroupMembership {
    /// The cultural group.
    pub group: CulturalGroup,
    /// Agents currently in the group.
    pub members: u32,
}

/// Aggregate population statistics after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PopulationStats {
    /// Tick the statistics describe.
    pub tick: u64,
    /// Number of agents.
    pub agent_count: u32,
    /// Mean energy, 0 for an empty population.
    pub mean_energy: f64,
    /// Mean happiness, 0 for an empty population.
    pub mean_happiness: f64,
    /// Mean reputation, 0 for an empty population.
    pub mean_reputation: f64,
    /// Mean age in years, 0 for an empty population.
    pub mean_age: f64,
    /// Sum of every agent's connection count.
    pub total_connections: u64,
    /// Membership per cultural group, in index order.
    pub groups: Vec<GroupMembership>,
}

impl PopulationStats {
    /// Compute statistics over `agents` at `tick`.
    pub fn compute(agents: &[Agent], tick: u64) -> Self {
        let agent_count = u32::try_from(agents.len()).unwrap_or(u32::MAX);
        let mut energy = 0.0;
        let mut happiness = 0.0;
        let mut reputation = 0.0;
        let mut age = 0.0;
        let mut total_connections: u64 = 0;
        let mut counts = [0_u32; crate::enums::CULTURAL_GROUP_COUNT];

        for agent in agents {
            energy += agent.energy;
            happiness += agent.happiness;
            reputation += agent.reputation;
            age += agent.age;
            total_connections = total_connections.saturating_add(agent.connection_count);
            if let Some(count) = counts.get_mut(agent.group.index()) {
                *count = count.saturating_add(1);
            }
        }

        let mean = |total: f64| {
            if agent_count == 0 {
                0.0
            } else {
                total / f64::from(agent_count)
            }
        };

        let groups = CulturalGroup::ALL
            .iter()
            .zip(counts.iter())
            .map(|(group, members)| GroupMembership {
                group: *group,
                members: *members,
            })
            .collect();

        Self {
            tick,
            agent_count,
            mean_energy: mean(energy),
            mean_happiness: mean(happiness),
            mean_reputation: mean(reputation),
            mean_age: mean(age),
            total_connections,
            groups,
        }
    }

    /// Membership count for `group`.
    pub fn members_of(&self, group: CulturalGroup) -> u32 {
        self.groups
            .iter()
            .find(|m| m.group == group)
            .map_or(0, |m| m.members)
    }
}
