//! Tick callback that reports population statistics.
//!
//! Every `metrics_interval_ticks` ticks the callback computes
//! [`PopulationStats`] from the post-tick population and logs it. At trace
//! level it also logs one snapshot line per agent. The most recent report
//! is kept so the engine can print it at shutdown.

use agora_core::runner::TickCallback;
use agora_core::tick::{SimulationState, TickSummary};
use agora_types::PopulationStats;
use tracing::{Level, debug, enabled, info, trace};

/// Callback that logs [`PopulationStats`] at a fixed tick interval.
pub struct MetricsCallback {
    interval: u64,
    latest: Option<PopulationStats>,
}

impl MetricsCallback {
    /// Create a callback reporting every `interval` ticks (0 disables it).
    pub const fn new(interval: u64) -> Self {
        Self {
            interval,
            latest: None,
        }
    }

    /// The most recent report, if one has been produced.
    pub const fn latest(&self) -> Option<&PopulationStats> {
        self.latest.as_ref()
    }
}

impl TickCallback for MetricsCallback {
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState) {
        if summary.tick.checked_rem(self.interval) != Some(0) {
            return;
        }

        let stats = state.population_stats();
        info!(
            tick = stats.tick,
            years = state.clock.elapsed_years(),
            agents = stats.agent_count,
            mean_energy = stats.mean_energy,
            mean_happiness = stats.mean_happiness,
            mean_reputation = stats.mean_reputation,
            mean_age = stats.mean_age,
            total_connections = stats.total_connections,
            "Population stats"
        );
        for membership in &stats.groups {
            debug!(
                tick = stats.tick,
                group = %membership.group,
                members = membership.members,
                "Group membership"
            );
        }
        if enabled!(Level::TRACE) {
            for snapshot in state.snapshots() {
                trace!(
                    tick = snapshot.tick,
                    agent = %snapshot.id,
                    x = snapshot.position.x,
                    y = snapshot.position.y,
                    energy = snapshot.energy,
                    happiness = snapshot.happiness,
                    reputation = snapshot.reputation,
                    connections = snapshot.connection_count,
                    group = %snapshot.group,
                    "Agent snapshot"
                );
            }
        }
        self.latest = Some(stats);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use agora_core::config::SimulationConfig;
    use agora_core::tick::{self, Parallelism};
    use agora_types::{Agent, AgentId, CulturalGroup, Vec2};

    use super::*;

    fn state() -> SimulationState {
        let agents = vec![
            Agent::new(AgentId::new(0), Vec2::new(5.0, 5.0), CulturalGroup::Builders),
            Agent::new(AgentId::new(1), Vec2::new(6.0, 5.0), CulturalGroup::Builders),
        ];
        let mut state = SimulationState::from_config(&SimulationConfig::default(), agents);
        state.parallelism = Parallelism::Sequential;
        state
    }

    #[test]
    fn reports_on_interval_ticks_only() {
        let mut state = state();
        let mut metrics = MetricsCallback::new(3);

        for expected in [None, None, Some(3), Some(3), Some(3), Some(6)] {
            let summary = tick::run_tick(&mut state).unwrap();
            metrics.on_tick(&summary, &state);
            assert_eq!(metrics.latest().map(|s| s.tick), expected);
        }
    }

    #[test]
    fn zero_interval_never_reports() {
        let mut state = state();
        let mut metrics = MetricsCallback::new(0);
        for _ in 0..5 {
            let summary = tick::run_tick(&mut state).unwrap();
            metrics.on_tick(&summary, &state);
        }
        assert!(metrics.latest().is_none());
    }

    #[test]
    fn report_counts_group_members() {
        let mut state = state();
        let mut metrics = MetricsCallback::new(1);
        let summary = tick::run_tick(&mut state).unwrap();
        metrics.on_tick(&summary, &state);

        let stats = metrics.latest().unwrap();
        assert_eq!(stats.agent_count, 2);
        assert_eq!(stats.groups.iter().map(|g| g.members).sum::<u32>(), 2);
    }
}
