//! Simulation loop runner with operator controls.
//!
//! [`run_simulation`] drives the tick loop with support for:
//!
//! - **Bounded simulation**: stop after `max_ticks` or `max_real_time_seconds`
//! - **Pause/resume**: the operator can halt and continue the loop
//! - **Variable tick speed**: tick interval adjustable at runtime
//! - **Operator stop**: clean stop between ticks
//!
//! Control requests are only observed between ticks. A tick, once started,
//! always runs all of its phases, so every agent sees every phase of every
//! tick that was executed.

use std::sync::Arc;

use tracing::{info, warn};

use crate::operator::{OperatorState, SimulationEndReason};
use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
///
/// The callback receives the tick summary and the post-tick state, so it
/// can compute statistics or record snapshots.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Run the simulation loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails unrecoverably.
pub async fn run_simulation(
    state: &mut SimulationState,
    operator: &Arc<OperatorState>,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        agents = state.agents.len(),
        max_ticks = operator.max_ticks(),
        max_real_time_seconds = operator.max_real_time_seconds(),
        tick_interval_ms = operator.tick_interval_ms(),
        parallelism = ?state.parallelism,
        "Simulation starting"
    );

    if state.agents.is_empty() {
        warn!("Population is empty; nothing to simulate");
        return Ok(finish(operator, SimulationEndReason::EmptyPopulation, None, 0).await);
    }

    loop {
        // --- Check pause ---
        if operator.is_paused() {
            info!("Simulation paused, waiting for resume...");
            operator.wait_if_paused().await;
            info!("Simulation resumed");
        }

        // --- Check stop request (before tick) ---
        if operator.is_stop_requested() {
            info!("Operator stop requested");
            return Ok(finish(
                operator,
                SimulationEndReason::OperatorStop,
                last_summary,
                total_ticks,
            )
            .await);
        }

        // --- Check time limit (before tick) ---
        if operator.time_limit_reached() {
            info!(
                max_seconds = operator.max_real_time_seconds(),
                elapsed = operator.elapsed_seconds(),
                "Real-time limit reached"
            );
            return Ok(finish(
                operator,
                SimulationEndReason::MaxRealTimeReached,
                last_summary,
                total_ticks,
            )
            .await);
        }

        // --- Execute tick ---
        let summary = tick::run_tick(state)?;
        total_ticks = total_ticks.saturating_add(1);

        callback.on_tick(&summary, state);

        // --- Check tick limit (after tick) ---
        // summary.tick is the tick that just ran, so max_ticks = 5 stops
        // after tick 5 has completed.
        if operator.tick_limit_reached(summary.tick) {
            info!(
                tick = summary.tick,
                max_ticks = operator.max_ticks(),
                "Tick limit reached"
            );
            return Ok(finish(
                operator,
                SimulationEndReason::MaxTicksReached,
                Some(summary),
                total_ticks,
            )
            .await);
        }

        last_summary = Some(summary);

        // --- Sleep for tick interval ---
        let interval_ms = operator.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }
    }
}

async fn finish(
    operator: &OperatorState,
    end_reason: SimulationEndReason,
    final_summary: Option<TickSummary>,
    total_ticks: u64,
) -> SimulationResult {
    operator.set_end_reason(end_reason).await;
    SimulationResult {
        end_reason,
        final_summary,
        total_ticks,
    }
}

/// Log the simulation end sequence.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            agents = summary.agents,
            social_signals = summary.social_signals,
            cultural_signals = summary.cultural_signals,
            group_switches = summary.group_switches,
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}
