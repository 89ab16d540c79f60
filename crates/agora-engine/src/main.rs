//! Engine binary for the Agora simulation.
//!
//! Wires configuration, population seeding, and operator controls around
//! the tick scheduler, then runs the simulation loop until a termination
//! condition is met.
//!
//! # Startup Sequence
//!
//! 1. Resolve and load configuration (`AGORA_CONFIG`, first CLI argument,
//!    or `agora-config.yaml`)
//! 2. Initialize structured logging (tracing)
//! 3. Spawn the seed population
//! 4. Create operator state from simulation bounds and hook Ctrl-C to a
//!    clean stop
//! 5. Run the simulation loop
//! 6. Log the result

mod error;
mod metrics;
mod spawner;

use std::path::PathBuf;
use std::sync::Arc;

use agora_core::config::{LogFormat, SimulationConfig};
use agora_core::operator::OperatorState;
use agora_core::runner;
use agora_core::tick::SimulationState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::metrics::MetricsCallback;

/// Config file used when neither `AGORA_CONFIG` nor an argument is given.
const DEFAULT_CONFIG_PATH: &str = "agora-config.yaml";

/// Environment variable overriding the config path.
const CONFIG_ENV_VAR: &str = "AGORA_CONFIG";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the simulation fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_source) = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    match config.logging.format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }

    info!("agora-engine starting");
    info!(
        source = config_source,
        world_name = config.world.name,
        seed = config.world.seed,
        agents = config.agents.count,
        tick_interval_ms = config.simulation.tick_interval_ms,
        parallel = config.simulation.parallel,
        "Configuration loaded"
    );

    // 3. Spawn the seed population.
    let agents = spawner::spawn_population(&config.agents, &config.world);
    let mut sim_state = SimulationState::from_config(&config, agents);

    // 4. Operator state and Ctrl-C handling.
    let operator = Arc::new(OperatorState::new(&config.simulation));
    info!(
        max_ticks = operator.max_ticks(),
        max_real_time_seconds = operator.max_real_time_seconds(),
        tick_interval_ms = operator.tick_interval_ms(),
        "Operator state initialized"
    );

    let stopper = Arc::clone(&operator);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, stopping after the current tick");
                stopper.request_stop();
            }
            Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
        }
    });

    // 5. Run the simulation.
    let mut callback = MetricsCallback::new(config.logging.metrics_interval_ticks);
    let result = runner::run_simulation(&mut sim_state, &operator, &mut callback)
        .await
        .map_err(EngineError::from)?;

    // 6. Log results.
    runner::log_simulation_end(&result);

    let final_stats = sim_state.population_stats();
    info!(
        tick = final_stats.tick,
        mean_happiness = final_stats.mean_happiness,
        mean_reputation = final_stats.mean_reputation,
        total_connections = final_stats.total_connections,
        reports = callback.latest().map(|s| s.tick),
        "Final population"
    );

    let agent_count = u32::try_from(sim_state.agents.len()).unwrap_or(u32::MAX);
    let status = operator.status(sim_state.clock.tick(), agent_count).await;
    let status_json = serde_json::to_string(&status).map_err(EngineError::from)?;
    info!(status = %status_json, "agora-engine shutdown complete");

    Ok(())
}

/// Resolve the config path and load it.
///
/// An explicitly named file must exist. The default file is optional and
/// built-in defaults are used when it is absent.
fn load_config() -> Result<(SimulationConfig, String), EngineError> {
    let explicit = std::env::var_os(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .or_else(|| std::env::args_os().nth(1).map(PathBuf::from));

    match explicit {
        Some(path) => {
            let config = SimulationConfig::from_file(&path)?;
            Ok((config, path.display().to_string()))
        }
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if path.exists() {
                let config = SimulationConfig::from_file(&path)?;
                Ok((config, DEFAULT_CONFIG_PATH.to_owned()))
            } else {
                Ok((SimulationConfig::default(), "defaults".to_owned()))
            }
        }
    }
}
