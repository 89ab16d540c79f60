//! Configuration loading and typed config structures for the Agora
//! simulation.
//!
//! The canonical configuration lives in `agora-config.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure, a loader,
//! and the validation that guarantees the phase kernels only ever see
//! well-formed parameters.

use std::path::Path;

use agora_agents::InteractionParams;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is outside its legal range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `agora-config.yaml`. Every section and field
/// has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World name, seed, and bounds.
    #[serde(default)]
    pub world: WorldConfig,

    /// Population size and initial-state ranges.
    #[serde(default)]
    pub agents: AgentsConfig,

    /// Interaction radii and cultural dynamics.
    #[serde(default)]
    pub interaction: InteractionConfig,

    /// Run bounds, pacing, and execution mode.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load and validate configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every value the phase kernels rely on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("world.width", self.world.width)?;
        positive("world.height", self.world.height)?;
        non_negative("agents.max_speed", self.agents.max_speed)?;
        non_negative("interaction.social_radius", self.interaction.social_radius)?;
        non_negative("interaction.cultural_radius", self.interaction.cultural_radius)?;
        non_negative(
            "interaction.influence_strength_factor",
            self.interaction.influence_strength_factor,
        )?;
        unit("interaction.cultural_shift_factor", self.interaction.cultural_shift_factor)?;
        unit("interaction.group_change_threshold", self.interaction.group_change_threshold)?;
        non_negative("simulation.steps_per_year", self.simulation.steps_per_year)?;

        let a = &self.agents;
        a.initial_energy.validate("agents.initial_energy", Some(1.0))?;
        a.initial_food.validate("agents.initial_food", None)?;
        a.initial_age.validate("agents.initial_age", None)?;
        a.initial_happiness.validate("agents.initial_happiness", Some(1.0))?;
        a.initial_reputation.validate("agents.initial_reputation", Some(1.0))?;
        unit("agents.dominant_affinity", a.dominant_affinity)?;
        Ok(())
    }

    /// Build the immutable per-tick parameter struct for the phase kernels.
    pub fn interaction_params(&self) -> InteractionParams {
        InteractionParams {
            world_width: self.world.width,
            world_height: self.world.height,
            max_speed: self.agents.max_speed,
            social_radius: self.interaction.social_radius,
            cultural_radius: self.interaction.cultural_radius,
            max_interactions_per_step: self.interaction.max_interactions_per_step,
            influence_strength_factor: self.interaction.influence_strength_factor,
            cultural_shift_factor: self.interaction.cultural_shift_factor,
            group_change_threshold: self.interaction.group_change_threshold,
            steps_per_year: self.simulation.steps_per_year,
        }
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} is not a finite number"),
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("{value} must not be negative"),
        });
    }
    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("{value} must be greater than zero"),
        });
    }
    Ok(())
}

fn unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("{value} must lie in [0, 1]"),
        });
    }
    Ok(())
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// World width; x coordinates lie in `[0, width]`.
    #[serde(default = "default_world_extent")]
    pub width: f64,

    /// World height; y coordinates lie in `[0, height]`.
    #[serde(default = "default_world_extent")]
    pub height: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            width: default_world_extent(),
            height: default_world_extent(),
        }
    }
}

/// An inclusive range an initial value is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ValueRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl ValueRange {
    /// Create a range.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn validate(&self, field: &'static str, ceiling: Option<f64>) -> Result<(), ConfigError> {
        non_negative(field, self.min)?;
        non_negative(field, self.max)?;
        if self.min > self.max {
            return Err(ConfigError::Invalid {
                field,
                reason: format!("min {} exceeds max {}", self.min, self.max),
            });
        }
        if let Some(ceiling) = ceiling
            && self.max > ceiling
        {
            return Err(ConfigError::Invalid {
                field,
                reason: format!("max {} exceeds {ceiling}", self.max),
            });
        }
        Ok(())
    }
}

/// Population configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentsConfig {
    /// Number of agents to spawn at simulation start.
    #[serde(default = "default_agent_count")]
    pub count: u32,

    /// Maximum agent speed in world units per tick.
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,

    /// Range for initial energy.
    #[serde(default = "default_unit_range")]
    pub initial_energy: ValueRange,

    /// Range for initial food reserves.
    #[serde(default = "default_food_range")]
    pub initial_food: ValueRange,

    /// Range for initial age in years.
    #[serde(default = "default_age_range")]
    pub initial_age: ValueRange,

    /// Range for initial happiness.
    #[serde(default = "default_mid_range")]
    pub initial_happiness: ValueRange,

    /// Range for initial reputation.
    #[serde(default = "default_mid_range")]
    pub initial_reputation: ValueRange,

    /// Affinity a new agent holds toward its own group.
    #[serde(default = "default_dominant_affinity")]
    pub dominant_affinity: f64,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            count: default_agent_count(),
            max_speed: default_max_speed(),
            initial_energy: default_unit_range(),
            initial_food: default_food_range(),
            initial_age: default_age_range(),
            initial_happiness: default_mid_range(),
            initial_reputation: default_mid_range(),
            dominant_affinity: default_dominant_affinity(),
        }
    }
}

/// Interaction configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InteractionConfig {
    /// Radius within which social signals are received.
    #[serde(default = "default_social_radius")]
    pub social_radius: f64,

    /// Radius within which cultural signals are received.
    #[serde(default = "default_cultural_radius")]
    pub cultural_radius: f64,

    /// Maximum in-range social signals processed per agent per tick.
    #[serde(default = "default_max_interactions")]
    pub max_interactions_per_step: usize,

    /// Multiplier on `reputation * happiness` for cultural influence.
    #[serde(default = "default_influence_strength_factor")]
    pub influence_strength_factor: f64,

    /// Affinity shift toward a group that supplies all received influence.
    #[serde(default = "default_cultural_shift_factor")]
    pub cultural_shift_factor: f64,

    /// Affinity a challenger group must strictly exceed to win a switch.
    #[serde(default = "default_group_change_threshold")]
    pub group_change_threshold: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            social_radius: default_social_radius(),
            cultural_radius: default_cultural_radius(),
            max_interactions_per_step: default_max_interactions(),
            influence_strength_factor: default_influence_strength_factor(),
            cultural_shift_factor: default_cultural_shift_factor(),
            group_change_threshold: default_group_change_threshold(),
        }
    }
}

/// Simulation boundary and pacing parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Maximum ticks before stopping (0 = unlimited).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Maximum wall-clock seconds before stopping (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,

    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Ticks per simulated year (0 disables aging).
    #[serde(default = "default_steps_per_year")]
    pub steps_per_year: f64,

    /// Run phases across a thread pool rather than on one thread.
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
            max_real_time_seconds: 0,
            tick_interval_ms: default_tick_interval_ms(),
            steps_per_year: default_steps_per_year(),
            parallel: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for log lines.
    #[serde(default)]
    pub format: LogFormat,

    /// Ticks between population statistics reports (0 = never).
    #[serde(default = "default_metrics_interval_ticks")]
    pub metrics_interval_ticks: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            metrics_interval_ticks: default_metrics_interval_ticks(),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

// ---------------------------------------------------------------------------
// Default value functions (required by serde)
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Agora".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_world_extent() -> f64 {
    100.0
}

const fn default_agent_count() -> u32 {
    50
}

const fn default_max_speed() -> f64 {
    5.0
}

const fn default_unit_range() -> ValueRange {
    ValueRange::new(0.5, 1.0)
}

const fn default_food_range() -> ValueRange {
    ValueRange::new(1.0, 5.0)
}

const fn default_age_range() -> ValueRange {
    ValueRange::new(20.0, 50.0)
}

const fn default_mid_range() -> ValueRange {
    ValueRange::new(0.3, 0.7)
}

const fn default_dominant_affinity() -> f64 {
    0.6
}

const fn default_social_radius() -> f64 {
    5.0
}

const fn default_cultural_radius() -> f64 {
    10.0
}

const fn default_max_interactions() -> usize {
    10
}

const fn default_influence_strength_factor() -> f64 {
    1.0
}

const fn default_cultural_shift_factor() -> f64 {
    0.05
}

const fn default_group_change_threshold() -> f64 {
    0.4
}

const fn default_max_ticks() -> u64 {
    1000
}

const fn default_tick_interval_ms() -> u64 {
    100
}

const fn default_steps_per_year() -> f64 {
    365.0
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_metrics_interval_ticks() -> u64 {
    10
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.agents.count, 50);
        assert_eq!(config.interaction.max_interactions_per_step, 10);
        assert!(config.simulation.parallel);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  name: "Test Society"
  seed: 123
  width: 200.0
  height: 80.0

agents:
  count: 2500
  max_speed: 3.0
  initial_energy: { min: 0.8, max: 1.0 }
  initial_age: { min: 18.0, max: 60.0 }
  dominant_affinity: 0.5

interaction:
  social_radius: 8.0
  cultural_radius: 12.0
  max_interactions_per_step: 4
  influence_strength_factor: 0.8
  cultural_shift_factor: 0.1
  group_change_threshold: 0.35

simulation:
  max_ticks: 500
  max_real_time_seconds: 60
  tick_interval_ms: 0
  steps_per_year: 52.0
  parallel: false

logging:
  level: "debug"
  format: json
  metrics_interval_ticks: 25
"#;

        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.world.name, "Test Society");
        assert_eq!(config.world.seed, 123);
        assert_eq!(config.agents.count, 2500);
        assert_eq!(config.interaction.max_interactions_per_step, 4);
        assert_eq!(config.simulation.max_ticks, 500);
        assert!(!config.simulation.parallel);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);

        let params = config.interaction_params();
        assert!((params.world_width - 200.0).abs() < f64::EPSILON);
        assert!((params.max_speed - 3.0).abs() < f64::EPSILON);
        assert!((params.steps_per_year - 52.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("world:\n  seed: 7\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.agents.count, 50);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(SimulationConfig::parse("").is_ok());
    }

    #[test]
    fn negative_radius_is_rejected() {
        let result = SimulationConfig::parse("interaction:\n  social_radius: -1.0\n");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "interaction.social_radius",
                ..
            })
        ));
    }

    #[test]
    fn threshold_outside_unit_interval_is_rejected() {
        let result = SimulationConfig::parse("interaction:\n  group_change_threshold: 1.5\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let result = SimulationConfig::parse("agents:\n  initial_food: { min: 3.0, max: 1.0 }\n");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "agents.initial_food",
                ..
            })
        ));
    }

    #[test]
    fn zero_radius_is_allowed() {
        let result = SimulationConfig::parse("interaction:\n  cultural_radius: 0.0\n");
        assert!(result.is_ok());
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let result = SimulationConfig::parse("world: [unterminated");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = SimulationConfig::from_file(Path::new("/nonexistent/agora-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("agora-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
