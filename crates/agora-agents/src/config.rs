//! Environment parameters read by every phase kernel.
//!
//! The engine builds one [`InteractionParams`] from validated configuration
//! at simulation start and passes it by shared reference into each phase.
//! No kernel mutates it, and no kernel revalidates it: negative radii or
//! out-of-range thresholds are rejected upstream by the config loader.

/// Immutable world and interaction parameters for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionParams {
    /// Width of the world; x coordinates lie in `[0, world_width]`.
    pub world_width: f64,

    /// Height of the world; y coordinates lie in `[0, world_height]`.
    pub world_height: f64,

    /// Maximum agent speed in world units per tick (default: 5.0).
    pub max_speed: f64,

    /// Radius within which social signals are received (default: 5.0).
    pub social_radius: f64,

    /// Radius within which cultural signals are received (default: 10.0).
    pub cultural_radius: f64,

    /// Maximum in-radius social signals processed per agent per tick
    /// (default: 10).
    pub max_interactions_per_step: usize,

    /// Multiplier applied to `reputation * happiness` when computing
    /// cultural influence strength (default: 1.0).
    pub influence_strength_factor: f64,

    /// Affinity gained by a group receiving all of an agent's incoming
    /// influence in one tick (default: 0.05).
    pub cultural_shift_factor: f64,

    /// Affinity a challenger group must strictly exceed before an agent
    /// switches to it (default: 0.4).
    pub group_change_threshold: f64,

    /// Ticks per simulated year; 0 disables aging (default: 365).
    pub steps_per_year: f64,
}

impl Default for InteractionParams {
    fn default() -> Self {
        Self {
            world_width: 100.0,
            world_height: 100.0,
            max_speed: 5.0,
            social_radius: 5.0,
            cultural_radius: 10.0,
            max_interactions_per_step: 10,
            influence_strength_factor: 1.0,
            cultural_shift_factor: 0.05,
            group_change_threshold: 0.4,
            steps_per_year: 365.0,
        }
    }
}

impl InteractionParams {
    /// Age added to every agent per tick, in years.
    pub const fn age_per_tick(&self) -> f64 {
        if self.steps_per_year > 0.0 {
            1.0 / self.steps_per_year
        } else {
            0.0
        }
    }
}
