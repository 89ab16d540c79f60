//! Per-agent kernels for the Agora simulation.
//!
//! Every function in this crate operates on a single agent, optionally
//! reading an immutable slice of tick-scoped signals. Nothing here touches
//! another agent's state, performs I/O, or can fail, which is what lets the
//! scheduler in `agora-core` run each phase across the population in
//! parallel without locks.
//!
//! # Modules
//!
//! - [`config`] -- Immutable per-tick environment parameters ([`InteractionParams`])
//! - [`movement`] -- Velocity jitter, speed clamp, boundary reflection, energy cost
//! - [`signal`] -- Social and cultural broadcast (signal emission rules)
//! - [`proximity`] -- Radius filtering, nearest-first ranking, distance falloff
//! - [`social`] -- Social interaction aggregation (happiness, reputation, connections)
//! - [`culture`] -- Cultural influence aggregation and group switching
//! - [`vitals`] -- Unconditional per-tick energy decay, food consumption, aging

pub mod config;
pub mod culture;
pub mod movement;
pub mod proximity;
pub mod signal;
pub mod social;
pub mod vitals;

pub use config::InteractionParams;
pub use culture::{CulturalOutcome, aggregate_cultural};
pub use movement::apply_movement;
pub use signal::{cultural_signal, social_signal};
pub use social::{SocialOutcome, aggregate_social};
pub use vitals::apply_core_state;
