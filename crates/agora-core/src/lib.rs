//! Tick scheduling, configuration, and orchestration for the Agora
//! simulation.
//!
//! This crate owns the four-phase tick that drives the population:
//! Movement, Social (broadcast then aggregate), Cultural (broadcast then
//! aggregate), and Core-State update, with a barrier between every phase.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter and simulated-year derivation.
//! - [`config`] -- Configuration loading from `agora-config.yaml` into
//!   strongly-typed structs, with validation.
//! - [`operator`] -- Shared pause/resume/stop/speed control state.
//! - [`rng`] -- Per-agent, per-tick reproducible random streams.
//! - [`runner`] -- The async run loop and [`TickCallback`] hook.
//! - [`tick`] -- The phase functions and the single-tick scheduler.
//!
//! [`TickCallback`]: runner::TickCallback

pub mod clock;
pub mod config;
pub mod operator;
pub mod rng;
pub mod runner;
pub mod tick;
