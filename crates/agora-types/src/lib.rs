//! Shared type definitions for the Agora society simulation.
//!
//! This crate is the single source of truth for the data model used across
//! the Agora workspace. Snapshot types flow downstream to `TypeScript` via
//! `ts-rs` for dashboards that consume post-tick state.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe integer wrapper for agent identifiers
//! - [`enums`] -- The fixed cultural group enumeration
//! - [`structs`] -- Agents, positions, and affinity vectors
//! - [`signals`] -- Immutable tick-scoped messages emitted during broadcast
//! - [`snapshot`] -- Read-only post-tick views for persistence and metrics

pub mod enums;
pub mod ids;
pub mod signals;
pub mod snapshot;
pub mod structs;

pub use enums::{CULTURAL_GROUP_COUNT, CulturalGroup};
pub use ids::AgentId;
pub use signals::{CulturalSignal, SocialSignal};
pub use snapshot::{AgentSnapshot, GroupMembership, PopulationStats};
pub use structs::{Affinity, Agent, Vec2};
