//! Operator control state for runtime simulation management.
//!
//! The tick loop and whoever drives it (the engine's signal handler, a test,
//! an embedding application) share one [`OperatorState`]. Through it the
//! operator can pause and resume, change tick pacing, and request a clean
//! shutdown without stopping the process. Requests take effect between
//! ticks; a tick that has started always runs to completion.
//!
//! All mutable control fields are atomics so they can be read on the tick
//! loop hot path without locks, with the state itself shared via
//! [`Arc`](std::sync::Arc).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};

use crate::config::SimulationBoundsConfig;

/// Longest tick interval the operator may set at runtime.
pub const MAX_TICK_INTERVAL_MS: u64 = 60_000;

/// Reason why the simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// Reached the configured `max_real_time_seconds` limit.
    MaxRealTimeReached,
    /// An operator issued a stop command.
    OperatorStop,
    /// The population was empty, so there was nothing to simulate.
    EmptyPopulation,
}

/// Shared operator control state.
#[derive(Debug)]
pub struct OperatorState {
    /// Whether the simulation is currently paused.
    paused: AtomicBool,

    /// Notification used to wake the tick loop when resumed.
    resume_notify: Notify,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Current tick interval in milliseconds (runtime-adjustable).
    tick_interval_ms: AtomicU64,

    /// Wall-clock time when the simulation started.
    started_at: DateTime<Utc>,

    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,

    /// Maximum wall-clock seconds (0 = unlimited).
    max_real_time_seconds: u64,

    /// Reason the simulation ended, if it has.
    end_reason: Mutex<Option<SimulationEndReason>>,
}

impl OperatorState {
    /// Create a new operator state from the simulation bounds.
    pub fn new(bounds: &SimulationBoundsConfig) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            tick_interval_ms: AtomicU64::new(bounds.tick_interval_ms),
            started_at: Utc::now(),
            max_ticks: bounds.max_ticks,
            max_real_time_seconds: bounds.max_real_time_seconds,
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Check whether the simulation is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause the simulation. The tick loop will sleep until resumed.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume the simulation and wake the tick loop.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait until the simulation is no longer paused or a stop has been
    /// requested.
    ///
    /// Returns immediately if not paused.
    pub async fn wait_if_paused(&self) {
        while self.is_paused() && !self.is_stop_requested() {
            self.resume_notify.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean simulation stop. Also wakes a paused tick loop so it
    /// can observe the request.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Record the reason the simulation ended.
    pub async fn set_end_reason(&self, reason: SimulationEndReason) {
        let mut guard = self.end_reason.lock().await;
        *guard = Some(reason);
    }

    /// Get the reason the simulation ended, if it has.
    pub async fn end_reason(&self) -> Option<SimulationEndReason> {
        *self.end_reason.lock().await
    }

    // -----------------------------------------------------------------------
    // Tick Speed
    // -----------------------------------------------------------------------

    /// Get the current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Set the tick interval in milliseconds. Zero runs ticks back to back.
    ///
    /// Returns the previous interval on success, or `None` if the value was
    /// rejected (above [`MAX_TICK_INTERVAL_MS`]).
    pub fn set_tick_interval_ms(&self, ms: u64) -> Option<u64> {
        if ms > MAX_TICK_INTERVAL_MS {
            return None;
        }
        let prev = self.tick_interval_ms.swap(ms, Ordering::AcqRel);
        Some(prev)
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Check whether the tick limit has been reached.
    ///
    /// Returns `true` if `max_ticks > 0` and `current_tick >= max_ticks`.
    pub const fn tick_limit_reached(&self, current_tick: u64) -> bool {
        self.max_ticks > 0 && current_tick >= self.max_ticks
    }

    /// Check whether the wall-clock time limit has been reached.
    pub fn time_limit_reached(&self) -> bool {
        self.max_real_time_seconds > 0 && self.elapsed_seconds() >= self.max_real_time_seconds
    }

    /// Return the wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Return elapsed seconds since simulation start.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        // `num_seconds` can be negative if the wall clock steps back.
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Get the configured max ticks.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Get the configured max real-time seconds.
    pub const fn max_real_time_seconds(&self) -> u64 {
        self.max_real_time_seconds
    }

    /// Build a serializable status report.
    pub async fn status(&self, tick: u64, agents: u32) -> SimulationStatus {
        SimulationStatus {
            tick,
            paused: self.is_paused(),
            stop_requested: self.is_stop_requested(),
            tick_interval_ms: self.tick_interval_ms(),
            elapsed_seconds: self.elapsed_seconds(),
            max_ticks: self.max_ticks,
            max_real_time_seconds: self.max_real_time_seconds,
            agents,
            end_reason: self.end_reason().await,
            started_at: self.started_at.to_rfc3339(),
        }
    }
}

/// JSON-serializable status of the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStatus {
    /// Current tick number.
    pub tick: u64,
    /// Whether the simulation is paused.
    pub paused: bool,
    /// Whether a stop has been requested.
    pub stop_requested: bool,
    /// Current tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Elapsed wall-clock seconds since start.
    pub elapsed_seconds: u64,
    /// Configured maximum ticks (0 = unlimited).
    pub max_ticks: u64,
    /// Configured maximum real-time seconds (0 = unlimited).
    pub max_real_time_seconds: u64,
    /// Population size.
    pub agents: u32,
    /// The reason the simulation ended, if applicable.
    pub end_reason: Option<SimulationEndReason>,
    /// RFC 3339 timestamp of when the simulation started.
    pub started_at: String,
}
