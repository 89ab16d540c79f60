//! Simulation clock.
//!
//! The clock is the single source of truth for temporal state. It counts
//! completed ticks and converts them to simulated years. The tick number is
//! advanced with checked arithmetic so a runaway simulation fails loudly
//! instead of wrapping.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Tick counter for one simulation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    /// Current tick number (0 before the first tick has run).
    tick: u64,

    /// Ticks per simulated year; non-positive disables the year mapping.
    steps_per_year: f64,
}

impl SimulationClock {
    /// Create a clock at tick 0.
    pub const fn new(steps_per_year: f64) -> Self {
        Self {
            tick: 0,
            steps_per_year,
        }
    }

    /// Create a clock at an explicit tick (useful for testing and
    /// state restoration).
    pub const fn from_parts(tick: u64, steps_per_year: f64) -> Self {
        Self {
            tick,
            steps_per_year,
        }
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated years elapsed since tick 0.
    #[allow(clippy::cast_precision_loss)]
    pub const fn elapsed_years(&self) -> f64 {
        if self.steps_per_year > 0.0 {
            self.tick as f64 / self.steps_per_year
        } else {
            0.0
        }
    }
}
