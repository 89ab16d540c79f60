//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and simulation execution.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: agora_core::config::ConfigError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: agora_core::runner::RunnerError,
    },

    /// Status serialization failed.
    #[error("status serialization failed: {source}")]
    Status {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
