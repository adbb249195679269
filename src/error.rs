//! Error types
//!
//! Collisions and out-of-bounds balls are game events, not errors. What is left
//! is device faults, configuration problems and thread lifecycle failures.

use thiserror::Error;

/// IMU read failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SensorError {
    #[error("sensor not ready")]
    NotReady,
    #[error("sensor bus error: {0}")]
    Bus(String),
    #[error("sensor returned a non-finite reading")]
    NonFinite,
}

/// Tone playback failure. Always non-fatal: the cue is dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AudioError {
    #[error("audio backend busy")]
    Busy,
    #[error("audio backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("screen `{0}` is already started")]
    AlreadyStarted(&'static str),
    #[error("failed to spawn simulation thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("simulation thread did not stop within {timeout_ms} ms")]
    ShutdownTimeout { timeout_ms: u64 },
    #[error("simulation thread panicked")]
    WorkerPanicked,
    #[error("simulation clock is not running")]
    NotRunning,
}
