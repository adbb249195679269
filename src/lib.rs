//! Tilt Arcade - sensor-driven minigames for a wrist wearable
//!
//! Core modules:
//! - `sim`: Game state machines (dodger, pong), collision, sensor input mapping
//! - `clock`: Fixed-rate simulation thread
//! - `session`: Per-screen simulation session owned by the clock thread
//! - `presentation`: Mirrors simulation snapshots onto the display layer
//! - `screen`: Screen lifecycle (sleep inhibit, input subscription, clock)
//! - `platform`: Interfaces to the device services plus headless implementations
//! - `audio`: Chirp cues

pub mod audio;
pub mod clock;
pub mod error;
pub mod platform;
pub mod presentation;
pub mod screen;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::{AudioError, ConfigError, LifecycleError, SensorError};
pub use screen::GameScreen;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Simulation period in milliseconds (~60 Hz)
    pub const TICK_PERIOD_MS: u64 = 16;
    /// How long `on_stop` waits for the simulation thread before giving up
    pub const SHUTDOWN_TIMEOUT_MS: u64 = 500;

    /// Display dimensions (pixels)
    pub const SCREEN_WIDTH: f32 = 128.0;
    pub const SCREEN_HEIGHT: f32 = 128.0;

    /// Physical tilt window mapped onto the [0, 1] control axis (g)
    pub const SENSOR_RANGE_G: f32 = 0.3;
    /// EMA strength for the raw accelerometer signal
    pub const FILTER_STRENGTH: f32 = 0.15;

    /// Capacity of the per-screen input queue
    pub const EVENT_QUEUE_CAPACITY: usize = 4;
}

/// Move `current` a fraction `rate` of the way toward `target`, clamped to [0, 1]
#[inline]
pub fn approach(current: f32, target: f32, rate: f32) -> f32 {
    (current + (target - current) * rate).clamp(0.0, 1.0)
}

/// Convert a normalized [0, 1] position into a pixel offset along a track of `extent`
#[inline]
pub fn to_pixels(normalized: f32, extent: f32, actor_size: f32) -> f32 {
    normalized * (extent - actor_size)
}
