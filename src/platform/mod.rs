//! Platform abstraction layer
//!
//! The games only see the device through these traits:
//! - IMU samples
//! - Tone playback
//! - Input events (see `events`)
//! - Display widgets (see `display`)
//! - Power management and screen navigation
//!
//! `headless` provides in-memory implementations for tests and the demo binary.

pub mod display;
pub mod events;
pub mod headless;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audio::Chirp;
use crate::error::{AudioError, LifecycleError, SensorError};

pub use display::{Color, Display, RectStyle, WidgetId};
pub use events::{Action, Button, Event, EventBus, EventQueue, Facility, InputEvents};

/// One accelerometer reading, in g
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImuSample {
    pub accel_x: f32,
    pub accel_y: f32,
    pub accel_z: f32,
}

/// Inertial sensor driver
pub trait Imu: Send + Sync {
    fn sample(&self) -> Result<ImuSample, SensorError>;
}

/// Tone generator. Playback is asynchronous; `play` returns once the sequence is queued.
pub trait ChirpPlayer: Send + Sync {
    fn play(&self, chirps: &[Chirp]) -> Result<(), AudioError>;
}

pub trait PowerManager: Send + Sync {
    fn set_auto_sleep_enabled(&self, enabled: bool);
}

/// Anything the navigator can switch to
pub trait Screen: Send {
    fn name(&self) -> &'static str;
    fn on_start(&mut self) -> Result<(), LifecycleError>;
    fn on_stop(&mut self) -> Result<(), LifecycleError>;
    /// One pass of the screen's UI-thread loop. Must not block.
    fn run_loop(&mut self);
}

/// Deferred screen constructor; only invoked if the transition actually runs
pub type ScreenFactory = Box<dyn FnOnce() -> Box<dyn Screen> + Send>;

/// Reusable factory for a fixed destination (e.g. the main menu)
pub type ScreenTarget = Arc<dyn Fn() -> Box<dyn Screen> + Send + Sync>;

pub trait Navigator: Send + Sync {
    /// Replace the current screen with the one `factory` builds
    fn transition(&self, factory: ScreenFactory);
}

/// Everything a game screen needs from the device
#[derive(Clone)]
pub struct Services {
    pub imu: Arc<dyn Imu>,
    pub audio: Arc<dyn ChirpPlayer>,
    pub events: Arc<dyn EventBus>,
    pub power: Arc<dyn PowerManager>,
    pub navigator: Arc<dyn Navigator>,
    pub display: Arc<dyn Display>,
}
