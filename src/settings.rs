//! Game settings
//!
//! Everything is optional in the JSON form; missing fields fall back to the
//! values the games shipped with.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::dodger::DodgerTuning;
use crate::sim::pong::PongTuning;

/// Accelerometer input shaping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSettings {
    /// EMA weight of each new reading, in (0, 1]
    pub filter_strength: f32,
    /// Tilt (g) that maps to either end of the control axis
    pub range_g: f32,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            filter_strength: FILTER_STRENGTH,
            range_g: SENSOR_RANGE_G,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Simulation period
    pub tick_period_ms: u64,
    /// Upper bound on waiting for the simulation thread to exit
    pub shutdown_timeout_ms: u64,
    pub event_queue_capacity: usize,
    pub sound_enabled: bool,
    /// Fixed RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
    pub sensor: SensorSettings,
    pub dodger: DodgerTuning,
    pub pong: PongTuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_period_ms: TICK_PERIOD_MS,
            shutdown_timeout_ms: SHUTDOWN_TIMEOUT_MS,
            event_queue_capacity: EVENT_QUEUE_CAPACITY,
            sound_enabled: true,
            seed: None,
            sensor: SensorSettings::default(),
            dodger: DodgerTuning::default(),
            pong: PongTuning::default(),
        }
    }
}

impl Settings {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.tick_period_ms == 0 {
            return Err(invalid("tick_period_ms", "must be at least 1"));
        }
        if self.shutdown_timeout_ms < self.tick_period_ms {
            return Err(invalid("shutdown_timeout_ms", "must cover at least one tick"));
        }
        if self.event_queue_capacity == 0 {
            return Err(invalid("event_queue_capacity", "must be at least 1"));
        }
        let s = &self.sensor;
        if !(s.filter_strength > 0.0 && s.filter_strength <= 1.0) {
            return Err(invalid("sensor.filter_strength", "must be in (0, 1]"));
        }
        if !(s.range_g > 0.0 && s.range_g.is_finite()) {
            return Err(invalid("sensor.range_g", "must be positive"));
        }

        let d = &self.dodger;
        if !(d.initial_speed > 0.0 && d.initial_speed.is_finite()) {
            return Err(invalid("dodger.initial_speed", "must be positive"));
        }
        if !(d.max_speed >= d.initial_speed && d.max_speed.is_finite()) {
            return Err(invalid("dodger.max_speed", "must not be below initial_speed"));
        }
        if d.speed_increment < 0.0 {
            return Err(invalid("dodger.speed_increment", "must not be negative"));
        }
        if !(d.plane_blend > 0.0 && d.plane_blend <= 1.0) {
            return Err(invalid("dodger.plane_blend", "must be in (0, 1]"));
        }
        if d.plane_size <= 0.0 || d.plane_size >= SCREEN_WIDTH {
            return Err(invalid("dodger.plane_size", "must fit on screen"));
        }
        if d.bird_size <= 0.0 || d.bird_size >= SCREEN_WIDTH {
            return Err(invalid("dodger.bird_size", "must fit on screen"));
        }

        let p = &self.pong;
        if !(p.ball_size > 0.0 && p.ball_size < SCREEN_WIDTH.min(SCREEN_HEIGHT)) {
            return Err(invalid("pong.ball_size", "must fit on screen"));
        }
        if !(p.paddle_width > 0.0 && p.paddle_width < SCREEN_WIDTH) {
            return Err(invalid("pong.paddle_width", "must fit on screen"));
        }
        if !(p.ball_speed > 0.0 && p.ball_speed.is_finite()) {
            return Err(invalid("pong.ball_speed", "must be positive"));
        }
        if !(p.paddle_blend > 0.0 && p.paddle_blend <= 1.0) {
            return Err(invalid("pong.paddle_blend", "must be in (0, 1]"));
        }
        if p.paddle_height <= 0.0 || p.paddle_height >= SCREEN_HEIGHT {
            return Err(invalid("pong.paddle_height", "must fit on screen"));
        }
        if p.max_serve_angle_deg >= 90 {
            return Err(invalid("pong.max_serve_angle_deg", "must be below 90"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.tick_period(), Duration::from_millis(16));
        assert_eq!(settings.dodger.max_speed, 3.0);
        assert_eq!(settings.pong.paddle_height, 24.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "seed": 7, "dodger": { "max_speed": 2.0 } }"#).unwrap();
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.dodger.max_speed, 2.0);
        assert_eq!(settings.dodger.initial_speed, 1.0);
        assert_eq!(settings.pong, PongTuning::default());
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = Settings::default();
        settings.sound_enabled = false;
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Settings::from_json(r#"{ "tick_period_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "tick_period_ms", .. }));

        let err = Settings::from_json(r#"{ "dodger": { "initial_speed": 5.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "dodger.max_speed", .. }));

        let err = Settings::from_json(r#"{ "dodger": { "initial_speed": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "dodger.initial_speed", .. }));

        let mut settings = Settings::default();
        settings.dodger.initial_speed = f32::NAN;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Invalid { field: "dodger.initial_speed", .. })
        ));

        let err = Settings::from_json(r#"{ "pong": { "ball_size": 200.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "pong.ball_size", .. }));

        let err = Settings::from_json(r#"{ "pong": { "ball_size": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "pong.ball_size", .. }));

        let err = Settings::from_json(r#"{ "pong": { "paddle_width": 128.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "pong.paddle_width", .. }));

        let err = Settings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
