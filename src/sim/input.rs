//! Tilt input
//!
//! Turns raw accelerometer readings into a [0, 1] control axis: pick the
//! game's axis, smooth it with an EMA seeded from a live reading, map the
//! ±0.3 g window onto [0, 1] and clamp.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::game::ControlSource;
use crate::consts::{FILTER_STRENGTH, SENSOR_RANGE_G};
use crate::error::SensorError;
use crate::platform::{Imu, ImuSample};

/// Which accelerometer axis drives the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorAxis {
    /// Roll (accel X): left/right
    Lateral,
    /// Pitch (accel Y): up/down
    Vertical,
}

impl SensorAxis {
    pub fn pick(self, sample: &ImuSample) -> f32 {
        match self {
            SensorAxis::Lateral => sample.accel_x,
            SensorAxis::Vertical => sample.accel_y,
        }
    }
}

pub trait SmoothingFilter: Send {
    fn reset(&mut self, seed: f32);
    fn update(&mut self, sample: f32) -> f32;
}

/// Exponential moving average
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ema {
    strength: f32,
    value: f32,
}

impl Ema {
    /// `strength` is the weight of each new sample, in (0, 1]
    pub fn new(strength: f32) -> Self {
        Self {
            strength: strength.clamp(f32::EPSILON, 1.0),
            value: 0.0,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}

impl Default for Ema {
    fn default() -> Self {
        Self::new(FILTER_STRENGTH)
    }
}

impl SmoothingFilter for Ema {
    fn reset(&mut self, seed: f32) {
        self.value = seed;
    }

    fn update(&mut self, sample: f32) -> f32 {
        self.value += (sample - self.value) * self.strength;
        self.value
    }
}

/// Affine map from a symmetric physical window onto [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMapping {
    pub min: f32,
    pub max: f32,
}

impl AxisMapping {
    pub fn symmetric(range: f32) -> Self {
        Self {
            min: -range,
            max: range,
        }
    }

    /// Values outside the window saturate
    pub fn map(&self, value: f32) -> f32 {
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

impl Default for AxisMapping {
    fn default() -> Self {
        Self::symmetric(SENSOR_RANGE_G)
    }
}

/// Reads the IMU once per tick and yields the smoothed control axis
pub struct SensorInputAdapter<F: SmoothingFilter = Ema> {
    imu: Arc<dyn Imu>,
    axis: SensorAxis,
    filter: F,
    mapping: AxisMapping,
    last: f32,
    stale: bool,
    faults: u64,
}

impl SensorInputAdapter<Ema> {
    pub fn new(imu: Arc<dyn Imu>, axis: SensorAxis) -> Self {
        Self::with_filter(imu, axis, Ema::default(), AxisMapping::default())
    }
}

impl<F: SmoothingFilter> SensorInputAdapter<F> {
    pub fn with_filter(imu: Arc<dyn Imu>, axis: SensorAxis, filter: F, mapping: AxisMapping) -> Self {
        Self {
            imu,
            axis,
            filter,
            mapping,
            last: mapping.map(0.0),
            stale: false,
            faults: 0,
        }
    }

    pub fn axis(&self) -> SensorAxis {
        self.axis
    }

    /// Seed the filter from a live reading so the first ticks don't jump.
    ///
    /// On failure the filter is seeded with a level (0 g) reading and the
    /// error is returned for the caller to report.
    pub fn seed(&mut self) -> Result<(), SensorError> {
        match self.read() {
            Ok(value) => {
                self.filter.reset(value);
                self.last = self.mapping.map(value);
                self.stale = false;
                Ok(())
            }
            Err(e) => {
                self.filter.reset(0.0);
                self.last = self.mapping.map(0.0);
                self.stale = true;
                Err(e)
            }
        }
    }

    /// Current control value in [0, 1]. Holds the last estimate if the read fails.
    pub fn sample(&mut self) -> f32 {
        match self.read() {
            Ok(value) => {
                let smoothed = self.filter.update(value);
                self.last = self.mapping.map(smoothed);
                self.stale = false;
            }
            Err(e) => {
                self.faults += 1;
                if !self.stale {
                    log::debug!("{:?} sensor read failed, holding {:.3}: {}", self.axis, self.last, e);
                }
                self.stale = true;
            }
        }
        self.last
    }

    /// Last value returned by `sample`
    pub fn last(&self) -> f32 {
        self.last
    }

    /// True while the most recent read failed
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn fault_count(&self) -> u64 {
        self.faults
    }

    fn read(&self) -> Result<f32, SensorError> {
        let value = self.axis.pick(&self.imu.sample()?);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(SensorError::NonFinite)
        }
    }
}

impl<F: SmoothingFilter> ControlSource for SensorInputAdapter<F> {
    fn control(&mut self) -> f32 {
        self.sample()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::ScriptedImu;
    use proptest::prelude::*;

    fn adapter(imu: &Arc<ScriptedImu>, axis: SensorAxis) -> SensorInputAdapter {
        SensorInputAdapter::new(imu.clone(), axis)
    }

    #[test]
    fn test_mapping_endpoints() {
        let m = AxisMapping::default();
        assert!((m.map(-0.3) - 0.0).abs() < 1e-6);
        assert!((m.map(0.0) - 0.5).abs() < 1e-6);
        assert!((m.map(0.3) - 1.0).abs() < 1e-6);
        assert_eq!(m.map(2.0), 1.0);
        assert_eq!(m.map(-2.0), 0.0);
    }

    #[test]
    fn test_seed_avoids_cold_start_jump() {
        let imu = Arc::new(ScriptedImu::tilted(0.3, 0.0));
        let mut input = adapter(&imu, SensorAxis::Lateral);
        input.seed().unwrap();
        // Seeded at +0.3 g, so the very first sample is already at full scale
        assert!((input.sample() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_unseeded_filter_converges_gradually() {
        let imu = Arc::new(ScriptedImu::tilted(0.3, 0.0));
        let mut input = adapter(&imu, SensorAxis::Lateral);
        let first = input.sample();
        assert!(first > 0.5 && first < 0.6);
        for _ in 0..100 {
            input.sample();
        }
        assert!(input.last() > 0.99);
    }

    #[test]
    fn test_axis_selection() {
        let imu = Arc::new(ScriptedImu::tilted(-0.3, 0.3));
        let mut roll = adapter(&imu, SensorAxis::Lateral);
        let mut pitch = adapter(&imu, SensorAxis::Vertical);
        roll.seed().unwrap();
        pitch.seed().unwrap();
        assert!(roll.sample() < 1e-5);
        assert!(pitch.sample() > 1.0 - 1e-5);
    }

    #[test]
    fn test_failed_read_holds_last_value() {
        let imu = Arc::new(ScriptedImu::tilted(0.15, 0.0));
        let mut input = adapter(&imu, SensorAxis::Lateral);
        input.seed().unwrap();
        let good = input.sample();

        imu.push(Err(SensorError::Bus("nack".into())));
        imu.push(Ok(ImuSample {
            accel_x: f32::NAN,
            ..Default::default()
        }));
        assert_eq!(input.sample(), good);
        assert!(input.is_stale());
        assert_eq!(input.sample(), good);
        assert_eq!(input.fault_count(), 2);

        input.sample();
        assert!(!input.is_stale());
    }

    #[test]
    fn test_seed_failure_falls_back_to_level() {
        let imu = Arc::new(ScriptedImu::default());
        imu.push(Err(SensorError::NotReady));
        let mut input = adapter(&imu, SensorAxis::Vertical);
        assert_eq!(input.seed(), Err(SensorError::NotReady));
        assert!(input.is_stale());
        assert!((input.last() - 0.5).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_control_axis_always_in_unit_range(readings in prop::collection::vec(-4.0f32..4.0, 1..64)) {
            let imu = Arc::new(ScriptedImu::default());
            for r in &readings {
                imu.push(Ok(ImuSample { accel_x: *r, accel_y: *r, accel_z: 1.0 }));
            }
            let mut input = adapter(&imu, SensorAxis::Lateral);
            input.seed().unwrap();
            for _ in 0..readings.len() {
                let v = input.sample();
                prop_assert!((0.0..=1.0).contains(&v));
            }
        }

        #[test]
        fn prop_outside_window_saturates(excess in 0.0f32..10.0) {
            let m = AxisMapping::default();
            prop_assert_eq!(m.map(SENSOR_RANGE_G + excess), 1.0);
            prop_assert_eq!(m.map(-SENSOR_RANGE_G - excess), 0.0);
        }
    }
}
