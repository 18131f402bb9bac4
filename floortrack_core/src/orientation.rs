// floortrack_core/src/orientation.rs

//! Accelerometer + magnetometer fusion into a heading.
//!
//! The filter does two things per cycle:
//! 1. low-pass the horizontal acceleration (consumed by the motion classifier),
//! 2. derive an azimuth from gravity and the geomagnetic field, but only while
//!    the device is held flat. At any other pose the azimuth is meaningless for
//!    a floor plan and the cycle is reported as non-horizontal.

use nalgebra::{Vector2, Vector3};
use num_traits::Float;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::EngineConfig;
use crate::messages::Sample3;

/// Below this norm of `magnet × gravity` the two vectors are (anti)parallel
/// or one of them is missing, and no rotation can be recovered.
const MIN_CROSS_NORM: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Rotation about the vertical axis, in `(-180, 180]`.
    pub azimuth_degrees: f32,
    pub is_horizontal: bool,
}

/// One step of an exponential moving average: `alpha * prev + (1 - alpha) * raw`.
pub fn low_pass<T: Float>(previous: T, raw: T, alpha: T) -> T {
    alpha * previous + (T::one() - alpha) * raw
}

/// Folds any finite angle in degrees into `(-180, 180]`.
pub fn normalize_degrees(angle: f32) -> f32 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}

/// Azimuth of the device y axis from gravity (`accel`) and the field (`magnet`).
///
/// Builds the east and north axes of the rotation matrix the usual way
/// (`east = magnet × gravity`, `north = gravity × east`) and reads the yaw off
/// their y components. Returns `None` for degenerate input.
pub fn azimuth_from(accel: &Vector3<f32>, magnet: &Vector3<f32>) -> Option<f32> {
    let east = magnet.cross(accel);
    let east_norm = east.norm();
    if !east_norm.is_finite() || east_norm < MIN_CROSS_NORM {
        return None;
    }
    let gravity = accel.try_normalize(f32::EPSILON)?;
    let east = east / east_norm;
    let north = gravity.cross(&east);

    let azimuth = east.y.atan2(north.y).to_degrees();
    azimuth.is_finite().then(|| normalize_degrees(azimuth))
}

#[derive(Debug, Clone)]
pub struct OrientationFilter {
    alpha: f32,
    horizontal_threshold: f32,
    smoothed: Vector2<f32>,
    last_azimuth: f32,
}

impl OrientationFilter {
    pub fn new(alpha: f32, horizontal_threshold: f32) -> Self {
        Self {
            alpha,
            horizontal_threshold,
            smoothed: Vector2::zeros(),
            last_azimuth: 0.0,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.alpha, config.horizontal_threshold)
    }

    /// Flat means gravity dominates the raw vertical axis.
    pub fn is_flat(&self, raw_z: f32) -> bool {
        raw_z.abs() > self.horizontal_threshold
    }

    /// Fuses one accelerometer/magnetometer pair.
    pub fn update(&mut self, accel: &Sample3, magnet: &Sample3) -> Heading {
        // 1. Smooth x and y; z is left raw for the horizontality test.
        if accel.is_finite() {
            self.smoothed.x = low_pass(self.smoothed.x, accel.x, self.alpha);
            self.smoothed.y = low_pass(self.smoothed.y, accel.y, self.alpha);
        }

        // 2. Gate on pose.
        if !self.is_flat(accel.z) {
            trace!(z = accel.z, "device not horizontal, heading suppressed");
            return Heading {
                azimuth_degrees: self.last_azimuth,
                is_horizontal: false,
            };
        }

        // 3. Heading; hold the previous one on degenerate input.
        match azimuth_from(&accel.vector(), &magnet.vector()) {
            Some(azimuth) => self.last_azimuth = azimuth,
            None => trace!("degenerate magnetic input, holding previous heading"),
        }

        Heading {
            azimuth_degrees: self.last_azimuth,
            is_horizontal: true,
        }
    }

    pub fn smoothed_accel(&self) -> Vector2<f32> {
        self.smoothed
    }

    pub fn last_azimuth(&self) -> f32 {
        self.last_azimuth
    }

    pub fn reset(&mut self) {
        self.smoothed = Vector2::zeros();
        self.last_azimuth = 0.0;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const FIELD: f32 = 22.0;
    const DIP: f32 = -40.0;

    /// Magnetometer reading of a flat device whose y axis points `azimuth`
    /// degrees clockwise from magnetic north.
    pub(crate) fn magnet_for(azimuth: f32, t: f64) -> Sample3 {
        let theta = azimuth.to_radians();
        Sample3::new(-theta.sin() * FIELD, theta.cos() * FIELD, DIP, t)
    }

    pub(crate) fn flat_accel(x: f32, y: f32, t: f64) -> Sample3 {
        Sample3::new(x, y, 9.9, t)
    }

    #[test]
    fn low_pass_weights_previous_value() {
        assert_abs_diff_eq!(low_pass(1.0_f32, 0.0, 0.8), 0.8, epsilon = 1e-6);
        assert_abs_diff_eq!(low_pass(0.0_f64, 10.0, 0.9), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn normalize_folds_into_half_open_range() {
        assert_eq!(normalize_degrees(-180.0), 180.0);
        assert_eq!(normalize_degrees(180.0), 180.0);
        assert_abs_diff_eq!(normalize_degrees(270.0), -90.0, epsilon = 1e-4);
        assert_abs_diff_eq!(normalize_degrees(-190.0), 170.0, epsilon = 1e-4);
    }

    #[test]
    fn azimuth_tracks_device_yaw() {
        for expected in [0.0_f32, 10.0, 45.0, 90.0, 135.0, -30.0, -90.0, -170.0] {
            let magnet = magnet_for(expected, 0.0);
            let azimuth = azimuth_from(&Vector3::new(0.0, 0.0, 9.9), &magnet.vector()).unwrap();
            assert_abs_diff_eq!(azimuth, expected, epsilon = 1e-3);
        }
    }

    #[test]
    fn zero_field_is_degenerate() {
        assert_eq!(
            azimuth_from(&Vector3::new(0.0, 0.0, 9.9), &Vector3::zeros()),
            None
        );
    }

    #[test]
    fn non_flat_pose_is_not_horizontal() {
        let mut filter = OrientationFilter::new(0.8, 9.84);
        for z in [-9.84_f32, -5.0, 0.0, 3.3, 9.0, 9.84] {
            let heading = filter.update(&Sample3::new(0.0, 0.0, z, 0.0), &magnet_for(0.0, 0.0));
            assert!(!heading.is_horizontal, "z = {z} must not count as flat");
        }
        for z in [-9.9_f32, 9.85, 12.0] {
            let heading = filter.update(&Sample3::new(0.0, 0.0, z, 0.0), &magnet_for(0.0, 0.0));
            assert!(heading.is_horizontal, "z = {z} must count as flat");
        }
    }

    #[test]
    fn degenerate_input_holds_previous_heading() {
        let mut filter = OrientationFilter::new(0.8, 9.84);
        let first = filter.update(&flat_accel(0.0, 0.0, 0.0), &magnet_for(90.0, 0.0));
        assert_abs_diff_eq!(first.azimuth_degrees, 90.0, epsilon = 1e-3);

        let zero_field = Sample3::new(0.0, 0.0, 0.0, 0.1);
        let held = filter.update(&flat_accel(0.0, 0.0, 0.1), &zero_field);
        assert!(held.is_horizontal);
        assert_abs_diff_eq!(held.azimuth_degrees, 90.0, epsilon = 1e-3);

        let nan_field = Sample3::new(f32::NAN, 1.0, 1.0, 0.2);
        let held = filter.update(&flat_accel(0.0, 0.0, 0.2), &nan_field);
        assert!(held.azimuth_degrees.is_finite());
    }

    #[test]
    fn smoothing_converges_on_constant_input() {
        let mut filter = OrientationFilter::new(0.8, 9.84);
        for i in 0..200 {
            filter.update(&flat_accel(1.0, -2.0, i as f64), &magnet_for(0.0, i as f64));
        }
        assert_abs_diff_eq!(filter.smoothed_accel().x, 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(filter.smoothed_accel().y, -2.0, epsilon = 1e-4);
    }
}
