// floortrack_core/src/messages.rs

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

// =========================================================================
// == Raw Inputs ==
// =========================================================================

/// One 3-axis reading from a platform sensor.
///
/// `timestamp` is monotonic seconds from an arbitrary origin. Only the
/// differences between consecutive samples are ever used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub timestamp: f64,
}

impl Sample3 {
    pub fn new(x: f32, y: f32, z: f32, timestamp: f64) -> Self {
        Self { x, y, z, timestamp }
    }

    pub fn vector(&self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// The horizontal (screen-plane) part of the reading.
    pub fn xy(&self) -> Vector2<f32> {
        Vector2::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// A self-describing container for everything the sensor collaborator pushes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sensor", rename_all = "snake_case")]
pub enum SensorEvent {
    Accelerometer(Sample3),
    Magnetometer(Sample3),
    /// Accepted for completeness; the engine does not read it.
    Gyroscope(Sample3),
}

impl SensorEvent {
    pub fn sample(&self) -> &Sample3 {
        match self {
            SensorEvent::Accelerometer(s)
            | SensorEvent::Magnetometer(s)
            | SensorEvent::Gyroscope(s) => s,
        }
    }

    pub fn timestamp(&self) -> f64 {
        self.sample().timestamp
    }
}

/// An absolute position fix from the location collaborator, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: f64,
}

impl GeoFix {
    pub fn new(latitude: f64, longitude: f64, timestamp: f64) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
        }
    }

    pub fn lat_lon(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}
