// floortrack_sim/src/synth.rs

//! Turns a scripted walk into the sensor and GPS streams a handset would
//! have produced along it.

use anyhow::{Context, Result};
use nalgebra::{Vector2, Vector3};
use rand::rngs::OsRng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tracing::{debug, info};

use floortrack_core::prelude::{GeoFix, PositioningMode, Sample3, SensorEvent};

use crate::config::{ScenarioConfig, WalkLeg};
use crate::events::RecordedEvent;

/// Metres per degree of latitude.
const METRES_PER_DEGREE: f64 = 111_320.0;

/// Independent zero-mean noise on each axis.
#[derive(Debug, Clone)]
struct AxisNoise {
    x: Normal<f32>,
    y: Normal<f32>,
    z: Normal<f32>,
}

impl AxisNoise {
    fn new(stddev: [f32; 3], what: &str) -> Result<Self> {
        let axis = |s: f32| {
            Normal::new(0.0, s).with_context(|| format!("invalid {what} noise stddev {s}"))
        };
        Ok(Self {
            x: axis(stddev[0])?,
            y: axis(stddev[1])?,
            z: axis(stddev[2])?,
        })
    }

    fn sample(&self, rng: &mut ChaCha8Rng) -> Vector3<f32> {
        Vector3::new(
            self.x.sample(rng),
            self.y.sample(rng),
            self.z.sample(rng),
        )
    }
}

/// Deterministic for a given scenario seed.
pub struct WalkSynthesizer {
    rng: ChaCha8Rng,
    accel_noise: AxisNoise,
    mag_noise: AxisNoise,
    gps_noise: Normal<f64>,
}

impl WalkSynthesizer {
    pub fn new(scenario: &ScenarioConfig) -> Result<Self> {
        let rng = match scenario.simulation.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(OsRng).context("OS RNG failed")?,
        };
        let sensors = &scenario.sensors;
        Ok(Self {
            rng,
            accel_noise: AxisNoise::new(sensors.accel_noise_stddev, "accelerometer")?,
            mag_noise: AxisNoise::new(sensors.mag_noise_stddev, "magnetometer")?,
            gps_noise: Normal::new(0.0, sensors.gps_noise_stddev_m)
                .context("invalid GPS noise stddev")?,
        })
    }

    /// The full event stream: the anchor tap, the route tag, then the walk.
    pub fn generate(&mut self, scenario: &ScenarioConfig) -> Vec<RecordedEvent> {
        let [x, y] = scenario.map.anchor;
        let mut events = vec![
            RecordedEvent::Tap {
                x,
                y,
                geo: scenario.map.anchor_geo(),
            },
            RecordedEvent::Tag {
                code: scenario.map.route_tag,
            },
        ];

        match scenario.engine.mode {
            PositioningMode::Inertial => self.inertial_stream(scenario, &mut events),
            PositioningMode::Gps => self.gps_stream(scenario, &mut events),
        }

        info!(
            scenario = %scenario.simulation.name,
            events = events.len(),
            "synthetic stream generated"
        );
        events
    }

    fn inertial_stream(&mut self, scenario: &ScenarioConfig, events: &mut Vec<RecordedEvent>) {
        let period = 1.0 / scenario.simulation.sample_rate_hz as f64;
        let sensors = &scenario.sensors;
        let mut t = 0.0;

        for leg in &scenario.legs {
            let ticks = (leg.duration_seconds as f64 / period).round() as usize;
            debug!(heading = leg.heading_degrees, ticks, "synthesising leg");
            for tick in 0..ticks {
                let true_accel = device_accel(leg, sensors.gravity, tick);
                let magnet = device_field(
                    leg.heading_degrees,
                    sensors.field_horizontal,
                    sensors.field_vertical,
                    &true_accel,
                ) + self.mag_noise.sample(&mut self.rng);
                let accel = true_accel + self.accel_noise.sample(&mut self.rng);

                // Magnetometer first, accelerometer half a period later.
                events.push(RecordedEvent::Sensor(SensorEvent::Magnetometer(
                    Sample3::new(magnet.x, magnet.y, magnet.z, t),
                )));
                events.push(RecordedEvent::Sensor(SensorEvent::Accelerometer(
                    Sample3::new(accel.x, accel.y, accel.z, t + period / 2.0),
                )));
                t += period;
            }
        }
    }

    fn gps_stream(&mut self, scenario: &ScenarioConfig, events: &mut Vec<RecordedEvent>) {
        let period = 1.0 / scenario.simulation.gps_rate_hz as f64;
        let (lat0, lon0) = scenario.map.anchor_geo().unwrap_or((0.0, 0.0));
        // East/north offset from the anchor, in metres.
        let mut position = Vector2::<f64>::zeros();
        let mut t = 0.0;

        for leg in &scenario.legs {
            let ticks = (leg.duration_seconds as f64 / period).round() as usize;
            let heading = (leg.heading_degrees as f64).to_radians();
            let velocity = Vector2::new(heading.sin(), heading.cos()) * leg.speed_mps;
            for _ in 0..ticks {
                t += period;
                position += velocity * period;
                let noisy = position
                    + Vector2::new(
                        self.gps_noise.sample(&mut self.rng),
                        self.gps_noise.sample(&mut self.rng),
                    );
                let (lat, lon) = offset_to_lat_lon(lat0, lon0, noisy);
                events.push(RecordedEvent::Fix(GeoFix::new(lat, lon, t)));
            }
        }
    }
}

/// Accelerometer reading in the device frame (x right, y towards the top
/// edge, z out of the screen) for a handset carried top-first along `leg`.
fn device_accel(leg: &WalkLeg, gravity: f32, tick: usize) -> Vector3<f32> {
    let tilt = leg.tilt_degrees.to_radians();
    // Gait bounce around the stride level so the magnitude is never constant.
    let bounce = if tick % 2 == 0 { 1.1 } else { 0.9 };
    let forward = if leg.is_walking() {
        leg.stride_accel * bounce
    } else {
        0.0
    };
    Vector3::new(0.0, forward + gravity * tilt.sin(), gravity * tilt.cos())
}

/// Magnetometer reading of a handset whose top edge points at
/// `heading_degrees` from magnetic north, pitched so that `apparent_up`
/// (what the accelerometer reads) is the vertical.
fn device_field(
    heading_degrees: f32,
    horizontal: f32,
    vertical: f32,
    apparent_up: &Vector3<f32>,
) -> Vector3<f32> {
    let theta = heading_degrees.to_radians();
    let flat = Vector3::new(-theta.sin() * horizontal, theta.cos() * horizontal, vertical);
    let pitch = apparent_up.y.atan2(apparent_up.z);
    let (sin, cos) = pitch.sin_cos();
    Vector3::new(
        flat.x,
        flat.y * cos + flat.z * sin,
        -flat.y * sin + flat.z * cos,
    )
}

fn offset_to_lat_lon(lat0: f64, lon0: f64, east_north: Vector2<f64>) -> (f64, f64) {
    let lat = lat0 + east_north.y / METRES_PER_DEGREE;
    let lon = lon0 + east_north.x / (METRES_PER_DEGREE * lat0.to_radians().cos());
    (lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Simulation;
    use approx::assert_abs_diff_eq;
    use floortrack_core::orientation::azimuth_from;

    fn events_of(scenario: &ScenarioConfig) -> Vec<RecordedEvent> {
        WalkSynthesizer::new(scenario).unwrap().generate(scenario)
    }

    #[test]
    fn same_seed_same_stream() {
        let scenario = ScenarioConfig::demo();
        assert_eq!(events_of(&scenario), events_of(&scenario));

        let mut reseeded = scenario.clone();
        reseeded.simulation.seed = Some(7);
        assert_ne!(events_of(&scenario), events_of(&reseeded));
    }

    #[test]
    fn stream_starts_with_tap_and_tag() {
        let events = events_of(&ScenarioConfig::demo());
        assert!(matches!(events[0], RecordedEvent::Tap { x, y, .. } if x == 400.0 && y == 300.0));
        assert_eq!(events[1], RecordedEvent::Tag { code: 0 });
        // 4 legs x 5 s x 50 Hz, two samples per tick.
        assert_eq!(events.len(), 2 + 4 * 250 * 2);
    }

    #[test]
    fn synthetic_field_yields_the_leg_heading() {
        for heading in [-135.0_f32, -90.0, 0.0, 30.0, 90.0, 179.0] {
            let leg = WalkLeg {
                heading_degrees: heading,
                ..Default::default()
            };
            let accel = device_accel(&leg, 9.9, 0);
            let field = device_field(heading, 22.0, -40.0, &accel);
            let azimuth = azimuth_from(&accel, &field).unwrap();
            assert_abs_diff_eq!(azimuth, heading, epsilon = 1e-3);
        }
    }

    #[test]
    fn tilted_leg_drops_vertical_reading() {
        let leg = WalkLeg {
            tilt_degrees: 60.0,
            stride_accel: 0.0,
            ..Default::default()
        };
        let accel = device_accel(&leg, 9.9, 0);
        assert_abs_diff_eq!(accel.z, 4.95, epsilon = 1e-4);
    }

    #[test]
    fn gps_stream_walks_north_then_east() {
        let mut scenario = ScenarioConfig {
            simulation: Simulation {
                seed: Some(1),
                gps_rate_hz: 1.0,
                ..Default::default()
            },
            legs: vec![
                WalkLeg {
                    heading_degrees: 0.0,
                    duration_seconds: 3.0,
                    speed_mps: 1.0,
                    ..Default::default()
                },
                WalkLeg {
                    heading_degrees: 90.0,
                    duration_seconds: 2.0,
                    speed_mps: 1.0,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        scenario.engine.mode = PositioningMode::Gps;
        scenario.map.anchor_geo = Some([0.0, 0.0]);

        let fixes: Vec<GeoFix> = events_of(&scenario)
            .into_iter()
            .filter_map(|e| match e {
                RecordedEvent::Fix(fix) => Some(fix),
                _ => None,
            })
            .collect();
        assert_eq!(fixes.len(), 5);
        let last = fixes[4];
        assert_abs_diff_eq!(last.latitude, 3.0 / METRES_PER_DEGREE, epsilon = 1e-12);
        assert_abs_diff_eq!(last.longitude, 2.0 / METRES_PER_DEGREE, epsilon = 1e-12);
        assert_abs_diff_eq!(last.timestamp, 5.0, epsilon = 1e-9);
    }
}
