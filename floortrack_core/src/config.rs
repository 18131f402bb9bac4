// floortrack_core/src/config.rs

//! Every tunable of the engine lives in [`EngineConfig`].
//!
//! The defaults are the values the handheld deployment shipped with. The
//! sim crate layers scenario files and environment overrides on top of
//! them, so every field must stay `serde(default)`-able.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which displacement model turns motion into route points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// A fixed hop in one of four compass sectors per walking cycle.
    #[default]
    CardinalStep,
    /// Velocity integration with friction and a stop threshold.
    Continuous,
}

/// Where displacements come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PositioningMode {
    /// Accelerometer + magnetometer dead reckoning.
    #[default]
    Inertial,
    /// Absolute GPS fixes projected around the anchor.
    Gps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub mode: PositioningMode,
    pub strategy: StrategyKind,

    // --- Orientation ---
    /// Weight of the previous value in the exponential low-pass filter.
    pub alpha: f32,
    /// |raw z| must exceed this (m/s^2) for the device to count as flat.
    pub horizontal_threshold: f32,

    // --- Motion ---
    /// Smoothed horizontal acceleration magnitude that means "walking".
    pub walking_threshold: f32,
    /// Minimum accumulated time between two accepted cycles.
    pub update_interval_seconds: f32,
    pub dead_zone: f32,
    pub friction: f32,
    pub stop_threshold: f32,

    // --- Displacement ---
    /// Pixels per cardinal step.
    pub delta_move: f32,
    /// Continuous displacements smaller than this on both axes are dropped.
    pub movement_threshold: f32,

    // --- GPS ---
    /// Pixels per degree of latitude/longitude.
    pub geo_scale: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: PositioningMode::Inertial,
            strategy: StrategyKind::CardinalStep,
            alpha: 0.8,
            horizontal_threshold: 9.84,
            walking_threshold: 0.8,
            update_interval_seconds: 0.02,
            dead_zone: 0.1,
            friction: 0.9,
            stop_threshold: 0.09,
            delta_move: 1.5,
            movement_threshold: 0.1,
            geo_scale: 1e6,
        }
    }
}

impl EngineConfig {
    /// Rejects values that would make the filters diverge or never fire.
    pub fn validate(&self) -> Result<(), ConfigError> {
        in_range("alpha", self.alpha as f64, 0.0, 1.0)?;
        in_range("friction", self.friction as f64, 0.0, 1.0)?;
        positive("horizontal_threshold", self.horizontal_threshold as f64)?;
        positive("walking_threshold", self.walking_threshold as f64)?;
        positive("delta_move", self.delta_move as f64)?;
        positive("geo_scale", self.geo_scale)?;
        in_range(
            "update_interval_seconds",
            self.update_interval_seconds as f64,
            0.0,
            60.0,
        )?;
        in_range("dead_zone", self.dead_zone as f64, 0.0, f64::MAX)?;
        in_range("stop_threshold", self.stop_threshold as f64, 0.0, f64::MAX)?;
        in_range(
            "movement_threshold",
            self.movement_threshold as f64,
            0.0,
            f64::MAX,
        )?;
        Ok(())
    }
}

fn in_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}
