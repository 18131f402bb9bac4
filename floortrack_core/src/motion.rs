// floortrack_core/src/motion.rs

//! Deciding whether the carrier is moving.
//!
//! [`MotionClassifier`] owns the debounce clock and the walking/idle
//! threshold. [`ContinuousMotion`] is the alternative policy used by the
//! integrating displacement strategy, where classification and velocity
//! integration are one and the same step.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::EngineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionState {
    Idle { magnitude: f32 },
    Walking { magnitude: f32 },
}

impl MotionState {
    pub fn is_walking(&self) -> bool {
        matches!(self, MotionState::Walking { .. })
    }

    pub fn magnitude(&self) -> f32 {
        match *self {
            MotionState::Idle { magnitude } | MotionState::Walking { magnitude } => magnitude,
        }
    }
}

impl Default for MotionState {
    fn default() -> Self {
        MotionState::Idle { magnitude: 0.0 }
    }
}

// =========================================================================
// == Threshold Classifier ==
// =========================================================================

#[derive(Debug, Clone)]
pub struct MotionClassifier {
    walking_threshold: f32,
    update_interval: f32,
    /// Time gathered since the last accepted cycle.
    pending: f32,
    /// Length of the most recently accepted interval.
    last_interval: f32,
    state: MotionState,
}

impl MotionClassifier {
    pub fn new(walking_threshold: f32, update_interval_seconds: f32) -> Self {
        Self {
            walking_threshold,
            update_interval: update_interval_seconds,
            pending: 0.0,
            last_interval: 0.0,
            state: MotionState::default(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.walking_threshold, config.update_interval_seconds)
    }

    /// Classifies one smoothed sample arriving `dt` seconds after the previous.
    ///
    /// Returns `None` while less than the update interval has passed since the
    /// last accepted cycle; such samples are dropped, never queued.
    pub fn classify(&mut self, smoothed_accel_xy: Vector2<f32>, dt: f32) -> Option<MotionState> {
        if dt.is_finite() && dt > 0.0 {
            self.pending += dt;
        }
        if self.pending < self.update_interval {
            trace!(pending = self.pending, "cycle debounced");
            return None;
        }
        self.last_interval = self.pending;
        self.pending = 0.0;

        let magnitude = smoothed_accel_xy.norm();
        self.state = if magnitude > self.walking_threshold {
            MotionState::Walking { magnitude }
        } else {
            MotionState::Idle { magnitude }
        };
        Some(self.state)
    }

    /// Seconds covered by the last accepted cycle.
    pub fn last_interval(&self) -> f32 {
        self.last_interval
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn reset(&mut self) {
        self.pending = 0.0;
        self.last_interval = 0.0;
        self.state = MotionState::default();
    }
}

// =========================================================================
// == Continuous Policy ==
// =========================================================================

/// Velocity with a dead zone, friction and a hard stop near zero.
#[derive(Debug, Clone)]
pub struct ContinuousMotion {
    dead_zone: f32,
    friction: f32,
    stop_threshold: f32,
    velocity: Vector2<f32>,
}

impl ContinuousMotion {
    pub fn new(dead_zone: f32, friction: f32, stop_threshold: f32) -> Self {
        Self {
            dead_zone,
            friction,
            stop_threshold,
            velocity: Vector2::zeros(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.dead_zone, config.friction, config.stop_threshold)
    }

    /// Advances the velocity by one accepted cycle and returns it.
    pub fn integrate(&mut self, accel_xy: Vector2<f32>, dt: f32) -> Vector2<f32> {
        let magnitude = accel_xy.norm();
        if magnitude.is_finite() && magnitude >= self.dead_zone {
            self.velocity += accel_xy * dt;
        }
        // Friction applies whether or not we integrated.
        self.velocity *= self.friction;

        for v in self.velocity.iter_mut() {
            if v.abs() < self.stop_threshold || !v.is_finite() {
                *v = 0.0;
            }
        }
        self.velocity
    }

    /// The walking/idle view of the current velocity.
    pub fn state(&self) -> MotionState {
        let magnitude = self.velocity.norm();
        if magnitude > 0.0 {
            MotionState::Walking { magnitude }
        } else {
            MotionState::Idle { magnitude }
        }
    }

    pub fn velocity(&self) -> Vector2<f32> {
        self.velocity
    }

    pub fn reset(&mut self) {
        self.velocity = Vector2::zeros();
    }
}
