// floortrack_core/src/displacement/continuous.rs

use nalgebra::Vector2;
use tracing::trace;

use super::{DisplacementStrategy, MotionInput};
use crate::config::{EngineConfig, StrategyKind};
use crate::motion::ContinuousMotion;

/// Dead reckoning by integrating the smoothed acceleration twice.
///
/// The velocity policy lives in [`ContinuousMotion`]; this strategy turns
/// the velocity into a per-cycle offset and drops offsets too small to be
/// worth a route point.
#[derive(Debug, Clone)]
pub struct ContinuousIntegration {
    motion: ContinuousMotion,
    movement_threshold: f32,
}

impl ContinuousIntegration {
    pub fn new(motion: ContinuousMotion, movement_threshold: f32) -> Self {
        Self {
            motion,
            movement_threshold,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            ContinuousMotion::from_config(config),
            config.movement_threshold,
        )
    }

    pub fn velocity(&self) -> Vector2<f32> {
        self.motion.velocity()
    }
}

impl DisplacementStrategy for ContinuousIntegration {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Continuous
    }

    /// Runs every accepted cycle; the classifier's walking flag is not used.
    fn step(&mut self, input: &MotionInput, dt: f32) -> Option<Vector2<f32>> {
        let velocity = self.motion.integrate(input.smoothed_accel, dt);
        let offset = velocity * dt;

        if offset.x.abs() < self.movement_threshold && offset.y.abs() < self.movement_threshold {
            return None;
        }
        trace!(dx = offset.x, dy = offset.y, "continuous displacement");
        Some(offset)
    }

    fn reset(&mut self) {
        self.motion.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::MotionState;
    use crate::orientation::Heading;
    use approx::assert_abs_diff_eq;

    fn input(ax: f32, ay: f32) -> MotionInput {
        MotionInput {
            heading: Heading {
                azimuth_degrees: 0.0,
                is_horizontal: true,
            },
            smoothed_accel: Vector2::new(ax, ay),
            // Deliberately idle: the continuous model must not care.
            motion: MotionState::Idle { magnitude: 0.0 },
        }
    }

    fn strategy() -> ContinuousIntegration {
        ContinuousIntegration::new(ContinuousMotion::new(0.1, 0.9, 0.09), 0.1)
    }

    #[test]
    fn strong_push_emits_offset() {
        let mut s = strategy();
        // v = (4 * 0.5) * 0.9 = 1.8, d = 1.8 * 0.5 = 0.9
        let offset = s.step(&input(4.0, 0.0), 0.5).unwrap();
        assert_abs_diff_eq!(offset.x, 0.9, epsilon = 1e-6);
        assert_eq!(offset.y, 0.0);
    }

    #[test]
    fn tiny_offsets_are_suppressed() {
        let mut s = strategy();
        // v = (1 * 0.02) * 0.9 < stop threshold, nothing moves
        assert_eq!(s.step(&input(1.0, 0.0), 0.02), None);
    }

    #[test]
    fn coasts_then_stops() {
        let mut s = strategy();
        assert!(s.step(&input(0.0, -20.0), 0.5).is_some());
        let mut emitted = 0;
        for _ in 0..100 {
            if s.step(&input(0.0, 0.0), 0.5).is_some() {
                emitted += 1;
            }
        }
        assert!(emitted > 0, "should coast for a few cycles");
        assert_eq!(s.velocity(), Vector2::zeros());
        assert_eq!(s.step(&input(0.0, 0.0), 0.5), None);
    }

    #[test]
    fn reset_clears_velocity() {
        let mut s = strategy();
        s.step(&input(10.0, 10.0), 0.5);
        s.reset();
        assert_eq!(s.velocity(), Vector2::zeros());
    }
}
