// floortrack_core/src/displacement/cardinal.rs

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{DisplacementStrategy, MotionInput};
use crate::config::StrategyKind;

/// The four 90° sectors the azimuth is bucketed into.
///
/// The names follow the deployed mapping (0° is "East"), which is not the
/// usual compass convention. Keep it until the product side confirms which
/// one the maps were drawn for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinal {
    East,
    South,
    North,
    West,
}

impl Cardinal {
    /// East `[-45, 45)`, South `[45, 135)`, North `[-135, -45)`, West the rest.
    ///
    /// Only a non-finite azimuth has no sector.
    pub fn from_azimuth(azimuth_degrees: f32) -> Option<Self> {
        let a = azimuth_degrees;
        if !a.is_finite() {
            return None;
        }
        let sector = if (-45.0..45.0).contains(&a) {
            Cardinal::East
        } else if (45.0..135.0).contains(&a) {
            Cardinal::South
        } else if (-135.0..-45.0).contains(&a) {
            Cardinal::North
        } else {
            Cardinal::West
        };
        Some(sector)
    }

    /// Unit offset in image coordinates (y grows downward).
    pub fn unit(&self) -> Vector2<f32> {
        match self {
            Cardinal::East => Vector2::new(1.0, 0.0),
            Cardinal::South => Vector2::new(0.0, 1.0),
            Cardinal::North => Vector2::new(0.0, -1.0),
            Cardinal::West => Vector2::new(-1.0, 0.0),
        }
    }
}

/// One fixed-size hop per walking cycle, whatever the acceleration magnitude.
#[derive(Debug, Clone)]
pub struct CardinalStep {
    delta_move: f32,
}

impl CardinalStep {
    pub fn new(delta_move: f32) -> Self {
        Self { delta_move }
    }
}

impl DisplacementStrategy for CardinalStep {
    fn kind(&self) -> StrategyKind {
        StrategyKind::CardinalStep
    }

    fn step(&mut self, input: &MotionInput, _dt: f32) -> Option<Vector2<f32>> {
        if !input.motion.is_walking() {
            return None;
        }
        let direction = Cardinal::from_azimuth(input.heading.azimuth_degrees)?;
        trace!(?direction, azimuth = input.heading.azimuth_degrees, "cardinal step");
        Some(direction.unit() * self.delta_move)
    }
}
