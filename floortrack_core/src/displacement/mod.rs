// floortrack_core/src/displacement/mod.rs

use dyn_clone::DynClone;
use nalgebra::Vector2;
use std::fmt::Debug;

use crate::config::{EngineConfig, StrategyKind};
use crate::motion::MotionState;
use crate::orientation::Heading;

/// Everything a strategy may look at for one accepted cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionInput {
    pub heading: Heading,
    pub smoothed_accel: Vector2<f32>,
    pub motion: MotionState,
}

// --- DISPLACEMENT STRATEGY TRAIT ---
// Turns one accepted motion cycle into a pixel offset. `d = f(motion, dt)`
pub trait DisplacementStrategy: DynClone + Debug + Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Returns the offset for this cycle, or `None` when nothing should be
    /// appended to the route.
    fn step(&mut self, input: &MotionInput, dt: f32) -> Option<Vector2<f32>>;

    /// Drops any internal state, e.g. when a new anchor is placed.
    fn reset(&mut self) {}
}

// This macro automatically generates the implementation of `Clone` for `Box<dyn DisplacementStrategy>`.
dyn_clone::clone_trait_object!(DisplacementStrategy);

/// Builds the strategy named by `config.strategy`.
pub fn strategy_from_config(config: &EngineConfig) -> Box<dyn DisplacementStrategy> {
    match config.strategy {
        StrategyKind::CardinalStep => Box::new(CardinalStep::new(config.delta_move)),
        StrategyKind::Continuous => Box::new(ContinuousIntegration::from_config(config)),
    }
}

pub mod cardinal;
pub mod continuous;

pub use cardinal::{Cardinal, CardinalStep};
pub use continuous::ContinuousIntegration;
