// floortrack_sim/src/prelude.rs

// Re-export the entire floortrack_core prelude so drivers can reach the
// engine types through one import.
pub use floortrack_core::prelude::*;

// Simulation-specific types.
pub use crate::config::{load_scenario, ScenarioConfig, WalkLeg};
pub use crate::events::{read_event_log, write_event_log, RecordedEvent};
pub use crate::runner::{persist, run_events, RunReport};
pub use crate::synth::WalkSynthesizer;
