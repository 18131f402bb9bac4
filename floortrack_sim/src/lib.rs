// floortrack_sim/src/lib.rs

//! Offline driver for `floortrack_core`: scenario files, synthetic sensor
//! streams, event-log replay and route output.

pub mod cli;
pub mod config;
pub mod events;
pub mod logging;
pub mod runner;
pub mod synth;

pub mod prelude;
