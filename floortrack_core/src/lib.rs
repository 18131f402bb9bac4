// floortrack_core/src/lib.rs

//! Dead-reckoning positioning on a floor-plan image.
//!
//! Raw accelerometer/magnetometer samples (or GPS fixes) go into a
//! [`session::PositioningSession`]; an append-only route of pixel positions
//! comes out. See the module docs of [`session`] for the state machine.

pub mod config;
pub mod displacement;
pub mod error;
pub mod geo;
pub mod messages;
pub mod motion;
pub mod orientation;
pub mod prelude;
pub mod route;
pub mod session;
pub mod store;
pub mod types;
