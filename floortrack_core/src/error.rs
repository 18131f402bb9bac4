// floortrack_core/src/error.rs

use std::path::PathBuf;
use thiserror::Error;

use crate::types::MapId;

/// Raised when an `EngineConfig` holds a value the engine cannot work with.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("`{name}` must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("`{name}` must be finite and strictly positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
}

/// Caller mistakes against the session state machine.
///
/// Missing anchors, missing fixes and bad poses are NOT errors; those cycles
/// simply produce no route point.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("no map is loaded")]
    NoMapLoaded,
    #[error("map '{0}' is open read-only, anchors cannot be placed")]
    ReadOnlyMap(MapId),
    #[error("route belongs to map '{found}' but map '{loaded}' is loaded")]
    MapMismatch { loaded: MapId, found: MapId },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("route store i/o failed at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("route file {path:?} is malformed: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("map id '{0}' cannot be used as a file name")]
    InvalidMapId(MapId),
}
