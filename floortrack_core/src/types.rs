// floortrack_core/src/types.rs

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Core Identifier ---
/// Opaque key of a reference image (floor plan). Routes are stored under it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(pub String);

impl MapId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MapId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// The user-designated start of a tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Tap location in image pixels.
    pub pixel: Point2<f32>,
    /// `(latitude, longitude)` at the moment of the tap, GPS mode only.
    pub geo: Option<(f64, f64)>,
}

impl Anchor {
    pub fn new(pixel: Point2<f32>) -> Self {
        Self { pixel, geo: None }
    }

    pub fn with_geo(pixel: Point2<f32>, latitude: f64, longitude: f64) -> Self {
        Self {
            pixel,
            geo: Some((latitude, longitude)),
        }
    }
}

/// Quality classes for [`crate::route::RoutePoint::tag`].
///
/// The numeric values are what gets persisted; renderers map them to the
/// green → black palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum RouteTag {
    #[default]
    Untagged = 0,
    Excellent = 1,
    Good = 2,
    Fair = 3,
    Poor = 4,
    NoSignal = 5,
}

impl RouteTag {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Unknown codes read back as `Untagged`.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => RouteTag::Excellent,
            2 => RouteTag::Good,
            3 => RouteTag::Fair,
            4 => RouteTag::Poor,
            5 => RouteTag::NoSignal,
            _ => RouteTag::Untagged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_codes_survive_a_round_trip() {
        for tag in [
            RouteTag::Untagged,
            RouteTag::Excellent,
            RouteTag::Good,
            RouteTag::Fair,
            RouteTag::Poor,
            RouteTag::NoSignal,
        ] {
            assert_eq!(RouteTag::from_code(tag.code()), tag);
        }
        assert_eq!(RouteTag::from_code(6), RouteTag::Untagged);
        assert_eq!(RouteTag::from_code(-1), RouteTag::Untagged);
    }

    #[test]
    fn map_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&MapId::from("floor-2")).unwrap();
        assert_eq!(json, "\"floor-2\"");
    }
}
