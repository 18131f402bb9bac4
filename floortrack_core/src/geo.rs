// floortrack_core/src/geo.rs

use nalgebra::Point2;

use crate::config::EngineConfig;
use crate::types::Anchor;

/// Projects GPS fixes onto the image around the anchor.
///
/// A flat-earth linear map: one degree is `scale` pixels on both axes. Good
/// enough over a building, wrong over a city. Latitude grows north while
/// image y grows down, hence the sign flip on y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoToPixelMapper {
    scale: f64,
}

impl GeoToPixelMapper {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.geo_scale)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Absolute pixel position of `current` (`(latitude, longitude)`).
    ///
    /// `None` when there is no anchor, the anchor carries no geo reference,
    /// or the fix is not a finite coordinate.
    pub fn map_delta(&self, anchor: Option<&Anchor>, current: (f64, f64)) -> Option<Point2<f32>> {
        let anchor = anchor?;
        let (anchor_lat, anchor_lon) = anchor.geo?;
        let (lat, lon) = current;
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }

        let x = anchor.pixel.x as f64 + (lon - anchor_lon) * self.scale;
        let y = anchor.pixel.y as f64 - (lat - anchor_lat) * self.scale;
        Some(Point2::new(x as f32, y as f32))
    }
}
