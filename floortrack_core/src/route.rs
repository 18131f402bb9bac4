// floortrack_core/src/route.rs

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::types::{MapId, RouteTag};

/// One estimated position on the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub x: f32,
    pub y: f32,
    /// Quality/colour class, see [`RouteTag`]. `0` means untagged.
    pub tag: i32,
}

impl RoutePoint {
    pub fn new(x: f32, y: f32, tag: RouteTag) -> Self {
        Self {
            x,
            y,
            tag: tag.code(),
        }
    }

    pub fn position(&self) -> Point2<f32> {
        Point2::new(self.x, self.y)
    }

    pub fn route_tag(&self) -> RouteTag {
        RouteTag::from_code(self.tag)
    }
}

/// The ordered, append-only history of positions for one session.
///
/// Points can only be appended or dropped all at once; there is no way to
/// edit or remove a single point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteTrack {
    points: Vec<RoutePoint>,
}

impl RouteTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole track with a single starting point.
    pub fn seed(&mut self, start: RoutePoint) {
        self.points.clear();
        self.points.push(start);
    }

    pub fn push(&mut self, point: RoutePoint) {
        self.points.push(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&RoutePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&RoutePoint> {
        self.points.last()
    }

    /// Read-only view of the live track.
    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    /// Total path length in pixels.
    pub fn length(&self) -> f32 {
        self.points
            .windows(2)
            .map(|w| nalgebra::distance(&w[0].position(), &w[1].position()))
            .sum()
    }
}

impl FromIterator<RoutePoint> for RouteTrack {
    fn from_iter<I: IntoIterator<Item = RoutePoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// An immutable copy of the route handed to renderers and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSnapshot {
    pub map_id: Option<MapId>,
    pub points: Vec<RoutePoint>,
    pub current: Option<Point2<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn seed_discards_previous_points() {
        let mut track: RouteTrack = (0..10)
            .map(|i| RoutePoint::new(i as f32, 0.0, RouteTag::Good))
            .collect();
        track.seed(RoutePoint::new(5.0, 5.0, RouteTag::Untagged));
        assert_eq!(track.len(), 1);
        assert_eq!(track.first().unwrap().position(), Point2::new(5.0, 5.0));
    }

    #[test]
    fn length_sums_segments() {
        let track: RouteTrack = [(0.0, 0.0), (3.0, 4.0), (3.0, 10.0)]
            .into_iter()
            .map(|(x, y)| RoutePoint::new(x, y, RouteTag::Untagged))
            .collect();
        assert_abs_diff_eq!(track.length(), 11.0, epsilon = 1e-5);
    }

    #[test]
    fn point_keeps_raw_tag_code() {
        let point = RoutePoint { x: 1.0, y: 2.0, tag: 9 };
        assert_eq!(point.route_tag(), RouteTag::Untagged);
        assert_eq!(point.tag, 9);
    }
}
