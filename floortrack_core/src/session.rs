// floortrack_core/src/session.rs

//! The positioning state machine.
//!
//! ```text
//! NoMap --load_map--> MapLoaded --place_anchor--> Tracking
//!   ^                    ^  |                        |  ^
//!   |                    |  +------load_map----------+  |
//!   +----close_map-------+----------reset------------+  +-- every accepted cycle
//! ```
//!
//! The session is the only writer of its [`RouteTrack`]. Every mutating
//! call takes `&mut self`, so callers that receive sensor and location
//! callbacks on different threads must serialise them (e.g. behind a
//! `Mutex`) before handing them in, in arrival order.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::config::{EngineConfig, PositioningMode};
use crate::displacement::{strategy_from_config, DisplacementStrategy, MotionInput};
use crate::error::{ConfigError, SessionError};
use crate::geo::GeoToPixelMapper;
use crate::messages::{GeoFix, Sample3, SensorEvent};
use crate::motion::MotionClassifier;
use crate::orientation::{Heading, OrientationFilter};
use crate::route::{RoutePoint, RouteSnapshot, RouteTrack};
use crate::store::StoredRoute;
use crate::types::{Anchor, MapId, RouteTag};

/// How a map was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MapMode {
    /// Taps place anchors and input extends the route.
    #[default]
    Edit,
    /// A stored route is displayed; taps and input are ignored.
    View,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NoMap,
    /// A map is open but no anchor has been placed yet.
    MapLoaded,
    Tracking,
}

#[derive(Debug, Clone, PartialEq)]
struct LoadedMap {
    id: MapId,
    mode: MapMode,
}

#[derive(Debug, Clone)]
pub struct PositioningSession {
    config: EngineConfig,
    map: Option<LoadedMap>,
    anchor: Option<Anchor>,
    current: Option<Point2<f32>>,
    track: RouteTrack,
    tag: RouteTag,
    paused: bool,

    // --- Inertial pipeline ---
    filter: OrientationFilter,
    classifier: MotionClassifier,
    strategy: Box<dyn DisplacementStrategy>,
    latest_accel: Option<Sample3>,
    latest_magnet: Option<Sample3>,
    last_sample_time: Option<f64>,
    last_heading: Option<Heading>,

    // --- GPS pipeline ---
    mapper: GeoToPixelMapper,
    last_fix: Option<GeoFix>,
}

impl PositioningSession {
    /// Creates a session in the `NoMap` phase.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            mode = ?config.mode,
            strategy = ?config.strategy,
            "positioning session created"
        );
        Ok(Self {
            filter: OrientationFilter::from_config(&config),
            classifier: MotionClassifier::from_config(&config),
            strategy: strategy_from_config(&config),
            mapper: GeoToPixelMapper::from_config(&config),
            config,
            map: None,
            anchor: None,
            current: None,
            track: RouteTrack::new(),
            tag: RouteTag::Untagged,
            paused: false,
            latest_accel: None,
            latest_magnet: None,
            last_sample_time: None,
            last_heading: None,
            last_fix: None,
        })
    }

    // =========================================================================
    // == State Transitions ==
    // =========================================================================

    /// Opens a reference image. Any previous anchor and route are discarded.
    pub fn load_map(&mut self, map_id: MapId, mode: MapMode) {
        info!(map = %map_id, ?mode, "map loaded");
        self.map = Some(LoadedMap { id: map_id, mode });
        self.clear_tracking();
    }

    pub fn close_map(&mut self) {
        if let Some(map) = self.map.take() {
            info!(map = %map.id, "map closed");
        }
        self.clear_tracking();
    }

    /// Handles the user's tap: sets the anchor and restarts the route there.
    ///
    /// In GPS mode a missing `geo` is filled from the latest known fix; if
    /// there is none yet, the first fix after the tap becomes the reference.
    pub fn place_anchor(
        &mut self,
        pixel: Point2<f32>,
        geo: Option<(f64, f64)>,
    ) -> Result<(), SessionError> {
        let map = self.map.as_ref().ok_or(SessionError::NoMapLoaded)?;
        if map.mode == MapMode::View {
            return Err(SessionError::ReadOnlyMap(map.id.clone()));
        }

        let geo = match (self.config.mode, geo) {
            (_, Some(geo)) => Some(geo),
            (PositioningMode::Gps, None) => self.last_fix.map(|fix| fix.lat_lon()),
            (PositioningMode::Inertial, None) => None,
        };

        info!(x = pixel.x, y = pixel.y, ?geo, "anchor placed");
        self.reset_motion();
        self.anchor = Some(Anchor { pixel, geo });
        self.current = Some(pixel);
        self.track
            .seed(RoutePoint::new(pixel.x, pixel.y, RouteTag::Untagged));
        Ok(())
    }

    /// Drops the anchor and the route but keeps the map open.
    pub fn reset(&mut self) {
        info!("session reset");
        self.clear_tracking();
    }

    /// Stops consuming input. Everything arriving while paused is dropped.
    pub fn pause(&mut self) {
        if !self.paused {
            info!("input paused");
        }
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            info!("input resumed");
        }
        self.paused = false;
        // Samples from before the pause are stale and the gap is not a dt.
        self.latest_accel = None;
        self.latest_magnet = None;
        self.last_sample_time = None;
        self.last_fix = None;
    }

    /// Quality class stamped on every point appended from now on.
    pub fn set_route_tag(&mut self, tag: RouteTag) {
        self.tag = tag;
    }

    /// Reinstates a persisted route for the open map without re-deriving it.
    ///
    /// The first stored point becomes the anchor, with the stored geo
    /// reference if there is one, and the last one the current position, so
    /// an editable map continues tracking from where it stopped.
    pub fn restore(&mut self, route: StoredRoute) -> Result<(), SessionError> {
        let map = self.map.as_ref().ok_or(SessionError::NoMapLoaded)?;
        if map.id != route.map_id {
            return Err(SessionError::MapMismatch {
                loaded: map.id.clone(),
                found: route.map_id,
            });
        }

        self.clear_tracking();
        self.track = route.points.into_iter().collect();
        self.anchor = self.track.first().map(|p| Anchor {
            pixel: p.position(),
            geo: route.anchor_geo,
        });
        self.current = self.track.last().map(RoutePoint::position);
        info!(points = self.track.len(), "route restored");
        Ok(())
    }

    // =========================================================================
    // == Input ==
    // =========================================================================

    /// Feeds one sensor callback. Returns the appended point, if any.
    pub fn on_sensor(&mut self, event: &SensorEvent) -> Option<RoutePoint> {
        if self.paused {
            trace!("sensor event dropped while paused");
            return None;
        }

        let sample = match event {
            SensorEvent::Accelerometer(s) => {
                self.latest_accel = Some(*s);
                s
            }
            SensorEvent::Magnetometer(s) => {
                self.latest_magnet = Some(*s);
                s
            }
            SensorEvent::Gyroscope(_) => return None,
        };

        let dt = match self.last_sample_time {
            Some(previous) if sample.timestamp < previous => {
                debug!(
                    previous,
                    now = sample.timestamp,
                    "sample out of order, treating as simultaneous"
                );
                0.0
            }
            Some(previous) => (sample.timestamp - previous) as f32,
            None => 0.0,
        };
        self.last_sample_time = Some(self.last_sample_time.map_or(sample.timestamp, |p| {
            p.max(sample.timestamp)
        }));

        let (accel, magnet) = (self.latest_accel?, self.latest_magnet?);
        self.process_cycle(&accel, &magnet, dt)
    }

    /// Runs one inertial cycle with an explicit `dt` since the previous one.
    pub fn process_cycle(
        &mut self,
        accel: &Sample3,
        magnet: &Sample3,
        dt: f32,
    ) -> Option<RoutePoint> {
        if self.paused || self.config.mode != PositioningMode::Inertial || !self.accepts_input() {
            return None;
        }
        let current = self.current?;

        // 1. Orientation and pose gate. The debounce clock runs either way.
        let heading = self.filter.update(accel, magnet);
        let smoothed_accel = self.filter.smoothed_accel();
        let motion = self.classifier.classify(smoothed_accel, dt)?;
        self.last_heading = Some(heading);
        if !heading.is_horizontal {
            trace!("not horizontal, movement ignored");
            return None;
        }

        // 2. Displacement.
        let input = MotionInput {
            heading,
            smoothed_accel,
            motion,
        };
        let offset = self
            .strategy
            .step(&input, self.classifier.last_interval())?;

        // 3. Accumulate.
        self.append(current + offset)
    }

    /// Feeds one location fix. Returns the appended point, if any.
    pub fn on_fix(&mut self, fix: &GeoFix) -> Option<RoutePoint> {
        if self.paused {
            trace!("location fix dropped while paused");
            return None;
        }
        self.last_fix = Some(*fix);

        if self.config.mode != PositioningMode::Gps || !self.accepts_input() {
            return None;
        }

        let current = self.current?;
        let anchor = self.anchor.as_mut()?;
        if anchor.geo.is_none() {
            // The fix describes where the user is now, which is the current
            // position: the tap itself, or the end of a restored route.
            info!(
                latitude = fix.latitude,
                longitude = fix.longitude,
                x = current.x,
                y = current.y,
                "geo reference taken from first fix"
            );
            *anchor = Anchor::with_geo(current, fix.latitude, fix.longitude);
            return None;
        }

        let position = self.mapper.map_delta(self.anchor.as_ref(), fix.lat_lon())?;
        self.append(position)
    }

    // =========================================================================
    // == Output ==
    // =========================================================================

    pub fn phase(&self) -> SessionPhase {
        match (&self.map, &self.anchor) {
            (None, _) => SessionPhase::NoMap,
            (Some(_), None) => SessionPhase::MapLoaded,
            (Some(_), Some(_)) => SessionPhase::Tracking,
        }
    }

    pub fn map_id(&self) -> Option<&MapId> {
        self.map.as_ref().map(|m| &m.id)
    }

    pub fn map_mode(&self) -> Option<MapMode> {
        self.map.as_ref().map(|m| m.mode)
    }

    pub fn anchor(&self) -> Option<&Anchor> {
        self.anchor.as_ref()
    }

    pub fn current_position(&self) -> Option<Point2<f32>> {
        self.current
    }

    /// The live track. Take a [`snapshot`](Self::snapshot) to keep it.
    pub fn track(&self) -> &RouteTrack {
        &self.track
    }

    pub fn last_heading(&self) -> Option<Heading> {
        self.last_heading
    }

    pub fn route_tag(&self) -> RouteTag {
        self.tag
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshot(&self) -> RouteSnapshot {
        RouteSnapshot {
            map_id: self.map_id().cloned(),
            points: self.track.points().to_vec(),
            current: self.current,
        }
    }

    /// The route in its persisted form, if a map is open.
    pub fn to_stored(&self) -> Option<StoredRoute> {
        Some(StoredRoute {
            map_id: self.map_id()?.clone(),
            points: self.track.points().to_vec(),
            anchor_geo: self.anchor.and_then(|a| a.geo),
        })
    }

    // =========================================================================
    // == Helpers ==
    // =========================================================================

    fn accepts_input(&self) -> bool {
        matches!(
            self.map,
            Some(LoadedMap {
                mode: MapMode::Edit,
                ..
            })
        )
    }

    fn append(&mut self, position: Point2<f32>) -> Option<RoutePoint> {
        if !position.x.is_finite() || !position.y.is_finite() {
            warn!(?position, "non-finite position discarded");
            return None;
        }
        let point = RoutePoint::new(position.x, position.y, self.tag);
        self.current = Some(position);
        self.track.push(point);
        trace!(x = point.x, y = point.y, tag = point.tag, "route point appended");
        Some(point)
    }

    fn reset_motion(&mut self) {
        self.classifier.reset();
        self.strategy.reset();
    }

    fn clear_tracking(&mut self) {
        self.anchor = None;
        self.current = None;
        self.track.clear();
        self.last_heading = None;
        self.last_fix = None;
        self.filter.reset();
        self.reset_motion();
    }
}
