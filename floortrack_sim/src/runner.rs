// floortrack_sim/src/runner.rs

use anyhow::{Context, Result};
use nalgebra::Point2;
use serde::Serialize;
use tracing::{info, warn};

use floortrack_core::prelude::*;

use crate::events::RecordedEvent;

/// What a run produced, printed at the end of `simulate` and `replay`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub map_id: MapId,
    pub events: usize,
    pub points: usize,
    /// Polyline length of the route, in pixels.
    pub length: f32,
    pub start: Option<[f32; 2]>,
    pub end: Option<[f32; 2]>,
}

/// Opens `map_id` for editing and feeds every event to a fresh session.
pub fn run_events(
    config: &EngineConfig,
    map_id: MapId,
    events: &[RecordedEvent],
) -> Result<(PositioningSession, RunReport)> {
    let mut session =
        PositioningSession::new(config.clone()).context("engine configuration rejected")?;
    session.load_map(map_id.clone(), MapMode::Edit);

    for event in events {
        apply(&mut session, event);
    }

    let track = session.track();
    let report = RunReport {
        map_id,
        events: events.len(),
        points: track.len(),
        length: track.length(),
        start: track.first().map(|p| [p.x, p.y]),
        end: track.last().map(|p| [p.x, p.y]),
    };
    info!(
        map = %report.map_id,
        points = report.points,
        length = report.length,
        "run finished"
    );
    Ok((session, report))
}

/// Routes one logged event to the matching session call.
pub fn apply(session: &mut PositioningSession, event: &RecordedEvent) -> Option<RoutePoint> {
    match *event {
        RecordedEvent::Tap { x, y, geo } => {
            if let Err(e) = session.place_anchor(Point2::new(x, y), geo) {
                warn!("tap ignored: {}", e);
            }
            None
        }
        RecordedEvent::Sensor(ref sensor) => session.on_sensor(sensor),
        RecordedEvent::Fix(ref fix) => session.on_fix(fix),
        RecordedEvent::Tag { code } => {
            session.set_route_tag(RouteTag::from_code(code));
            None
        }
        RecordedEvent::Pause => {
            session.pause();
            None
        }
        RecordedEvent::Resume => {
            session.resume();
            None
        }
    }
}

/// Saves the session's route under its map id.
pub fn persist(session: &PositioningSession, store: &mut dyn RouteStore) -> Result<()> {
    let Some(route) = session.to_stored() else {
        warn!("no map open, nothing to save");
        return Ok(());
    };
    store
        .save(&route)
        .with_context(|| format!("failed to save route for map '{}'", route.map_id))?;
    Ok(())
}
