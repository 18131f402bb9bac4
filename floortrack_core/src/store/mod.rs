// floortrack_core/src/store/mod.rs

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::route::RoutePoint;
use crate::types::MapId;

// --- Stored Data ---
/// A route as it is persisted: the map it was drawn on and its points in
/// insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRoute {
    pub map_id: MapId,
    pub points: Vec<RoutePoint>,
    /// `(latitude, longitude)` the route's GPS positions are projected from.
    /// Absent for inertial routes and for files written before it existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_geo: Option<(f64, f64)>,
}

impl StoredRoute {
    pub fn new(map_id: MapId, points: Vec<RoutePoint>) -> Self {
        Self {
            map_id,
            points,
            anchor_geo: None,
        }
    }
}

// --- The Route Store Trait ("Contract") ---
/// Persistence for routes, keyed by map.
///
/// `save` replaces whatever was stored for the map before; `load` hands the
/// points back in the order they were saved.
pub trait RouteStore: Send + Sync {
    fn save(&mut self, route: &StoredRoute) -> Result<(), StoreError>;

    fn load(&self, map_id: &MapId) -> Result<Option<StoredRoute>, StoreError>;

    fn delete(&mut self, map_id: &MapId) -> Result<(), StoreError>;

    fn map_ids(&self) -> Result<Vec<MapId>, StoreError>;
}

mod json;
mod memory;

pub use json::JsonRouteStore;
pub use memory::MemoryRouteStore;
