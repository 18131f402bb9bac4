use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::store::{RouteStore, StoredRoute};
use crate::types::MapId;

/// Keeps routes for the lifetime of the process. Used by tests and by the
/// sim when no output directory is given.
#[derive(Default, Debug, Clone)]
pub struct MemoryRouteStore {
    routes: BTreeMap<MapId, StoredRoute>,
}

impl MemoryRouteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RouteStore for MemoryRouteStore {
    fn save(&mut self, route: &StoredRoute) -> Result<(), StoreError> {
        self.routes.insert(route.map_id.clone(), route.clone());
        Ok(())
    }

    fn load(&self, map_id: &MapId) -> Result<Option<StoredRoute>, StoreError> {
        Ok(self.routes.get(map_id).cloned())
    }

    fn delete(&mut self, map_id: &MapId) -> Result<(), StoreError> {
        self.routes.remove(map_id);
        Ok(())
    }

    fn map_ids(&self) -> Result<Vec<MapId>, StoreError> {
        Ok(self.routes.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RoutePoint;
    use crate::types::RouteTag;

    #[test]
    fn save_overwrites_previous_route() {
        let mut store = MemoryRouteStore::new();
        let id = MapId::from("hall");
        let first = StoredRoute {
            map_id: id.clone(),
            points: vec![RoutePoint::new(0.0, 0.0, RouteTag::Untagged); 3],
            anchor_geo: None,
        };
        let second = StoredRoute {
            map_id: id.clone(),
            points: vec![RoutePoint::new(1.0, 1.0, RouteTag::Fair)],
            anchor_geo: None,
        };
        store.save(&first).unwrap();
        store.save(&second).unwrap();
        assert_eq!(store.load(&id).unwrap(), Some(second));

        store.delete(&id).unwrap();
        assert_eq!(store.load(&id).unwrap(), None);
        assert!(store.map_ids().unwrap().is_empty());
    }
}
