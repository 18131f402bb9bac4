use std::fs;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::store::{RouteStore, StoredRoute};
use crate::types::MapId;

/// One pretty-printed JSON file per map inside a directory.
#[derive(Debug, Clone)]
pub struct JsonRouteStore {
    root: PathBuf,
}

impl JsonRouteStore {
    /// Opens (and creates, if needed) the store directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, map_id: &MapId) -> Result<PathBuf, StoreError> {
        let id = map_id.as_str();
        let usable = !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\', '\0']);
        if !usable {
            return Err(StoreError::InvalidMapId(map_id.clone()));
        }
        Ok(self.root.join(format!("{id}.json")))
    }
}

impl RouteStore for JsonRouteStore {
    fn save(&mut self, route: &StoredRoute) -> Result<(), StoreError> {
        let path = self.path_for(&route.map_id)?;
        let tmp = path.with_extension("json.tmp");

        // Write next to the target, then rename over it. The temporary file
        // never outlives a failed save.
        if let Err(e) = write_then_rename(route, &tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }

        debug!(map = %route.map_id, points = route.points.len(), ?path, "route saved");
        Ok(())
    }

    fn load(&self, map_id: &MapId) -> Result<Option<StoredRoute>, StoreError> {
        let path = self.path_for(map_id)?;
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let route: StoredRoute = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| StoreError::Serialization {
                path: path.clone(),
                source,
            })?;
        if &route.map_id != map_id {
            warn!(expected = %map_id, found = %route.map_id, "route file names a different map");
        }
        debug!(map = %map_id, points = route.points.len(), "route loaded");
        Ok(Some(route))
    }

    fn delete(&mut self, map_id: &MapId) -> Result<(), StoreError> {
        let path = self.path_for(map_id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn map_ids(&self) -> Result<Vec<MapId>, StoreError> {
        let entries = fs::read_dir(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut ids: Vec<MapId> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().map_or(false, |ext| ext == "json"))
            .filter_map(|path| path.file_stem().map(|s| MapId::new(s.to_string_lossy())))
            .collect();
        ids.sort();
        Ok(ids)
    }
}

fn write_then_rename(route: &StoredRoute, tmp: &Path, path: &Path) -> Result<(), StoreError> {
    let file = fs::File::create(tmp).map_err(io_err(tmp))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, route).map_err(|source| {
        StoreError::Serialization {
            path: tmp.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(io_err(tmp))?;
    drop(writer);
    fs::rename(tmp, path).map_err(io_err(path))
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}
