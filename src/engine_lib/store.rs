// src/engine_lib/store.rs

use std::collections::HashSet;
use std::sync::Arc;

use serde::de::Error as _;

use crate::config::EditorConfig;
use crate::engine_lib::polygon::{Polygon, PolygonId, PolygonPatch};
use crate::engine_lib::storage::Storage;
use crate::error::StoreError;
use crate::geometry::{self, Vertex};

/// Immutable view of the store handed to listeners and panels.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreSnapshot {
    pub polygons: Arc<[Polygon]>,
    pub selected: Option<PolygonId>,
    /// Bumped on every change, including selection.
    pub revision: u64,
}

impl StoreSnapshot {
    pub fn selected_polygon(&self) -> Option<&Polygon> {
        let id = self.selected.as_ref()?;
        self.polygons.iter().find(|p| p.id() == id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StoreSnapshot)>;

/// Authoritative polygon collection plus the current selection.
pub struct PolygonStore<S: Storage> {
    polygons: Vec<Polygon>,
    selected: Option<PolygonId>,
    storage: S,
    config: EditorConfig,
    next_ordinal: usize,
    revision: u64,
    dirty: bool,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

/// Parses the persisted JSON array. Repeated ids make the whole payload
/// malformed.
pub fn decode_polygons(raw: &str) -> Result<Vec<Polygon>, StoreError> {
    let polygons: Vec<Polygon> =
        serde_json::from_str(raw).map_err(StoreError::MalformedStoredData)?;
    let mut seen = HashSet::with_capacity(polygons.len());
    if let Some(dup) = polygons.iter().find(|p| !seen.insert(p.id())) {
        return Err(StoreError::MalformedStoredData(serde_json::Error::custom(
            format!("duplicate polygon id `{}`", dup.id()),
        )));
    }
    Ok(polygons)
}

pub fn encode_polygons(polygons: &[Polygon]) -> Result<String, StoreError> {
    serde_json::to_string(polygons).map_err(StoreError::Encode)
}

impl<S: Storage> PolygonStore<S> {
    /// Starts empty without touching storage.
    pub fn new(storage: S, config: &EditorConfig) -> Self {
        Self {
            polygons: Vec::new(),
            selected: None,
            storage,
            config: config.clone(),
            next_ordinal: 1,
            revision: 0,
            dirty: false,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Reloads the persisted collection. Unreadable or corrupt data yields an
    /// empty store and a warning, never an error.
    pub fn load(storage: S, config: &EditorConfig) -> Self {
        let mut store = Self::new(storage, config);
        let polygons = match store.storage.read_all(&store.config.polygons_key) {
            Ok(Some(raw)) => match decode_polygons(&raw) {
                Ok(polygons) => polygons,
                Err(e) => {
                    log::warn!("{e}; starting with an empty collection");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("could not read stored polygons: {e}; starting with an empty collection");
                Vec::new()
            }
        };
        log::info!("loaded {} polygon(s)", polygons.len());
        store.next_ordinal = polygons.len() + 1;
        store.polygons = polygons;
        store
    }

    pub fn list(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn get(&self, id: &PolygonId) -> Option<&Polygon> {
        self.polygons.iter().find(|p| p.id() == id)
    }

    pub fn selected(&self) -> Option<&PolygonId> {
        self.selected.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True while the last write failed and memory is ahead of storage.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            polygons: Arc::from(self.polygons.as_slice()),
            selected: self.selected.clone(),
            revision: self.revision,
        }
    }

    pub fn next_default_name(&self) -> String {
        self.config.default_name(self.next_ordinal)
    }

    pub fn add(&mut self, points: Vec<Vertex>, name: impl Into<String>) -> Result<Polygon, StoreError> {
        geometry::check_ring(&points)?;
        let polygon = Polygon::new(points, name.into());
        log::debug!("adding polygon {} ({:?})", polygon.id(), polygon.name);
        self.polygons.push(polygon.clone());
        self.next_ordinal += 1;
        self.changed();
        self.persist()?;
        Ok(polygon)
    }

    pub fn update(&mut self, id: &PolygonId, patch: PolygonPatch) -> Result<(), StoreError> {
        let polygon = self
            .polygons
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        if let Some(points) = &patch.points {
            geometry::check_ring(points)?;
        }
        if patch.is_empty() {
            return Ok(());
        }
        if let Some(name) = patch.name {
            polygon.name = name;
        }
        if let Some(points) = patch.points {
            polygon.set_points(points);
        }
        log::debug!("updated polygon {id}");
        self.changed();
        self.persist()
    }

    pub fn remove(&mut self, id: &PolygonId) -> Result<(), StoreError> {
        let index = self
            .polygons
            .iter()
            .position(|p| p.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        self.polygons.remove(index);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        log::debug!("removed polygon {id}");
        self.changed();
        self.persist()
    }

    /// `None` clears. An unknown id is rejected and the selection kept.
    pub fn select(&mut self, id: Option<&PolygonId>) -> Result<(), StoreError> {
        if let Some(id) = id {
            if self.get(id).is_none() {
                return Err(StoreError::NotFound(id.clone()));
            }
        }
        if self.selected.as_ref() == id {
            return Ok(());
        }
        self.selected = id.cloned();
        self.changed();
        Ok(())
    }

    /// Rewrites the current collection, clearing the dirty flag on success.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        self.persist()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StoreSnapshot) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn changed(&mut self) {
        self.revision += 1;
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for (_, listener) in self.listeners.iter_mut() {
            listener(&snapshot);
        }
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let encoded = match encode_polygons(&self.polygons) {
            Ok(encoded) => encoded,
            Err(e) => {
                log::error!("{e}; stored polygons left untouched");
                self.dirty = true;
                return Err(e);
            }
        };
        match self.storage.write_all(&self.config.polygons_key, &encoded) {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                log::warn!("persisting {} polygon(s) failed: {e}", self.polygons.len());
                self.dirty = true;
                Err(StoreError::Persistence(e))
            }
        }
    }
}

impl<S: Storage> std::fmt::Debug for PolygonStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolygonStore")
            .field("polygons", &self.polygons.len())
            .field("selected", &self.selected)
            .field("revision", &self.revision)
            .field("dirty", &self.dirty)
            .finish()
    }
}
