// src/editor_state.rs

use std::cell::RefCell;
use std::rc::Rc;

use map_polygon_editor::engine_lib::{
    ListAction, ListPanel, MapCamera, MapSurface, MemoryStorage, PolygonId, PolygonStats,
    PolygonStore, Preferences, Storage, StoreSnapshot, SurfaceEvent, SurfaceOutcome,
};
use map_polygon_editor::{EditorConfig, StoreError};

use crate::rendering_lib::TriangleCache;

/// Transient, dismissable message shown over the map.
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub text: String,
    /// Offer a "Retry save" action.
    pub retry_save: bool,
}

/// Everything the UI needs between frames.
pub struct EditorState {
    pub config: EditorConfig,
    pub store: PolygonStore<Box<dyn Storage>>,
    pub surface: MapSurface,
    pub camera: MapCamera,
    pub preferences: Preferences,
    pub notice: Option<Notice>,
    /// Polygon whose name is being edited, with the edit buffer.
    pub renaming: Option<(PolygonId, String)>,
    /// Short-lived hint such as "add at least 3 points".
    pub hint: Option<String>,
    pub triangles: TriangleCache,
    latest: Rc<RefCell<StoreSnapshot>>,
    stats: PolygonStats,
    stats_revision: Option<u64>,
}

fn open_storage(config: &EditorConfig) -> Box<dyn Storage> {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            let _ = config;
            match map_polygon_editor::engine_lib::storage::LocalStorage::open() {
                Ok(storage) => return Box::new(storage),
                Err(e) => log::warn!("{e}; polygons will not survive a reload"),
            }
        } else {
            match config.data_dir() {
                Some(dir) => match map_polygon_editor::engine_lib::storage::FileStorage::open(dir) {
                    Ok(storage) => return Box::new(storage),
                    Err(e) => log::warn!("{e}; polygons will not survive a restart"),
                },
                None => log::warn!("no data directory available; polygons will not survive a restart"),
            }
        }
    }
    Box::new(MemoryStorage::new())
}

impl EditorState {
    pub fn open(config: EditorConfig) -> Self {
        let storage = open_storage(&config);
        let preferences = Preferences::load(&storage, &config);
        let mut store = PolygonStore::load(storage, &config);

        let latest = Rc::new(RefCell::new(store.snapshot()));
        let sink = Rc::clone(&latest);
        store.subscribe(move |snapshot| {
            *sink.borrow_mut() = snapshot.clone();
        });

        Self {
            surface: MapSurface::new(&config),
            camera: MapCamera::default(),
            config,
            store,
            preferences,
            notice: None,
            renaming: None,
            hint: None,
            triangles: TriangleCache::new(),
            latest,
            stats: PolygonStats::default(),
            stats_revision: None,
        }
    }

    /// Latest snapshot published by the store.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.latest.borrow().clone()
    }

    /// Stats for the latest snapshot, recomputed only when it changed.
    pub fn stats(&mut self) -> &PolygonStats {
        let snapshot = self.latest.borrow();
        if self.stats_revision != Some(snapshot.revision) {
            self.stats = PolygonStats::from_polygons(&snapshot.polygons);
            self.stats_revision = Some(snapshot.revision);
        }
        drop(snapshot);
        &self.stats
    }

    pub fn dispatch(&mut self, event: SurfaceEvent) {
        match self.surface.handle(event, &mut self.store) {
            Ok(SurfaceOutcome::CommitRejected { points }) => {
                self.hint = Some(format!("A polygon needs at least 3 points ({points} placed)"));
            }
            Ok(SurfaceOutcome::Committed(id)) => {
                log::info!("committed polygon {id}");
                self.hint = None;
            }
            Ok(SurfaceOutcome::DrawStarted) | Ok(SurfaceOutcome::Cancelled) => {
                self.hint = None;
                self.renaming = None;
            }
            Ok(_) => {}
            Err(e) => self.report(e),
        }
    }

    pub fn apply(&mut self, action: ListAction) {
        if let Err(e) = ListPanel::apply(action, self.surface.drawing(), &mut self.store) {
            self.report(e);
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.store.selected().cloned() {
            self.apply(ListAction::Delete(id));
        }
    }

    pub fn retry_save(&mut self) {
        match self.store.flush() {
            Ok(()) => self.notice = None,
            Err(e) => self.report(e),
        }
    }

    pub fn toggle_dark_mode(&mut self, ctx: &egui::Context) {
        self.preferences.dark_mode = !self.preferences.dark_mode;
        ctx.set_visuals(if self.preferences.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });
        if let Err(e) = self.preferences.save(self.store.storage_mut(), &self.config) {
            log::warn!("could not save display preference: {e}");
        }
    }

    pub fn clear_color(&self) -> wgpu::Color {
        if self.preferences.dark_mode {
            wgpu::Color { r: 0.05, g: 0.05, b: 0.07, a: 1.0 }
        } else {
            wgpu::Color { r: 0.96, g: 0.96, b: 0.97, a: 1.0 }
        }
    }

    pub fn flush_on_exit(&mut self) {
        if self.store.is_dirty() {
            if let Err(e) = self.store.flush() {
                log::error!("unsaved polygons lost on exit: {e}");
            }
        }
    }

    fn report(&mut self, err: StoreError) {
        match err {
            StoreError::Persistence(_) => {
                log::warn!("{err}");
                self.notice = Some(Notice {
                    text: format!("Changes are kept for this session only: {err}"),
                    retry_save: true,
                });
            }
            StoreError::NotFound(_) => {
                self.notice = Some(Notice {
                    text: "That polygon no longer exists.".to_owned(),
                    retry_save: false,
                });
            }
            StoreError::Encode(_) => {
                log::error!("{err}");
                self.notice = Some(Notice {
                    text: format!("Changes could not be saved: {err}"),
                    retry_save: true,
                });
            }
            StoreError::InvalidGeometry(_) | StoreError::MalformedStoredData(_) => {
                log::warn!("{err}");
                self.notice = Some(Notice { text: err.to_string(), retry_save: false });
            }
        }
    }
}
