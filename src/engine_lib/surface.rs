// src/engine_lib/surface.rs

use std::sync::Arc;

use crate::config::EditorConfig;
use crate::engine_lib::drawing::DrawingMachine;
use crate::engine_lib::polygon::{Polygon, PolygonId};
use crate::engine_lib::storage::Storage;
use crate::engine_lib::store::PolygonStore;
use crate::error::StoreError;
use crate::geometry::{self, Vertex};

/// Discrete input the host forwards to the surface.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceEvent {
    /// Pointer click, already converted to map coordinates.
    Click(Vertex),
    StartDraw,
    Confirm,
    CancelDraw,
    UndoPoint,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceOutcome {
    Selected(PolygonId),
    SelectionCleared,
    DrawStarted,
    VertexAdded { points: usize },
    VertexRemoved { points: usize },
    Committed(PolygonId),
    /// Confirm with too few points; still drawing.
    CommitRejected { points: usize },
    Cancelled,
    Ignored,
}

/// What the host draws this pass, bottom layer first.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderFrame {
    pub polygons: Arc<[Polygon]>,
    pub selected: Option<PolygonId>,
    /// Open polyline; `None` while idle.
    pub draft: Option<Vec<Vertex>>,
}

impl RenderFrame {
    pub fn is_selected(&self, polygon: &Polygon) -> bool {
        self.selected.as_ref() == Some(polygon.id())
    }
}

/// Translates pointer and command input into drawing transitions or store
/// selection. Holds no polygon state of its own.
#[derive(Clone, Debug)]
pub struct MapSurface {
    drawing: DrawingMachine,
    /// Extra slack around polygon edges for hits, in map units.
    hit_tolerance: f64,
}

impl MapSurface {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            drawing: DrawingMachine::new(),
            hit_tolerance: config.hit_tolerance_px,
        }
    }

    pub fn drawing(&self) -> &DrawingMachine {
        &self.drawing
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing.is_drawing()
    }

    /// Hosts with a zoomable view convert the pixel tolerance each frame.
    pub fn set_hit_tolerance(&mut self, map_units: f64) {
        self.hit_tolerance = map_units.max(0.0);
    }

    pub fn handle<S: Storage>(
        &mut self,
        event: SurfaceEvent,
        store: &mut PolygonStore<S>,
    ) -> Result<SurfaceOutcome, StoreError> {
        let outcome = match event {
            SurfaceEvent::Click(point) if self.drawing.is_drawing() => {
                if self.drawing.add_vertex(point) {
                    SurfaceOutcome::VertexAdded { points: self.draft_len() }
                } else {
                    SurfaceOutcome::Ignored
                }
            }
            SurfaceEvent::Click(point) => match self.hit_test(store.list(), point) {
                Some(id) => {
                    store.select(Some(&id))?;
                    SurfaceOutcome::Selected(id)
                }
                None if store.selected().is_some() => {
                    store.select(None)?;
                    SurfaceOutcome::SelectionCleared
                }
                None => SurfaceOutcome::Ignored,
            },
            SurfaceEvent::StartDraw => {
                if self.drawing.start(store) {
                    SurfaceOutcome::DrawStarted
                } else {
                    SurfaceOutcome::Ignored
                }
            }
            SurfaceEvent::Confirm => {
                if !self.drawing.is_drawing() {
                    SurfaceOutcome::Ignored
                } else {
                    let name = store.next_default_name();
                    match self.drawing.commit(store, name)? {
                        Some(polygon) => SurfaceOutcome::Committed(polygon.id().clone()),
                        None => SurfaceOutcome::CommitRejected { points: self.draft_len() },
                    }
                }
            }
            SurfaceEvent::CancelDraw => {
                if self.drawing.cancel() {
                    SurfaceOutcome::Cancelled
                } else {
                    SurfaceOutcome::Ignored
                }
            }
            SurfaceEvent::UndoPoint => match self.drawing.remove_last_vertex() {
                Some(_) => SurfaceOutcome::VertexRemoved { points: self.draft_len() },
                None => SurfaceOutcome::Ignored,
            },
        };
        log::trace!("surface outcome: {outcome:?}");
        Ok(outcome)
    }

    /// Topmost (most recently added) polygon under `point`.
    pub fn hit_test(&self, polygons: &[Polygon], point: Vertex) -> Option<PolygonId> {
        polygons
            .iter()
            .rev()
            .find(|p| {
                p.contains(point)
                    || geometry::distance_to_ring(p.points(), point)
                        .is_some_and(|d| d <= self.hit_tolerance)
            })
            .map(|p| p.id().clone())
    }

    pub fn frame<S: Storage>(&self, store: &PolygonStore<S>) -> RenderFrame {
        let snapshot = store.snapshot();
        RenderFrame {
            polygons: snapshot.polygons,
            selected: snapshot.selected,
            draft: self.drawing.draft().map(<[Vertex]>::to_vec),
        }
    }

    fn draft_len(&self) -> usize {
        self.drawing.draft().map_or(0, <[Vertex]>::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_lib::storage::MemoryStorage;

    fn setup() -> (MapSurface, PolygonStore<MemoryStorage>) {
        let config = EditorConfig {
            hit_tolerance_px: 0.5,
            ..EditorConfig::default()
        };
        (MapSurface::new(&config), PolygonStore::new(MemoryStorage::new(), &config))
    }

    fn click(x: f64, y: f64) -> SurfaceEvent {
        SurfaceEvent::Click(Vertex::new(x, y))
    }

    #[test]
    fn idle_click_selects_topmost_polygon() {
        let (mut surface, mut store) = setup();
        let square = vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(10.0, 0.0),
            Vertex::new(10.0, 10.0),
            Vertex::new(0.0, 10.0),
        ];
        store.add(square.clone(), "below").unwrap();
        let top = store.add(square, "above").unwrap().id().clone();

        let outcome = surface.handle(click(5.0, 5.0), &mut store).unwrap();
        assert_eq!(outcome, SurfaceOutcome::Selected(top.clone()));
        assert_eq!(store.selected(), Some(&top));

        // near an edge, within tolerance
        assert_eq!(
            surface.handle(click(10.3, 5.0), &mut store).unwrap(),
            SurfaceOutcome::Selected(top)
        );

        let outcome = surface.handle(click(50.0, 50.0), &mut store).unwrap();
        assert_eq!(outcome, SurfaceOutcome::SelectionCleared);
        assert_eq!(surface.handle(click(50.0, 50.0), &mut store).unwrap(), SurfaceOutcome::Ignored);
    }

    #[test]
    fn clicks_while_drawing_add_vertices() {
        let (mut surface, mut store) = setup();
        assert_eq!(surface.handle(SurfaceEvent::StartDraw, &mut store).unwrap(), SurfaceOutcome::DrawStarted);
        assert_eq!(surface.handle(SurfaceEvent::StartDraw, &mut store).unwrap(), SurfaceOutcome::Ignored);
        assert_eq!(
            surface.handle(click(1.0, 2.0), &mut store).unwrap(),
            SurfaceOutcome::VertexAdded { points: 1 }
        );
        assert_eq!(
            surface.handle(SurfaceEvent::UndoPoint, &mut store).unwrap(),
            SurfaceOutcome::VertexRemoved { points: 0 }
        );
        assert_eq!(surface.handle(SurfaceEvent::UndoPoint, &mut store).unwrap(), SurfaceOutcome::Ignored);
    }

    #[test]
    fn confirm_names_polygon_from_template() {
        let (mut surface, mut store) = setup();
        surface.handle(SurfaceEvent::StartDraw, &mut store).unwrap();
        for (x, y) in [(0.0, 0.0), (2.0, 0.0)] {
            surface.handle(click(x, y), &mut store).unwrap();
        }
        assert_eq!(
            surface.handle(SurfaceEvent::Confirm, &mut store).unwrap(),
            SurfaceOutcome::CommitRejected { points: 2 }
        );

        surface.handle(click(0.0, 2.0), &mut store).unwrap();
        let SurfaceOutcome::Committed(id) = surface.handle(SurfaceEvent::Confirm, &mut store).unwrap() else {
            panic!("expected a commit");
        };
        assert_eq!(store.get(&id).unwrap().name, "Polygon 1");
        assert!(!surface.is_drawing());
        assert_eq!(surface.handle(SurfaceEvent::Confirm, &mut store).unwrap(), SurfaceOutcome::Ignored);
    }

    #[test]
    fn frame_layers_draft_over_committed() {
        let (mut surface, mut store) = setup();
        store
            .add(vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 0.0), Vertex::new(0.0, 1.0)], "a")
            .unwrap();
        assert_eq!(surface.frame(&store).draft, None);

        surface.handle(SurfaceEvent::StartDraw, &mut store).unwrap();
        surface.handle(click(3.0, 3.0), &mut store).unwrap();
        let frame = surface.frame(&store);
        assert_eq!(frame.polygons.len(), 1);
        assert_eq!(frame.draft, Some(vec![Vertex::new(3.0, 3.0)]));
        assert!(!frame.is_selected(&frame.polygons[0]));

        assert_eq!(surface.handle(SurfaceEvent::CancelDraw, &mut store).unwrap(), SurfaceOutcome::Cancelled);
        assert_eq!(surface.frame(&store).draft, None);
        assert_eq!(store.len(), 1);
    }
}
