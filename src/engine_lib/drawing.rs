// src/engine_lib/drawing.rs

use crate::engine_lib::polygon::Polygon;
use crate::engine_lib::storage::Storage;
use crate::engine_lib::store::PolygonStore;
use crate::error::StoreError;
use crate::geometry::{self, Vertex};

#[derive(Clone, Debug, Default, PartialEq)]
pub enum DrawState {
    #[default]
    Idle,
    Drawing { draft: Vec<Vertex> },
}

/// Lifecycle of the one polygon being drawn.
///
/// `start` while a draft is open is rejected and the draft is kept; the
/// caller has to `commit` or `cancel` first.
#[derive(Clone, Debug, Default)]
pub struct DrawingMachine {
    state: DrawState,
}

impl DrawingMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawState::Drawing { .. })
    }

    /// Draft vertices, or `None` while idle.
    pub fn draft(&self) -> Option<&[Vertex]> {
        match &self.state {
            DrawState::Drawing { draft } => Some(draft),
            DrawState::Idle => None,
        }
    }

    pub fn can_commit(&self) -> bool {
        self.draft().is_some_and(|draft| geometry::check_ring(draft).is_ok())
    }

    /// Returns `false` if a draft is already open.
    pub fn start<S: Storage>(&mut self, store: &mut PolygonStore<S>) -> bool {
        if self.is_drawing() {
            log::debug!("start ignored, a draft is already open");
            return false;
        }
        // Clearing never fails.
        let _ = store.select(None);
        self.state = DrawState::Drawing { draft: Vec::new() };
        true
    }

    /// Non-finite vertices are refused so every draft can be stored.
    pub fn add_vertex(&mut self, vertex: Vertex) -> bool {
        match &mut self.state {
            DrawState::Drawing { .. } if !vertex.is_finite() => {
                log::warn!("ignoring non-finite vertex {vertex:?}");
                false
            }
            DrawState::Drawing { draft } => {
                draft.push(vertex);
                true
            }
            DrawState::Idle => false,
        }
    }

    pub fn remove_last_vertex(&mut self) -> Option<Vertex> {
        match &mut self.state {
            DrawState::Drawing { draft } => draft.pop(),
            DrawState::Idle => None,
        }
    }

    /// Hands a draft of 3+ points to the store and returns to `Idle`.
    ///
    /// Shorter drafts (and calls while idle) leave everything untouched and
    /// yield `Ok(None)`. A failed write still ends the draft, since the
    /// polygon is already in the store's memory.
    pub fn commit<S: Storage>(
        &mut self,
        store: &mut PolygonStore<S>,
        name: impl Into<String>,
    ) -> Result<Option<Polygon>, StoreError> {
        if !self.can_commit() {
            return Ok(None);
        }
        let DrawState::Drawing { draft } = std::mem::take(&mut self.state) else {
            return Ok(None);
        };
        match store.add(draft, name) {
            Ok(polygon) => Ok(Some(polygon)),
            Err(StoreError::InvalidGeometry(defect)) => {
                // unreachable after can_commit
                log::error!("store refused the draft: {defect}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Discards the draft. Returns `false` when there was nothing to cancel.
    pub fn cancel(&mut self) -> bool {
        let was_drawing = self.is_drawing();
        self.state = DrawState::Idle;
        was_drawing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::engine_lib::storage::MemoryStorage;

    fn store() -> PolygonStore<MemoryStorage> {
        PolygonStore::new(MemoryStorage::new(), &EditorConfig::default())
    }

    #[test]
    fn starts_idle() {
        let machine = DrawingMachine::new();
        assert_eq!(machine.state(), &DrawState::Idle);
        assert_eq!(machine.draft(), None);
    }

    #[test]
    fn start_clears_selection_and_rejects_second_start() {
        let mut store = store();
        let id = store
            .add(vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 0.0), Vertex::new(0.0, 1.0)], "a")
            .unwrap()
            .id()
            .clone();
        store.select(Some(&id)).unwrap();

        let mut machine = DrawingMachine::new();
        assert!(machine.start(&mut store));
        assert_eq!(store.selected(), None);

        machine.add_vertex(Vertex::new(5.0, 5.0));
        assert!(!machine.start(&mut store));
        assert_eq!(machine.draft(), Some(&[Vertex::new(5.0, 5.0)][..]));
    }

    #[test]
    fn vertices_are_kept_in_order_without_dedup() {
        let mut machine = DrawingMachine::new();
        assert!(!machine.add_vertex(Vertex::new(1.0, 1.0)));

        machine.start(&mut store());
        for v in [(1.0, 1.0), (1.0, 1.0), (2.0, 3.0)] {
            assert!(machine.add_vertex(v.into()));
        }
        assert_eq!(
            machine.draft().unwrap(),
            &[Vertex::new(1.0, 1.0), Vertex::new(1.0, 1.0), Vertex::new(2.0, 3.0)]
        );
    }

    #[test]
    fn non_finite_vertices_never_enter_the_draft() {
        let mut machine = DrawingMachine::new();
        machine.start(&mut store());
        assert!(!machine.add_vertex(Vertex::new(f64::INFINITY, 0.0)));
        assert!(!machine.add_vertex(Vertex::new(0.0, f64::NAN)));
        assert_eq!(machine.draft(), Some(&[][..]));
    }

    #[test]
    fn undo_pops_last_vertex_and_tolerates_empty_draft() {
        let mut machine = DrawingMachine::new();
        assert_eq!(machine.remove_last_vertex(), None);
        machine.start(&mut store());
        assert_eq!(machine.remove_last_vertex(), None);
        assert!(machine.is_drawing());

        machine.add_vertex(Vertex::new(1.0, 0.0));
        machine.add_vertex(Vertex::new(2.0, 0.0));
        assert_eq!(machine.remove_last_vertex(), Some(Vertex::new(2.0, 0.0)));
        assert_eq!(machine.draft().unwrap().len(), 1);
    }

    #[test]
    fn short_commit_stays_in_drawing() {
        let mut store = store();
        let mut machine = DrawingMachine::new();
        machine.start(&mut store);
        machine.add_vertex(Vertex::new(0.0, 0.0));
        machine.add_vertex(Vertex::new(1.0, 1.0));

        assert_eq!(machine.commit(&mut store, "x").unwrap(), None);
        assert!(machine.is_drawing());
        assert_eq!(machine.draft().unwrap().len(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn commit_hands_draft_to_store() {
        let mut store = store();
        let mut machine = DrawingMachine::new();
        machine.start(&mut store);
        let ring = [(0.0, 0.0), (4.0, 0.0), (4.0, 3.0)].map(Vertex::from);
        ring.iter().for_each(|v| {
            machine.add_vertex(*v);
        });

        let polygon = machine.commit(&mut store, "tri").unwrap().unwrap();
        assert_eq!(polygon.points(), &ring);
        assert_eq!(machine.state(), &DrawState::Idle);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn persistence_failure_still_ends_draft() {
        let mut store = store();
        store.storage_mut().set_failing(true);
        let mut machine = DrawingMachine::new();
        machine.start(&mut store);
        for v in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)] {
            machine.add_vertex(v.into());
        }

        assert!(machine.commit(&mut store, "p").unwrap_err().is_persistence());
        assert!(!machine.is_drawing());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn cancel_discards_draft() {
        let mut store = store();
        let mut machine = DrawingMachine::new();
        assert!(!machine.cancel());
        machine.start(&mut store);
        for v in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (2.0, 2.0)] {
            machine.add_vertex(v.into());
        }
        assert!(machine.cancel());
        assert_eq!(machine.state(), &DrawState::Idle);
        assert!(store.is_empty());
    }
}
