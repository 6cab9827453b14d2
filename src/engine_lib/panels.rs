// src/engine_lib/panels.rs

use chrono::{DateTime, Utc};

use crate::engine_lib::drawing::DrawingMachine;
use crate::engine_lib::polygon::{Polygon, PolygonId, PolygonPatch};
use crate::engine_lib::storage::Storage;
use crate::engine_lib::store::{PolygonStore, StoreSnapshot};
use crate::error::StoreError;

/// Aggregate figures over a polygon collection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolygonStats {
    pub count: usize,
    pub total_area: f64,
    pub total_perimeter: f64,
    pub largest: Option<PolygonId>,
}

impl PolygonStats {
    pub fn from_polygons(polygons: &[Polygon]) -> Self {
        let mut stats = Self {
            count: polygons.len(),
            ..Self::default()
        };
        let mut largest_area = f64::NEG_INFINITY;
        for polygon in polygons {
            let area = polygon.area();
            stats.total_area += area;
            stats.total_perimeter += polygon.perimeter();
            if area > largest_area {
                largest_area = area;
                stats.largest = Some(polygon.id().clone());
            }
        }
        stats
    }

    pub fn average_area(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_area / self.count as f64
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListEntry {
    pub id: PolygonId,
    pub name: String,
    pub vertex_count: usize,
    pub area: f64,
    pub perimeter: f64,
    pub created_at: DateTime<Utc>,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ListAction {
    Select(PolygonId),
    Delete(PolygonId),
    Rename(PolygonId, String),
}

/// Read-only projection of the store into list rows, plus the actions a
/// row can emit.
pub struct ListPanel;

impl ListPanel {
    pub fn entries(snapshot: &StoreSnapshot) -> Vec<ListEntry> {
        snapshot
            .polygons
            .iter()
            .map(|p| ListEntry {
                id: p.id().clone(),
                name: p.name.clone(),
                vertex_count: p.points().len(),
                area: p.area(),
                perimeter: p.perimeter(),
                created_at: p.created_at(),
                selected: snapshot.selected.as_ref() == Some(p.id()),
            })
            .collect()
    }

    /// Deleting a polygon that is already gone is not an error. Selection is
    /// ignored while a draft is open; the draft has to be committed or
    /// cancelled first.
    pub fn apply<S: Storage>(
        action: ListAction,
        drawing: &DrawingMachine,
        store: &mut PolygonStore<S>,
    ) -> Result<(), StoreError> {
        match action {
            ListAction::Select(id) if drawing.is_drawing() => {
                log::debug!("select {id} ignored while drawing");
                Ok(())
            }
            ListAction::Select(id) => store.select(Some(&id)),
            ListAction::Delete(id) => match store.remove(&id) {
                Err(StoreError::NotFound(_)) => {
                    log::debug!("delete of missing polygon {id} ignored");
                    Ok(())
                }
                other => other,
            },
            ListAction::Rename(id, name) => store.update(&id, PolygonPatch::rename(name.trim())),
        }
    }
}
