// src/rendering_lib/triangle_cache.rs

use std::collections::{HashMap, HashSet};

use map_polygon_editor::engine_lib::{Polygon, PolygonId};
use map_polygon_editor::geometry::{self, Vertex};

struct Entry {
    points: Vec<Vertex>,
    triangles: Vec<[usize; 3]>,
}

/// Fill triangulations kept across frames, redone only when a polygon's
/// ring changes.
#[derive(Default)]
pub struct TriangleCache {
    entries: HashMap<PolygonId, Entry>,
    triangulations: usize,
}

impl TriangleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triangles(&mut self, polygon: &Polygon) -> &[[usize; 3]] {
        let stale = self
            .entries
            .get(polygon.id())
            .map_or(true, |entry| entry.points != polygon.points());
        if stale {
            self.triangulations += 1;
            log::trace!("triangulating {} (#{})", polygon.id(), self.triangulations);
            self.entries.insert(
                polygon.id().clone(),
                Entry {
                    points: polygon.points().to_vec(),
                    triangles: geometry::triangulate(polygon.points()),
                },
            );
        }
        self.entries
            .get(polygon.id())
            .map_or(&[][..], |entry| entry.triangles.as_slice())
    }

    /// Drops entries for polygons no longer drawn.
    pub fn retain_only<'a>(&mut self, polygons: impl IntoIterator<Item = &'a Polygon>) {
        let live: HashSet<&PolygonId> = polygons.into_iter().map(Polygon::id).collect();
        self.entries.retain(|id, _| live.contains(id));
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }

    /// How many rings have been triangulated since creation.
    #[cfg(test)]
    fn triangulations(&self) -> usize {
        self.triangulations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_polygon_editor::engine_lib::{MemoryStorage, PolygonPatch, PolygonStore};
    use map_polygon_editor::EditorConfig;

    fn square(size: f64) -> Vec<Vertex> {
        vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(size, 0.0),
            Vertex::new(size, size),
            Vertex::new(0.0, size),
        ]
    }

    #[test]
    fn reuses_triangles_until_the_ring_changes() {
        let mut store = PolygonStore::new(MemoryStorage::new(), &EditorConfig::default());
        let id = store.add(square(1.0), "a").unwrap().id().clone();
        let mut cache = TriangleCache::new();

        for _ in 0..3 {
            let polygon = store.get(&id).unwrap();
            assert_eq!(cache.triangles(polygon).len(), 2);
        }
        assert_eq!(cache.triangulations(), 1);

        store.update(&id, PolygonPatch::rename("b")).unwrap();
        cache.triangles(store.get(&id).unwrap());
        assert_eq!(cache.triangulations(), 1);

        let mut ring = square(2.0);
        ring.push(Vertex::new(-1.0, 1.0));
        store.update(&id, PolygonPatch::reshape(ring)).unwrap();
        assert_eq!(cache.triangles(store.get(&id).unwrap()).len(), 3);
        assert_eq!(cache.triangulations(), 2);
    }

    #[test]
    fn removed_polygons_are_evicted() {
        let mut store = PolygonStore::new(MemoryStorage::new(), &EditorConfig::default());
        let a = store.add(square(1.0), "a").unwrap().id().clone();
        store.add(square(2.0), "b").unwrap();
        let mut cache = TriangleCache::new();
        for polygon in store.list() {
            cache.triangles(polygon);
        }
        assert_eq!(cache.len(), 2);

        store.remove(&a).unwrap();
        cache.retain_only(store.list());
        assert_eq!(cache.len(), 1);
    }
}
