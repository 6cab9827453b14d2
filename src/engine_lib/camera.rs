// src/engine_lib/camera.rs

use glam::DVec2;

use crate::config::constants::{MAX_ZOOM, MIN_ZOOM};
use crate::geometry::Vertex;

/// Pan/zoom transform between map coordinates and screen pixels.
///
/// Screen space has its origin at the top-left with +y down; map space has
/// +y up. `center` is the map point shown in the middle of the viewport and
/// `zoom` is pixels per map unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapCamera {
    pub center: DVec2,
    pub zoom: f64,
}

impl Default for MapCamera {
    fn default() -> Self {
        Self {
            center: DVec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl MapCamera {
    pub fn new(center: DVec2, zoom: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    pub fn map_to_screen(&self, p: Vertex, viewport: DVec2) -> DVec2 {
        let offset = (DVec2::new(p.x, p.y) - self.center) * self.zoom;
        viewport * 0.5 + DVec2::new(offset.x, -offset.y)
    }

    pub fn screen_to_map(&self, screen: DVec2, viewport: DVec2) -> Vertex {
        let offset = screen - viewport * 0.5;
        let map = self.center + DVec2::new(offset.x, -offset.y) / self.zoom;
        Vertex::new(map.x, map.y)
    }

    /// Converts a pixel length into map units at the current zoom.
    pub fn pixels_to_map(&self, pixels: f64) -> f64 {
        pixels / self.zoom
    }

    /// Moves the view by a screen-space drag delta.
    pub fn pan_pixels(&mut self, delta: DVec2) {
        self.center -= DVec2::new(delta.x, -delta.y) / self.zoom;
    }

    /// Scales around `anchor` (screen pixels) so the map point under it stays put.
    pub fn zoom_at(&mut self, factor: f64, anchor: DVec2, viewport: DVec2) {
        let before = self.screen_to_map(anchor, viewport);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let after = self.screen_to_map(anchor, viewport);
        self.center += DVec2::new(before.x - after.x, before.y - after.y);
    }

    /// Centres on the bounding box of `points` with `margin` pixels to spare.
    pub fn fit(&mut self, points: impl IntoIterator<Item = Vertex>, viewport: DVec2, margin: f64) {
        let mut min = DVec2::splat(f64::INFINITY);
        let mut max = DVec2::splat(f64::NEG_INFINITY);
        for p in points {
            let v = DVec2::new(p.x, p.y);
            min = min.min(v);
            max = max.max(v);
        }
        if !min.is_finite() || !max.is_finite() {
            return;
        }
        self.center = (min + max) * 0.5;
        let extent = (max - min).max(DVec2::splat(1e-9));
        let usable = (viewport - DVec2::splat(2.0 * margin)).max(DVec2::ONE);
        let zoom = (usable.x / extent.x).min(usable.y / extent.y);
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: DVec2 = DVec2::new(800.0, 600.0);

    fn near(a: Vertex, b: Vertex) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn center_maps_to_viewport_middle() {
        let camera = MapCamera::new(DVec2::new(10.0, 20.0), 2.0);
        assert_eq!(camera.map_to_screen(Vertex::new(10.0, 20.0), VIEWPORT), DVec2::new(400.0, 300.0));
        // +y in map space is up on screen
        assert_eq!(camera.map_to_screen(Vertex::new(10.0, 21.0), VIEWPORT), DVec2::new(400.0, 298.0));
    }

    #[test]
    fn screen_round_trip() {
        let camera = MapCamera::new(DVec2::new(-3.5, 7.25), 3.0);
        let p = Vertex::new(12.0, -4.0);
        let back = camera.screen_to_map(camera.map_to_screen(p, VIEWPORT), VIEWPORT);
        assert!(near(p, back));
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut camera = MapCamera::default();
        let anchor = DVec2::new(100.0, 50.0);
        let before = camera.screen_to_map(anchor, VIEWPORT);
        camera.zoom_at(4.0, anchor, VIEWPORT);
        assert_eq!(camera.zoom, 4.0);
        assert!(near(before, camera.screen_to_map(anchor, VIEWPORT)));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = MapCamera::default();
        camera.zoom_at(1e9, DVec2::ZERO, VIEWPORT);
        assert_eq!(camera.zoom, MAX_ZOOM);
    }

    #[test]
    fn pan_follows_the_drag() {
        let mut camera = MapCamera::default();
        let grabbed = camera.screen_to_map(DVec2::new(200.0, 200.0), VIEWPORT);
        camera.pan_pixels(DVec2::new(30.0, -10.0));
        assert!(near(grabbed, camera.screen_to_map(DVec2::new(230.0, 190.0), VIEWPORT)));
    }

    #[test]
    fn fit_frames_all_points() {
        let mut camera = MapCamera::default();
        camera.fit([Vertex::new(0.0, 0.0), Vertex::new(10.0, 5.0)], VIEWPORT, 0.0);
        assert_eq!(camera.center, DVec2::new(5.0, 2.5));
        assert_eq!(camera.zoom, 40.0);

        let untouched = camera;
        camera.fit(std::iter::empty(), VIEWPORT, 0.0);
        assert_eq!(camera, untouched);
    }
}
