// src/rendering_lib/map_painter.rs

use egui::epaint::{Mesh, Shape};
use egui::{Align2, Color32, FontId, Painter, PointerButton, Pos2, Rect, Sense, Stroke};
use glam::DVec2;
use map_polygon_editor::engine_lib::{MapCamera, RenderFrame, SurfaceEvent};
use map_polygon_editor::geometry::Vertex;

use crate::editor_state::EditorState;
use crate::rendering_lib::TriangleCache;

const GRID_STEP_PX: f64 = 48.0;
const FIT_MARGIN_PX: f64 = 40.0;
const ZOOM_STEP: f64 = 1.25;
const SCROLL_ZOOM_RATE: f64 = 0.002;

struct Palette {
    background: Color32,
    grid: Color32,
    fill: Color32,
    outline: Color32,
    selected_fill: Color32,
    selected_outline: Color32,
    draft: Color32,
    label: Color32,
}

impl Palette {
    fn new(dark: bool) -> Self {
        if dark {
            Self {
                background: Color32::from_rgb(22, 26, 32),
                grid: Color32::from_rgb(38, 44, 54),
                fill: Color32::from_rgba_unmultiplied(70, 140, 230, 60),
                outline: Color32::from_rgb(90, 160, 240),
                selected_fill: Color32::from_rgba_unmultiplied(250, 170, 60, 90),
                selected_outline: Color32::from_rgb(255, 190, 80),
                draft: Color32::from_rgb(120, 220, 140),
                label: Color32::from_gray(230),
            }
        } else {
            Self {
                background: Color32::from_rgb(236, 240, 232),
                grid: Color32::from_rgb(216, 222, 210),
                fill: Color32::from_rgba_unmultiplied(40, 110, 210, 50),
                outline: Color32::from_rgb(30, 90, 190),
                selected_fill: Color32::from_rgba_unmultiplied(240, 140, 20, 80),
                selected_outline: Color32::from_rgb(210, 110, 0),
                draft: Color32::from_rgb(20, 150, 70),
                label: Color32::from_gray(30),
            }
        }
    }
}

/// Maps between the camera's pixel space and the widget rect.
struct View {
    rect: Rect,
    camera: MapCamera,
}

impl View {
    fn viewport(&self) -> DVec2 {
        DVec2::new(self.rect.width() as f64, self.rect.height() as f64)
    }

    fn to_screen(&self, p: Vertex) -> Pos2 {
        let s = self.camera.map_to_screen(p, self.viewport());
        self.rect.min + egui::vec2(s.x as f32, s.y as f32)
    }

    fn to_map(&self, pos: Pos2) -> Vertex {
        let local = pos - self.rect.min;
        self.camera
            .screen_to_map(DVec2::new(local.x as f64, local.y as f64), self.viewport())
    }
}

/// Interactive map canvas: pan, zoom, click-to-select and click-to-draw.
pub fn show_map(ui: &mut egui::Ui, state: &mut EditorState) {
    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
    let rect = response.rect;
    let viewport = DVec2::new(rect.width() as f64, rect.height() as f64);

    if response.dragged_by(PointerButton::Secondary) || response.dragged_by(PointerButton::Middle) {
        let delta = response.drag_delta();
        state.camera.pan_pixels(DVec2::new(delta.x as f64, delta.y as f64));
    }
    if let Some(hover) = response.hover_pos() {
        let (pinch, scroll) = ui.input(|i| (i.zoom_delta(), i.smooth_scroll_delta.y));
        let zoom = pinch as f64 * (scroll as f64 * SCROLL_ZOOM_RATE).exp();
        if (zoom - 1.0).abs() > f64::EPSILON {
            let anchor = hover - rect.min;
            state
                .camera
                .zoom_at(zoom, DVec2::new(anchor.x as f64, anchor.y as f64), viewport);
        }
    }

    let tolerance = state.camera.pixels_to_map(state.config.hit_tolerance_px);
    state.surface.set_hit_tolerance(tolerance);

    if response.clicked_by(PointerButton::Primary) {
        if let Some(pos) = response.interact_pointer_pos() {
            let view = View { rect, camera: state.camera };
            state.dispatch(SurfaceEvent::Click(view.to_map(pos)));
        }
    }

    let view = View { rect, camera: state.camera };
    let palette = Palette::new(state.preferences.dark_mode);
    let frame = state.surface.frame(&state.store);

    painter.rect_filled(rect, 0.0, palette.background);
    paint_grid(&painter, &view, palette.grid);
    state.triangles.retain_only(frame.polygons.iter());
    paint_polygons(&painter, &view, &frame, &palette, &mut state.triangles);
    if let Some(draft) = &frame.draft {
        paint_draft(&painter, &view, draft, response.hover_pos(), palette.draft);
    }
    paint_status(&painter, &view, &frame, response.hover_pos(), palette.label);

    view_controls(ui, rect, state, viewport);
}

fn paint_grid(painter: &Painter, view: &View, color: Color32) {
    let step_map = view.camera.pixels_to_map(GRID_STEP_PX);
    // Round to 1, 2 or 5 times a power of ten so labels stay readable.
    let magnitude = 10f64.powf(step_map.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= step_map)
        .unwrap_or(step_map);

    let top_left = view.to_map(view.rect.left_top());
    let bottom_right = view.to_map(view.rect.right_bottom());
    let stroke = Stroke::new(1.0, color);

    let mut x = (top_left.x / step).floor() * step;
    while x <= bottom_right.x {
        let sx = view.to_screen(Vertex::new(x, 0.0)).x;
        painter.line_segment(
            [Pos2::new(sx, view.rect.top()), Pos2::new(sx, view.rect.bottom())],
            stroke,
        );
        x += step;
    }
    let mut y = (bottom_right.y / step).floor() * step;
    while y <= top_left.y {
        let sy = view.to_screen(Vertex::new(0.0, y)).y;
        painter.line_segment(
            [Pos2::new(view.rect.left(), sy), Pos2::new(view.rect.right(), sy)],
            stroke,
        );
        y += step;
    }
}

fn fill_mesh(view: &View, points: &[Vertex], triangles: &[[usize; 3]], color: Color32) -> Mesh {
    let mut mesh = Mesh::default();
    for p in points {
        mesh.colored_vertex(view.to_screen(*p), color);
    }
    for &[a, b, c] in triangles {
        mesh.add_triangle(a as u32, b as u32, c as u32);
    }
    mesh
}

fn paint_polygons(
    painter: &Painter,
    view: &View,
    frame: &RenderFrame,
    palette: &Palette,
    triangles: &mut TriangleCache,
) {
    for polygon in frame.polygons.iter() {
        let selected = frame.is_selected(polygon);
        let (fill, outline, width) = if selected {
            (palette.selected_fill, palette.selected_outline, 3.0)
        } else {
            (palette.fill, palette.outline, 1.5)
        };

        let mesh = fill_mesh(view, polygon.points(), triangles.triangles(polygon), fill);
        painter.add(Shape::mesh(mesh));
        let ring: Vec<Pos2> = polygon.points().iter().map(|p| view.to_screen(*p)).collect();
        painter.add(Shape::closed_line(ring, Stroke::new(width, outline)));

        if let Some(center) = polygon.centroid() {
            painter.text(
                view.to_screen(center),
                Align2::CENTER_CENTER,
                polygon.name.as_str(),
                FontId::proportional(if selected { 14.0 } else { 12.0 }),
                palette.label,
            );
        }
    }
}

fn paint_draft(
    painter: &Painter,
    view: &View,
    draft: &[Vertex],
    hover: Option<Pos2>,
    color: Color32,
) {
    let line: Vec<Pos2> = draft.iter().map(|p| view.to_screen(*p)).collect();
    if line.len() >= 2 {
        painter.add(Shape::line(line.clone(), Stroke::new(2.0, color)));
    }
    // Rubber band from the last vertex to the pointer, and back to the first.
    if let (Some(last), Some(pointer)) = (line.last(), hover) {
        let faint = color.gamma_multiply(0.5);
        painter.line_segment([*last, pointer], Stroke::new(1.0, faint));
        if line.len() >= 2 {
            painter.line_segment([pointer, line[0]], Stroke::new(1.0, faint));
        }
    }
    for (i, pos) in line.iter().enumerate() {
        let radius = if i == 0 { 5.0 } else { 3.5 };
        painter.circle_filled(*pos, radius, color);
    }
}

fn paint_status(
    painter: &Painter,
    view: &View,
    frame: &RenderFrame,
    hover: Option<Pos2>,
    color: Color32,
) {
    let mut status = match &frame.draft {
        Some(draft) => format!("Drawing: {} points", draft.len()),
        None => format!("{} polygons", frame.polygons.len()),
    };
    if let Some(pos) = hover {
        let p = view.to_map(pos);
        status.push_str(&format!("  ·  {:.2}, {:.2}", p.x, p.y));
    }
    painter.text(
        view.rect.left_bottom() + egui::vec2(10.0, -10.0),
        Align2::LEFT_BOTTOM,
        status,
        FontId::monospace(12.0),
        color,
    );
}

fn view_controls(ui: &mut egui::Ui, rect: Rect, state: &mut EditorState, viewport: DVec2) {
    let area = Rect::from_min_size(rect.right_top() + egui::vec2(-120.0, 10.0), egui::vec2(110.0, 30.0));
    ui.allocate_ui_at_rect(area, |ui| {
        ui.horizontal(|ui| {
            let center = viewport * 0.5;
            if ui.small_button("+").on_hover_text("Zoom in").clicked() {
                state.camera.zoom_at(ZOOM_STEP, center, viewport);
            }
            if ui.small_button("−").on_hover_text("Zoom out").clicked() {
                state.camera.zoom_at(1.0 / ZOOM_STEP, center, viewport);
            }
            if ui.small_button("Fit").on_hover_text("Show all polygons").clicked() {
                let points: Vec<Vertex> = state
                    .store
                    .list()
                    .iter()
                    .flat_map(|p| p.points().iter().copied())
                    .collect();
                state.camera.fit(points, viewport, FIT_MARGIN_PX);
            }
        });
    });
}
