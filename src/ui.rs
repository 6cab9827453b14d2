// src/ui.rs
use egui::{Align2, Color32, Key, RichText};
use map_polygon_editor::engine_lib::{ListAction, ListPanel, SurfaceEvent};

use crate::editor_state::EditorState;
use crate::rendering_lib::map_painter::show_map;

pub fn build_ui(ctx: &egui::Context, state: &mut EditorState) {
    handle_shortcuts(ctx, state);

    egui::SidePanel::left("polygon_sidebar")
        .resizable(true)
        .default_width(320.0)
        .show(ctx, |ui| {
            header(ui, ctx, state);
            ui.separator();
            egui::ScrollArea::vertical().show(ui, |ui| {
                stats_panel(ui, state);
                ui.add_space(8.0);
                ui.label(
                    RichText::new(
                        "Click points on the map one after another to draw a polygon. \
                         Press \"Confirm\" to close it.",
                    )
                    .small()
                    .weak(),
                );
                ui.add_space(8.0);
                draw_toolbar(ui, state);
                ui.separator();
                polygon_list(ui, state);
            });
        });

    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| show_map(ui, state));

    notice_area(ctx, state);
}

fn handle_shortcuts(ctx: &egui::Context, state: &mut EditorState) {
    if ctx.wants_keyboard_input() {
        return;
    }
    if ctx.input(|input| input.key_pressed(Key::Enter)) {
        state.dispatch(SurfaceEvent::Confirm);
    }
    if ctx.input(|input| input.key_pressed(Key::Escape)) {
        state.dispatch(SurfaceEvent::CancelDraw);
    }
    if ctx.input(|input| input.key_pressed(Key::Backspace)) {
        state.dispatch(SurfaceEvent::UndoPoint);
    }
    if !state.surface.is_drawing() && ctx.input(|input| input.key_pressed(Key::Delete)) {
        state.delete_selected();
    }
}

fn header(ui: &mut egui::Ui, ctx: &egui::Context, state: &mut EditorState) {
    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.heading("Maps");
            ui.label(RichText::new("Draw and manage polygons").weak());
        });
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let icon = if state.preferences.dark_mode { "☀" } else { "🌙" };
            if ui.button(icon).on_hover_text("Toggle dark mode").clicked() {
                state.toggle_dark_mode(ctx);
            }
        });
    });
}

fn stats_panel(ui: &mut egui::Ui, state: &mut EditorState) {
    let stats = state.stats().clone();
    let largest = stats
        .largest
        .as_ref()
        .and_then(|id| state.store.get(id))
        .map(|p| p.name.clone());

    egui::Grid::new("polygon_stats").num_columns(2).striped(true).show(ui, |ui| {
        ui.label("Polygons");
        ui.strong(stats.count.to_string());
        ui.end_row();
        ui.label("Total area");
        ui.strong(format!("{:.2}", stats.total_area));
        ui.end_row();
        ui.label("Total perimeter");
        ui.strong(format!("{:.2}", stats.total_perimeter));
        ui.end_row();
        ui.label("Average area");
        ui.strong(format!("{:.2}", stats.average_area()));
        ui.end_row();
        if let Some(name) = largest {
            ui.label("Largest");
            ui.strong(name);
            ui.end_row();
        }
    });
}

fn draw_toolbar(ui: &mut egui::Ui, state: &mut EditorState) {
    let drawing = state.surface.is_drawing();
    ui.horizontal_wrapped(|ui| {
        if ui.add_enabled(!drawing, egui::Button::new("✏ Draw")).clicked() {
            state.dispatch(SurfaceEvent::StartDraw);
        }
        let can_commit = state.surface.drawing().can_commit();
        if ui
            .add_enabled(drawing, egui::Button::new("✔ Confirm"))
            .on_disabled_hover_text("Start drawing first")
            .clicked()
        {
            state.dispatch(SurfaceEvent::Confirm);
        }
        if ui.add_enabled(drawing, egui::Button::new("↶ Undo point")).clicked() {
            state.dispatch(SurfaceEvent::UndoPoint);
        }
        if ui.add_enabled(drawing, egui::Button::new("✖ Cancel")).clicked() {
            state.dispatch(SurfaceEvent::CancelDraw);
        }
        if drawing && !can_commit {
            ui.label(RichText::new("Place at least 3 points").small().weak());
        }
    });
    if let Some(hint) = &state.hint {
        ui.label(RichText::new(hint).small().color(Color32::from_rgb(200, 140, 40)));
    }
}

fn polygon_list(ui: &mut egui::Ui, state: &mut EditorState) {
    let entries = ListPanel::entries(&state.snapshot());
    ui.label(RichText::new(format!("Polygons ({})", entries.len())).strong());
    if entries.is_empty() {
        ui.label(RichText::new("No polygons yet").weak());
        return;
    }

    let drawing = state.surface.is_drawing();
    let mut actions = Vec::new();
    for entry in &entries {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                let editing = state.renaming.as_ref().is_some_and(|(id, _)| *id == entry.id);
                if editing {
                    let mut commit = false;
                    let mut cancel = false;
                    if let Some((_, buffer)) = state.renaming.as_mut() {
                        let response = ui.text_edit_singleline(buffer);
                        if response.lost_focus() {
                            cancel = ui.input(|i| i.key_pressed(Key::Escape));
                            commit = !cancel;
                        } else if !response.has_focus() {
                            response.request_focus();
                        }
                    }
                    if ui.small_button("✔").clicked() {
                        commit = true;
                    }
                    if commit {
                        if let Some((id, name)) = state.renaming.take() {
                            if !name.trim().is_empty() {
                                actions.push(ListAction::Rename(id, name));
                            }
                        }
                    } else if cancel {
                        state.renaming = None;
                    }
                } else {
                    let label = ui
                        .add_enabled(
                            !drawing,
                            egui::SelectableLabel::new(entry.selected, entry.name.as_str()),
                        )
                        .on_disabled_hover_text("Finish or cancel the drawing first");
                    if label.clicked() {
                        actions.push(ListAction::Select(entry.id.clone()));
                    }
                    if label.double_clicked() {
                        state.renaming = Some((entry.id.clone(), entry.name.clone()));
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                        actions.push(ListAction::Delete(entry.id.clone()));
                    }
                    if !editing && ui.small_button("✏").on_hover_text("Rename").clicked() {
                        state.renaming = Some((entry.id.clone(), entry.name.clone()));
                    }
                });
            });
            ui.label(
                RichText::new(format!(
                    "{} points · area {:.2} · perimeter {:.2}",
                    entry.vertex_count, entry.area, entry.perimeter
                ))
                .small()
                .weak(),
            );
            ui.label(
                RichText::new(entry.created_at.format("%Y-%m-%d %H:%M").to_string())
                    .small()
                    .weak(),
            );
        });
    }

    for action in actions {
        state.apply(action);
    }
}

fn notice_area(ctx: &egui::Context, state: &mut EditorState) {
    let Some(notice) = state.notice.clone() else {
        return;
    };
    egui::Area::new(egui::Id::new("store_notice"))
        .anchor(Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_max_width(320.0);
                ui.label(notice.text.as_str());
                ui.horizontal(|ui| {
                    if notice.retry_save && ui.button("Retry save").clicked() {
                        state.retry_save();
                    }
                    if ui.button("Dismiss").clicked() {
                        state.notice = None;
                    }
                });
            });
        });
}
