use bevy_egui::egui;

use crate::model::Pan;
use crate::state::AppState;
use crate::ui::frames_strip::frame_texture;
use crate::ui::widgets::{format_zoom, hex_to_color32, scaled_margin};

const MIN_PREVIEW_ZOOM: f32 = 0.25;
const MAX_PREVIEW_ZOOM: f32 = 32.0;

/// Floating window playing the frames
pub fn render_preview(ctx: &egui::Context, state: &mut AppState) {
    if !state.show_preview || !state.studio.image().is_loaded() {
        return;
    }
    let ui_scale = state.config.ui_scale;
    let mut open = true;
    egui::Window::new("Preview")
        .open(&mut open)
        .default_size(egui::vec2(scaled_margin(260.0, ui_scale), scaled_margin(300.0, ui_scale)))
        .anchor(egui::Align2::LEFT_TOP, [scaled_margin(12.0, ui_scale), scaled_margin(40.0, ui_scale)])
        .resizable(true)
        .show(ctx, |ui| {
            render_controls(ui, state);
            ui.separator();
            render_stage(ui, state);
        });
    state.show_preview = open;
}

fn render_controls(ui: &mut egui::Ui, state: &mut AppState) {
    let frame_count = state.studio.frames().len();
    let playing = state.studio.is_playing();
    ui.horizontal(|ui| {
        ui.add_enabled_ui(frame_count > 0, |ui| {
            let (play_text, play_tooltip) = if playing {
                ("⏸", "Pause (Space)")
            } else {
                ("▶", "Play (Space)")
            };
            if ui.button(play_text).on_hover_text(play_tooltip).clicked() {
                state.studio.toggle_play();
            }
            if ui.button("⏮").on_hover_text("Restart").clicked() {
                state.studio.restart();
            }
            ui.add_enabled_ui(!playing, |ui| {
                if ui.button("◀").on_hover_text("Previous frame (Left)").clicked() {
                    state.studio.step_frame(false);
                }
                if ui.button("▶|").on_hover_text("Next frame (Right)").clicked() {
                    state.studio.step_frame(true);
                }
            });
        });
        let mut looping = state.studio.controls().looping;
        if ui.checkbox(&mut looping, "Loop").changed() {
            state.studio.set_looping(looping);
        }
    });
    let preview = state.studio.preview();
    let current = if frame_count == 0 { 0 } else { preview.active_frame_index + 1 };
    ui.label(format!(
        "Frame: {} / {}   {}",
        current,
        preview.total_frames,
        format_zoom(preview.zoom)
    ));
}

fn render_stage(ui: &mut egui::Ui, state: &mut AppState) {
    let style = state.studio.settings().preview.clone();
    let available = ui.available_size().max(egui::vec2(32.0, 32.0));
    let (response, painter) = ui.allocate_painter(available, egui::Sense::click_and_drag());

    painter.rect_filled(
        response.rect,
        0.0,
        hex_to_color32(&style.background_color, style.background_opacity),
    );

    let index = state.studio.preview().active_frame_index;
    let zoom = state.studio.preview().zoom;
    let pan = state.studio.preview().pan;
    if let Some(texture) = frame_texture(ui.ctx(), state, index) {
        let [w, h] = texture.size();
        let size = egui::vec2(w as f32, h as f32) * zoom / ui.ctx().pixels_per_point();
        let center = response.rect.center() + egui::vec2(pan.x, pan.y);
        let rect = egui::Rect::from_center_size(center, size);
        let clipped = painter.with_clip_rect(response.rect);
        clipped.image(
            texture.id(),
            rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
        if style.border_width > 0.0 {
            clipped.rect_stroke(
                rect,
                0.0,
                egui::Stroke::new(style.border_width, hex_to_color32(&style.border_color, 1.0)),
            );
        }
    } else {
        painter.text(
            response.rect.center(),
            egui::Align2::CENTER_CENTER,
            "No frames",
            egui::FontId::proportional(14.0),
            egui::Color32::GRAY,
        );
    }

    // Drag pans, wheel zooms; the camera is saved as it changes
    if response.dragged() {
        let delta = response.drag_delta();
        state.studio.set_preview_camera(
            zoom,
            Pan {
                x: pan.x + delta.x,
                y: pan.y + delta.y,
            },
        );
    }
    if response.hovered() {
        let scroll = ui.input(|i| i.raw_scroll_delta.y);
        if scroll != 0.0 {
            let factor = if scroll > 0.0 { 2.0 } else { 0.5 };
            let new_zoom = (zoom * factor).clamp(MIN_PREVIEW_ZOOM, MAX_PREVIEW_ZOOM);
            if new_zoom != zoom {
                state.studio.set_preview_camera(new_zoom, pan);
            }
        }
    }
    if response.double_clicked() {
        state.studio.set_preview_camera(1.0, Pan::default());
    }
}
