use bevy_egui::egui;

use crate::imaging::{calculate_fit_scale, rgba_to_texture};
use crate::state::AppState;
use crate::ui::widgets::{hex_to_color32, scaled_font, scaled_margin};

/// Cached texture of the frame at `index`
pub fn frame_texture(ctx: &egui::Context, state: &mut AppState, index: usize) -> Option<egui::TextureHandle> {
    let frame = state.studio.frames().get(index)?;
    let id = frame.id;
    if let Some(texture) = state.frame_textures.get(&id) {
        return Some(texture.clone());
    }
    let pixelated = state.studio.settings().rendering.pixelated;
    let texture = rgba_to_texture(ctx, &format!("frame_{id}"), &frame.image, pixelated);
    state.frame_textures.insert(id, texture.clone());
    Some(texture)
}

/// Horizontal list of frame thumbnails in selection order
pub fn render_frames_strip(ctx: &egui::Context, state: &mut AppState) {
    let ui_scale = state.config.ui_scale;
    let thumb_size = scaled_margin(64.0, ui_scale);
    let background = hex_to_color32(&state.studio.settings().frames_collection.background_color, 1.0);

    egui::TopBottomPanel::bottom("frames_strip")
        .exact_height(thumb_size + scaled_margin(48.0, ui_scale))
        .frame(egui::Frame::side_top_panel(&ctx.style()).fill(background))
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Frames");
                ui.separator();
                let count = state.studio.frames().len();
                ui.label(format!("{count} selected"));
                if count > 0 && ui.small_button("Deselect All").clicked() {
                    state.studio.deselect_all();
                }
            });

            let count = state.studio.frames().len();
            if count == 0 {
                ui.label(
                    egui::RichText::new("Ctrl+click grid cells or Shift+drag an area to add frames.")
                        .size(scaled_font(13.0, ui_scale))
                        .color(egui::Color32::GRAY),
                );
                return;
            }

            let active = state.studio.frames().active_index();
            let mut clicked = None;
            egui::ScrollArea::horizontal().show(ui, |ui| {
                ui.horizontal(|ui| {
                    for index in 0..count {
                        let Some(texture) = frame_texture(ui.ctx(), state, index) else {
                            continue;
                        };
                        let (rect, response) =
                            ui.allocate_exact_size(egui::vec2(thumb_size, thumb_size), egui::Sense::click());
                        draw_thumbnail(ui.painter(), &texture, rect, active == Some(index));
                        ui.painter().text(
                            rect.min + egui::vec2(3.0, 2.0),
                            egui::Align2::LEFT_TOP,
                            index.to_string(),
                            egui::FontId::proportional(scaled_font(11.0, ui_scale)),
                            egui::Color32::WHITE,
                        );
                        if response.on_hover_text(format!("Frame {index}")).clicked() {
                            clicked = Some(index);
                        }
                    }
                });
            });
            if let Some(index) = clicked {
                state.studio.click_frame(index);
            }
        });
}

fn draw_thumbnail(painter: &egui::Painter, texture: &egui::TextureHandle, rect: egui::Rect, active: bool) {
    painter.rect_filled(rect, 2.0, egui::Color32::from_gray(30));
    let [w, h] = texture.size();
    let scale = calculate_fit_scale((w as u32, h as u32), (rect.width() as u32, rect.height() as u32));
    let image_rect = egui::Rect::from_center_size(rect.center(), egui::vec2(w as f32, h as f32) * scale);
    painter.image(
        texture.id(),
        image_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );
    let stroke = if active {
        egui::Stroke::new(2.0, egui::Color32::from_rgb(255, 200, 60))
    } else {
        egui::Stroke::new(1.0, egui::Color32::from_gray(80))
    };
    painter.rect_stroke(rect, 2.0, stroke);
}
