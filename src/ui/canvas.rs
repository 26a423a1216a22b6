use bevy_egui::egui;

use crate::grid::{Rect, SelectionModifiers};
use crate::imaging::rgba_to_texture;
use crate::state::AppState;
use crate::ui::widgets::{calculate_fit_zoom, format_zoom, hex_to_color32, scaled_font, scaled_margin};

const SELECTED_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(40, 70, 110, 90);
const SELECTED_STROKE: egui::Color32 = egui::Color32::from_rgb(100, 140, 200);
const ACTIVE_STROKE: egui::Color32 = egui::Color32::from_rgb(255, 200, 60);

/// Screen-space placement of the image inside the viewport
#[derive(Clone, Copy)]
struct ImageView {
    rect: egui::Rect,
    /// Points per image pixel
    scale: f32,
}

impl ImageView {
    fn to_screen(&self, bounds: &Rect) -> egui::Rect {
        egui::Rect::from_min_size(
            self.rect.min + egui::vec2(bounds.x, bounds.y) * self.scale,
            egui::vec2(bounds.width, bounds.height) * self.scale,
        )
    }

    fn to_image(&self, pos: egui::Pos2) -> (f32, f32) {
        let local = (pos - self.rect.min) / self.scale;
        (local.x, local.y)
    }
}

pub fn render_canvas(ui: &mut egui::Ui, state: &mut AppState) {
    let image = state.studio.image();
    if !image.is_loaded() {
        return;
    }
    let image_size = (image.width, image.height);
    let ui_scale = state.config.ui_scale;

    if state.source_texture.is_none() {
        let pixelated = state.studio.settings().rendering.pixelated;
        state.source_texture = state
            .studio
            .source()
            .map(|source| rgba_to_texture(ui.ctx(), "viewport_source", source, pixelated));
    }

    let available = ui.available_size();
    // Account for DPI scaling to get true 1:1 pixel rendering at zoom 1.0
    let ppp = ui.ctx().pixels_per_point();
    if state.needs_zoom_fit {
        state.set_zoom_level(calculate_fit_zoom(image_size, available, ppp));
        state.set_canvas_offset((0.0, 0.0));
        state.needs_zoom_fit = false;
    }
    let zoom_level = state.zoom_level();
    let effective_zoom = zoom_level / ppp;
    let image_w = image_size.0 as f32 * effective_zoom;
    let image_h = image_size.1 as f32 * effective_zoom;

    // Center the image with pan offset
    let (pan_x, pan_y) = state.canvas_offset();
    let offset_x = (available.x - image_w) / 2.0 + pan_x;
    let offset_y = (available.y - image_h) / 2.0 + pan_y;

    let (response, painter) = ui.allocate_painter(available, egui::Sense::click_and_drag());

    // Floor the origin in screen pixel space so image pixels land on pixel boundaries
    let origin = egui::pos2(
        ((response.rect.min.x + offset_x) * ppp).floor() / ppp,
        ((response.rect.min.y + offset_y) * ppp).floor() / ppp,
    );
    let view = ImageView {
        rect: egui::Rect::from_min_size(origin, egui::vec2(image_w, image_h)),
        scale: effective_zoom,
    };

    let settings = state.studio.settings();
    painter.rect_filled(response.rect, 0.0, hex_to_color32(&settings.viewport.background_color, 1.0));
    if let Some(texture) = &state.source_texture {
        painter.image(
            texture.id(),
            view.rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }

    draw_grid(&painter, state, view);
    draw_selection(&painter, state, view, ui_scale);

    // Fit/Center button in top-right corner
    let button_size = scaled_margin(24.0, ui_scale);
    let button_margin = scaled_margin(8.0, ui_scale);
    let button_rect = egui::Rect::from_min_size(
        egui::pos2(
            response.rect.max.x - button_size - button_margin,
            response.rect.min.y + button_margin,
        ),
        egui::vec2(button_size, button_size),
    );
    let fit_button = ui.put(
        button_rect,
        egui::Button::new(egui::RichText::new("⊙").size(scaled_font(16.0, ui_scale)))
            .min_size(egui::vec2(button_size, button_size)),
    );
    if fit_button.on_hover_text("Fit image to view and center").clicked() {
        state.needs_zoom_fit = true;
    }

    // Zoom readout at bottom left
    painter.text(
        egui::pos2(
            response.rect.min.x + button_margin,
            response.rect.max.y - button_margin,
        ),
        egui::Align2::LEFT_BOTTOM,
        format!("{}x{} @ {}", image_size.0, image_size.1, format_zoom(zoom_level)),
        egui::FontId::proportional(scaled_font(12.0, ui_scale)),
        egui::Color32::from_gray(200),
    );

    let is_panning = handle_panning(ui, state, &response, available);
    if !is_panning {
        handle_selection(ui, state, &response, view);
    }
    handle_zoom(ui, state, &response, view, available, image_size, ppp);
}

fn draw_grid(painter: &egui::Painter, state: &AppState, view: ImageView) {
    let appearance = &state.studio.grid().appearance;
    if !appearance.visible || !state.studio.selector().has_grid() {
        return;
    }
    let stroke = egui::Stroke::new(
        appearance.line_thickness,
        hex_to_color32(&appearance.color, appearance.opacity),
    );
    let lines = state.studio.grid_lines();
    for x in lines.vertical {
        let sx = view.rect.min.x + x * view.scale;
        painter.line_segment([egui::pos2(sx, view.rect.min.y), egui::pos2(sx, view.rect.max.y)], stroke);
    }
    for y in lines.horizontal {
        let sy = view.rect.min.y + y * view.scale;
        painter.line_segment([egui::pos2(view.rect.min.x, sy), egui::pos2(view.rect.max.x, sy)], stroke);
    }
    painter.rect_stroke(view.rect, 0.0, stroke);
}

fn draw_selection(painter: &egui::Painter, state: &AppState, view: ImageView, ui_scale: f32) {
    let selector = state.studio.selector();
    let active = state.studio.active_hit_box();
    let font = egui::FontId::proportional(scaled_font(11.0, ui_scale));

    for (index, hit_box) in selector.selected_hit_boxes().iter().enumerate() {
        let rect = view.to_screen(&hit_box.bounds);
        painter.rect_filled(rect, 0.0, SELECTED_FILL);
        let stroke = if active == Some(hit_box.id) {
            egui::Stroke::new(2.0, ACTIVE_STROKE)
        } else {
            egui::Stroke::new(1.0, SELECTED_STROKE)
        };
        painter.rect_stroke(rect.shrink(0.5), 0.0, stroke);
        // Frame number, only when there is room for it
        if rect.width() > 16.0 && rect.height() > 12.0 {
            painter.text(
                rect.min + egui::vec2(3.0, 2.0),
                egui::Align2::LEFT_TOP,
                index.to_string(),
                font.clone(),
                egui::Color32::WHITE,
            );
        }
    }

    if let Some(drag) = selector.drag_rect() {
        let rect = view.to_screen(&drag);
        painter.rect_filled(rect, 0.0, egui::Color32::from_rgba_unmultiplied(255, 255, 255, 24));
        painter.rect_stroke(rect, 0.0, egui::Stroke::new(1.0, egui::Color32::WHITE));
    }
}

/// Middle mouse drag pans. Returns whether a pan is in progress.
fn handle_panning(ui: &egui::Ui, state: &mut AppState, response: &egui::Response, available: egui::Vec2) -> bool {
    let is_panning = ui.input(|i| i.pointer.middle_down());

    // Track whether panning started inside the canvas
    if is_panning && !state.is_panning {
        state.pan_started_in_canvas = ui
            .input(|i| i.pointer.hover_pos())
            .is_some_and(|pos| response.rect.contains(pos));
    } else if !is_panning {
        state.pan_started_in_canvas = false;
    }
    state.is_panning = is_panning;

    if !(is_panning && state.pan_started_in_canvas) {
        return false;
    }
    ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);

    let delta = response.drag_delta();
    let (x, y) = state.canvas_offset();
    state.set_canvas_offset(clamp_offset((x + delta.x, y + delta.y), available));
    true
}

/// Ctrl-click toggles, shift-drag toggles an area, holding Z re-activates a frame
fn handle_selection(ui: &egui::Ui, state: &mut AppState, response: &egui::Response, view: ImageView) {
    if !state.studio.selector().has_grid() {
        return;
    }
    let (pressed, down, released, pos, modifiers) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_down(),
            i.pointer.primary_released(),
            i.pointer.interact_pos(),
            SelectionModifiers {
                ctrl: i.modifiers.command,
                shift: i.modifiers.shift,
                activate: i.key_down(egui::Key::Z),
            },
        )
    });
    let Some(pos) = pos else {
        return;
    };
    let point = view.to_image(pos);

    if pressed && response.hovered() {
        state.studio.pointer_down(point, modifiers);
    } else if down {
        state.studio.pointer_move(point, modifiers);
    }
    if released {
        state.studio.pointer_up(modifiers);
    }
    if modifiers.shift && state.studio.selector().drag_rect().is_some() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
    }
}

/// Mouse wheel zooms towards the cursor
fn handle_zoom(
    ui: &egui::Ui,
    state: &mut AppState,
    response: &egui::Response,
    view: ImageView,
    available: egui::Vec2,
    image_size: (u32, u32),
    ppp: f32,
) {
    if !response.hovered() {
        return;
    }
    let scroll_delta = ui.input(|i| i.raw_scroll_delta.y);
    if scroll_delta == 0.0 {
        return;
    }
    let Some(mouse_pos) = ui.input(|i| i.pointer.hover_pos()) else {
        return;
    };
    // Image coordinate under the mouse before zoom
    let (image_x, image_y) = view.to_image(mouse_pos);

    let old_zoom_level = state.zoom_level();
    if scroll_delta > 0.0 {
        state.zoom_in();
    } else {
        state.zoom_out();
    }
    let new_zoom_level = state.zoom_level();
    if new_zoom_level == old_zoom_level {
        return;
    }

    // Keep the same image coordinate under the mouse
    let new_effective_zoom = new_zoom_level / ppp;
    let new_w = image_size.0 as f32 * new_effective_zoom;
    let new_h = image_size.1 as f32 * new_effective_zoom;
    let mouse_rel = mouse_pos - response.rect.min;
    let offset = (
        mouse_rel.x - image_x * new_effective_zoom - (available.x - new_w) / 2.0,
        mouse_rel.y - image_y * new_effective_zoom - (available.y - new_h) / 2.0,
    );
    state.set_canvas_offset(clamp_offset(offset, available));
}

/// Keep the image center within the viewport
fn clamp_offset(offset: (f32, f32), available: egui::Vec2) -> (f32, f32) {
    let max_offset_x = available.x * 0.5;
    let max_offset_y = available.y * 0.5;
    (
        offset.0.clamp(-max_offset_x, max_offset_x),
        offset.1.clamp(-max_offset_y, max_offset_y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_view_maps_both_ways() {
        let view = ImageView {
            rect: egui::Rect::from_min_size(egui::pos2(100.0, 50.0), egui::vec2(256.0, 256.0)),
            scale: 4.0,
        };
        assert_eq!(view.to_image(egui::pos2(108.0, 54.0)), (2.0, 1.0));
        let screen = view.to_screen(&Rect::new(8.0, 8.0, 8.0, 8.0));
        assert_eq!(screen.min, egui::pos2(132.0, 82.0));
        assert_eq!(screen.width(), 32.0);
    }

    #[test]
    fn test_offset_is_clamped_to_half_viewport() {
        let clamped = clamp_offset((500.0, -500.0), egui::vec2(400.0, 200.0));
        assert_eq!(clamped, (200.0, -100.0));
    }
}
