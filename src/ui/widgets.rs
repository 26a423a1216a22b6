use bevy_egui::egui;

use crate::model::{parse_hex_color, to_hex_color, Theme};
use crate::state::ZOOM_LEVELS;

/// Format zoom level: integers show as "16x", fractional as "0.25x"
pub fn format_zoom(level: f32) -> String {
    if level.fract() == 0.0 {
        format!("{}x", level as i32)
    } else {
        format!("{}x", level)
    }
}

/// Calculate the best zoom level to fit the image in the available area
pub fn calculate_fit_zoom(image_size: (u32, u32), available: egui::Vec2, ppp: f32) -> f32 {
    if image_size.0 == 0 || image_size.1 == 0 {
        return 1.0;
    }
    // Account for some padding (90% of available space)
    let padded_w = available.x * 0.9;
    let padded_h = available.y * 0.9;

    let max_zoom_w = (padded_w * ppp) / image_size.0 as f32;
    let max_zoom_h = (padded_h * ppp) / image_size.1 as f32;
    let max_zoom = max_zoom_w.min(max_zoom_h);

    // Find the largest ZOOM_LEVEL that's <= max_zoom
    ZOOM_LEVELS
        .iter()
        .rev()
        .find(|&&level| level <= max_zoom)
        .copied()
        .unwrap_or(ZOOM_LEVELS[0])
}

/// Get a scaled font size with minimum of 12
pub fn scaled_font(base_size: f32, scale: f32) -> f32 {
    (base_size.max(12.0) * scale).max(12.0)
}

/// Get a scaled margin/spacing value
pub fn scaled_margin(base_size: f32, scale: f32) -> f32 {
    base_size * scale
}

/// Format a duration as a human-readable relative time string
pub fn format_relative_time(elapsed: std::time::Duration) -> String {
    let secs = elapsed.as_secs();

    if secs < 3 {
        "just now".to_string()
    } else if secs < 60 {
        format!("{} seconds ago", secs)
    } else if secs < 120 {
        "1 minute ago".to_string()
    } else if secs < 3600 {
        format!("{} minutes ago", secs / 60)
    } else if secs < 7200 {
        "1 hour ago".to_string()
    } else {
        format!("{} hours ago", secs / 3600)
    }
}

/// `#rrggbb` plus an opacity in 0..=1; unparsable colors render magenta
pub fn hex_to_color32(hex: &str, opacity: f32) -> egui::Color32 {
    let [r, g, b] = parse_hex_color(hex).unwrap_or([255, 0, 255]);
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(r, g, b, alpha)
}

/// Color swatch editing a `#rrggbb` string in place
pub fn hex_color_edit(ui: &mut egui::Ui, hex: &mut String) -> bool {
    let mut rgb = parse_hex_color(hex).unwrap_or([0, 0, 0]);
    let changed = ui.color_edit_button_srgb(&mut rgb).changed();
    if changed {
        *hex = to_hex_color(rgb);
    }
    changed
}

/// egui visuals for an interface theme
pub fn theme_visuals(theme: Theme) -> egui::Visuals {
    let accent = |visuals: &mut egui::Visuals, color: egui::Color32| {
        visuals.selection.bg_fill = color;
        visuals.hyperlink_color = color;
    };
    match theme {
        Theme::Light => egui::Visuals::light(),
        Theme::Default => egui::Visuals::dark(),
        Theme::Jetblack => {
            let mut visuals = egui::Visuals::dark();
            visuals.panel_fill = egui::Color32::from_gray(8);
            visuals.window_fill = egui::Color32::from_gray(14);
            visuals.extreme_bg_color = egui::Color32::BLACK;
            visuals
        }
        Theme::Iceberg => {
            let mut visuals = egui::Visuals::dark();
            visuals.panel_fill = egui::Color32::from_rgb(22, 24, 33);
            visuals.window_fill = egui::Color32::from_rgb(30, 33, 45);
            accent(&mut visuals, egui::Color32::from_rgb(84, 112, 160));
            visuals
        }
        Theme::Retro => {
            let mut visuals = egui::Visuals::dark();
            visuals.panel_fill = egui::Color32::from_rgb(40, 36, 44);
            visuals.window_fill = egui::Color32::from_rgb(48, 43, 52);
            accent(&mut visuals, egui::Color32::from_rgb(160, 110, 70));
            visuals
        }
        Theme::Translucent => {
            let mut visuals = egui::Visuals::dark();
            visuals.window_fill = egui::Color32::from_rgba_unmultiplied(27, 27, 27, 200);
            visuals.panel_fill = egui::Color32::from_rgba_unmultiplied(27, 27, 27, 230);
            visuals
        }
        Theme::Vivid => {
            let mut visuals = egui::Visuals::dark();
            accent(&mut visuals, egui::Color32::from_rgb(200, 40, 140));
            visuals.widgets.hovered.bg_fill = egui::Color32::from_rgb(60, 40, 110);
            visuals
        }
    }
}

/// Render a tab-style button that looks distinct from regular selectable labels
pub fn tab_button(
    ui: &mut egui::Ui,
    selected: bool,
    text: impl Into<String>,
    ui_scale: f32,
) -> egui::Response {
    let text = text.into();
    let padding = egui::vec2(scaled_margin(8.0, ui_scale), scaled_margin(4.0, ui_scale));

    let text_color = if selected {
        egui::Color32::WHITE
    } else {
        egui::Color32::from_gray(180)
    };

    let bg_color = if selected {
        ui.visuals().selection.bg_fill
    } else {
        egui::Color32::from_gray(50)
    };

    let galley = ui.painter().layout_no_wrap(
        text,
        egui::FontId::proportional(scaled_font(14.0, ui_scale)),
        text_color,
    );

    let tab_size = galley.size() + padding * 2.0;
    // Deselected tabs sit 2px lower, partially hidden below the separator
    let deselected_sink = 2.0;
    let desired_size = egui::vec2(tab_size.x, tab_size.y + 1.0);
    let (rect, response) = ui.allocate_exact_size(desired_size, egui::Sense::click());

    if ui.is_rect_visible(rect) {
        let y_offset = if selected { 0.0 } else { deselected_sink };
        let draw_rect = egui::Rect::from_min_size(rect.min + egui::vec2(0.0, y_offset), tab_size);

        let bg = if response.hovered() && !selected {
            egui::Color32::from_rgb(55, 65, 80)
        } else {
            bg_color
        };

        // Rounded top corners only
        ui.painter().rect_filled(
            draw_rect,
            egui::Rounding {
                nw: 4.0,
                ne: 4.0,
                sw: 0.0,
                se: 0.0,
            },
            bg,
        );
        ui.painter().galley(draw_rect.min + padding, galley, text_color);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_format_zoom() {
        assert_eq!(format_zoom(16.0), "16x");
        assert_eq!(format_zoom(0.25), "0.25x");
    }

    #[test]
    fn test_fit_zoom_picks_largest_level_that_fits() {
        // 256px image in a 1000px box at ppp 1: 900/256 = 3.5 -> 3x
        let zoom = calculate_fit_zoom((256, 256), egui::vec2(1000.0, 1000.0), 1.0);
        assert_eq!(zoom, 3.0);
        // Huge images fall back to the smallest level
        let zoom = calculate_fit_zoom((100_000, 100_000), egui::vec2(100.0, 100.0), 1.0);
        assert_eq!(zoom, ZOOM_LEVELS[0]);
    }

    #[test]
    fn test_relative_time() {
        assert_eq!(format_relative_time(Duration::from_secs(1)), "just now");
        assert_eq!(format_relative_time(Duration::from_secs(90)), "1 minute ago");
        assert_eq!(format_relative_time(Duration::from_secs(7300)), "2 hours ago");
    }

    #[test]
    fn test_hex_to_color32() {
        let color = hex_to_color32("#ccc4dd", 1.0);
        assert_eq!(color, egui::Color32::from_rgb(0xcc, 0xc4, 0xdd));
        assert_eq!(hex_to_color32("nope", 1.0), egui::Color32::from_rgb(255, 0, 255));
        assert_eq!(hex_to_color32("#000000", 0.0).a(), 0);
    }
}
