use bevy_egui::egui;

use crate::file::pick_export_folder;
use crate::model::{
    format_value, ExportKind, MenuAlignment, PackingAlgorithm, StateKind, Theme, MAX_SPRITESHEET_PADDING,
};
use crate::persist::Section;
use crate::state::{AppState, InspectorTab, Popup, DEFAULT_PANEL_MARGIN, MAX_UI_SCALE, MIN_UI_SCALE};
use crate::ui::widgets::{hex_color_edit, scaled_font, scaled_margin, tab_button};

pub fn render_inspector(ui: &mut egui::Ui, state: &mut AppState) {
    let ui_scale = state.config.ui_scale;
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = scaled_margin(2.0, ui_scale);
        for tab in InspectorTab::ALL {
            if tab_button(ui, state.inspector_tab == tab, tab.label(), ui_scale).clicked() {
                state.inspector_tab = tab;
            }
        }
    });
    ui.separator();

    egui::ScrollArea::vertical().show(ui, |ui| {
        egui::Frame::none()
            .inner_margin(scaled_margin(DEFAULT_PANEL_MARGIN, ui_scale))
            .show(ui, |ui| match state.inspector_tab {
                InspectorTab::Grid => render_grid_tab(ui, state),
                InspectorTab::Animation => render_animation_tab(ui, state),
                InspectorTab::Export => render_export_tab(ui, state),
                InspectorTab::Options => render_options_tab(ui, state),
            });
    });
}

/// Sections are hidden until their stored values have been read
fn section_ready(ui: &mut egui::Ui, state: &AppState, sections: &[Section]) -> bool {
    let ready = sections.iter().all(|section| state.persistence.is_loaded(*section));
    if !ready {
        ui.spinner();
    }
    ready
}

fn needs_image(ui: &mut egui::Ui, state: &AppState) -> bool {
    if state.studio.image().is_loaded() {
        return true;
    }
    ui.label(
        egui::RichText::new("Drop an image to get started.")
            .size(scaled_font(13.0, state.config.ui_scale))
            .color(egui::Color32::GRAY),
    );
    false
}

fn render_grid_tab(ui: &mut egui::Ui, state: &mut AppState) {
    if !section_ready(ui, state, &[Section::GridLayout, Section::GridAppearance]) || !needs_image(ui, state) {
        return;
    }

    ui.heading("Grid Layout");
    let layout = state.studio.grid().layout.clone();
    let (image_w, image_h) = (state.studio.image().width, state.studio.image().height);

    let mut width = layout.width;
    let mut height = layout.height;
    egui::Grid::new("grid_layout").num_columns(2).show(ui, |ui| {
        ui.label("Tile width:");
        if ui
            .add(egui::DragValue::new(&mut width).range(1..=image_w.max(1)).suffix(" px"))
            .changed()
        {
            if let Err(e) = state.studio.set_tile_width(width) {
                state.popup(Popup::warning(e.to_string()));
            }
        }
        ui.end_row();

        ui.label("Tile height:");
        if ui
            .add(egui::DragValue::new(&mut height).range(1..=image_h.max(1)).suffix(" px"))
            .changed()
        {
            if let Err(e) = state.studio.set_tile_height(height) {
                state.popup(Popup::warning(e.to_string()));
            }
        }
        ui.end_row();
    });
    let mut link = layout.link;
    if ui.checkbox(&mut link, "Link width and height").changed() {
        state.studio.set_link(link);
    }

    ui.add_space(scaled_margin(4.0, state.config.ui_scale));
    ui.horizontal(|ui| {
        let label = if state.studio.selector().has_grid() {
            "Recreate Grid"
        } else {
            "Create Grid"
        };
        if ui.button(label).clicked() {
            state.apply_grid(false);
        }
        if ui.button("Reset").on_hover_text("Restore the default grid").clicked() {
            state.studio.reset(StateKind::Grid);
        }
    });
    if state.studio.selector().has_grid() {
        let layout = &state.studio.grid().layout;
        ui.label(format!(
            "{} x {} tiles of {}x{}",
            layout.columns(),
            layout.rows(),
            layout.prev_width,
            layout.prev_height
        ));
        ui.horizontal(|ui| {
            if ui.button("Select All").clicked() {
                state.studio.select_all();
            }
            if ui.button("Deselect All").clicked() {
                state.studio.deselect_all();
            }
        });
    }

    ui.separator();
    ui.heading("Grid Appearance");
    let mut appearance = state.studio.grid().appearance.clone();
    let mut changed = ui.checkbox(&mut appearance.visible, "Visible").changed();
    egui::Grid::new("grid_appearance").num_columns(2).show(ui, |ui| {
        ui.label("Color:");
        changed |= hex_color_edit(ui, &mut appearance.color);
        ui.end_row();

        ui.label("Opacity:");
        changed |= ui.add(egui::Slider::new(&mut appearance.opacity, 0.0..=1.0)).changed();
        ui.end_row();

        ui.label("Thickness:");
        changed |= ui
            .add(egui::Slider::new(&mut appearance.line_thickness, 0.1..=5.0))
            .changed();
        ui.end_row();
    });
    if changed {
        state.studio.set_grid_appearance(appearance);
    }
}

fn render_animation_tab(ui: &mut egui::Ui, state: &mut AppState) {
    if !section_ready(ui, state, &[Section::AnimationControls]) || !needs_image(ui, state) {
        return;
    }

    ui.heading("Animation");
    let controls = state.studio.controls().clone();

    let mut looping = controls.looping;
    if ui.checkbox(&mut looping, "Loop").changed() {
        state.studio.set_looping(looping);
    }

    let mut duration = controls.duration_ms;
    let mut fps = controls.frame_rate;
    egui::Grid::new("animation_timing").num_columns(2).show(ui, |ui| {
        ui.label("Frame duration:");
        let response = ui.add(
            egui::DragValue::new(&mut duration)
                .speed(1.0)
                .range(1.0..=10_000.0)
                .suffix(" ms"),
        );
        if response.changed() {
            if let Err(e) = state.studio.set_duration_ms(format_value(duration, 2)) {
                state.popup(Popup::warning(e.to_string()));
            }
        }
        ui.end_row();

        ui.label("Frame rate:");
        let response = ui.add(
            egui::DragValue::new(&mut fps)
                .speed(0.1)
                .range(0.1..=1000.0)
                .suffix(" fps"),
        );
        if response.changed() {
            if let Err(e) = state.studio.set_frame_rate(format_value(fps, 2)) {
                state.popup(Popup::warning(e.to_string()));
            }
        }
        ui.end_row();
    });

    ui.add_space(scaled_margin(4.0, state.config.ui_scale));
    let has_frames = !state.studio.frames().is_empty();
    ui.add_enabled_ui(has_frames, |ui| {
        ui.horizontal(|ui| {
            let play_text = if state.studio.is_playing() { "Pause" } else { "Play" };
            if ui.button(play_text).clicked() {
                state.studio.toggle_play();
            }
            if ui.button("Restart").clicked() {
                state.studio.restart();
            }
        });
    });
    if ui.checkbox(&mut state.show_preview, "Show preview window").changed() && state.show_preview {
        state.set_status("Preview shown");
    }
    if ui.button("Reset").on_hover_text("Restore the default timing").clicked() {
        state.studio.reset(StateKind::AnimationControls);
    }
}

fn render_export_tab(ui: &mut egui::Ui, state: &mut AppState) {
    if !needs_image(ui, state) {
        return;
    }

    ui.heading("Export");
    let mut export = state.studio.export_config().clone();
    let mut changed = false;

    egui::Grid::new("export_options").num_columns(2).show(ui, |ui| {
        ui.label("Format:");
        egui::ComboBox::from_id_salt("export_kind")
            .selected_text(export.kind.label())
            .show_ui(ui, |ui| {
                for kind in ExportKind::ALL {
                    changed |= ui.selectable_value(&mut export.kind, kind, kind.label()).changed();
                }
            });
        ui.end_row();

        ui.label("File name:");
        changed |= ui.text_edit_singleline(&mut export.file_name).changed();
        ui.end_row();

        if export.kind != ExportKind::PngSequence {
            ui.label("Name tags:");
            changed |= ui
                .text_edit_singleline(&mut export.name_tags)
                .on_hover_text("{w}, {h} and {fps} are replaced when exporting")
                .changed();
            ui.end_row();
        }

        if export.kind == ExportKind::SpriteSheet {
            ui.label("Packing:");
            egui::ComboBox::from_id_salt("packing_algorithm")
                .selected_text(export.sprite_sheet.algorithm.label())
                .show_ui(ui, |ui| {
                    for algorithm in PackingAlgorithm::ALL {
                        changed |= ui
                            .selectable_value(&mut export.sprite_sheet.algorithm, algorithm, algorithm.label())
                            .changed();
                    }
                });
            ui.end_row();

            ui.label("Padding:");
            changed |= ui
                .add(
                    egui::DragValue::new(&mut export.sprite_sheet.padding)
                        .range(0..=MAX_SPRITESHEET_PADDING)
                        .suffix(" px"),
                )
                .changed();
            ui.end_row();
        }
    });
    if changed {
        state.studio.set_export_config(export);
    }

    ui.add_space(scaled_margin(4.0, state.config.ui_scale));
    ui.label("Folder:");
    ui.horizontal(|ui| {
        let hint = state.export_target_dir().display().to_string();
        ui.add(egui::TextEdit::singleline(&mut state.export_dir).hint_text(hint));
        if ui.button("...").on_hover_text("Choose folder").clicked() {
            if let Some(dir) = pick_export_folder() {
                state.export_dir = dir.to_string_lossy().to_string();
            }
        }
    });

    if state.studio.export_config().kind == ExportKind::Gif {
        ui.horizontal(|ui| {
            ui.label("ffmpeg:");
            if ui.text_edit_singleline(&mut state.config.ffmpeg_path).lost_focus() {
                state.config.save();
            }
        });
    }

    ui.add_space(scaled_margin(8.0, state.config.ui_scale));
    let frame_count = state.studio.frames().len();
    let export_button = egui::Button::new(
        egui::RichText::new(format!("Export {frame_count} frames")).size(scaled_font(15.0, state.config.ui_scale)),
    );
    let idle = !state.exports.is_running();
    if ui.add_enabled(frame_count > 0 && idle, export_button).clicked() {
        state.export();
    }
}

fn render_options_tab(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Remember");
    let mut remember = state.studio.remember().clone();
    let mut changed = ui.checkbox(&mut remember.grid, "Grid").changed();
    changed |= ui.checkbox(&mut remember.viewport, "Viewport camera").changed();
    changed |= ui.checkbox(&mut remember.preview, "Preview camera").changed();
    changed |= ui.checkbox(&mut remember.frames, "Frames").changed();
    ui.add_enabled_ui(remember.frames, |ui| {
        changed |= ui
            .checkbox(&mut remember.same_file_name_only, "Only for the same file name")
            .changed();
    });
    if changed {
        state.studio.set_remember(remember);
    }

    ui.separator();
    ui.heading("Clear");
    let mut clear = state.studio.clear_options().clone();
    let mut changed = ui.checkbox(&mut clear.viewport, "Image and viewport").changed();
    changed |= ui.checkbox(&mut clear.frames, "Frames").changed();
    if changed {
        state.studio.set_clear_options(clear);
    }
    if ui.button("Clear").clicked() {
        state.clear();
    }

    ui.separator();
    if !section_ready(ui, state, &[Section::Settings, Section::MenuAlignment]) {
        return;
    }
    ui.heading("Settings");
    let mut settings = state.studio.settings().clone();
    let mut changed = false;
    egui::Grid::new("settings").num_columns(2).show(ui, |ui| {
        ui.label("Theme:");
        egui::ComboBox::from_id_salt("theme")
            .selected_text(settings.theme.label())
            .show_ui(ui, |ui| {
                for theme in Theme::ALL {
                    changed |= ui.selectable_value(&mut settings.theme, theme, theme.label()).changed();
                }
            });
        ui.end_row();

        ui.label("Pixelated:");
        changed |= ui.checkbox(&mut settings.rendering.pixelated, "").changed();
        ui.end_row();

        ui.label("Viewport background:");
        changed |= hex_color_edit(ui, &mut settings.viewport.background_color);
        ui.end_row();

        ui.label("Frames background:");
        changed |= hex_color_edit(ui, &mut settings.frames_collection.background_color);
        ui.end_row();

        ui.label("Preview background:");
        changed |= hex_color_edit(ui, &mut settings.preview.background_color);
        ui.end_row();

        ui.label("Preview opacity:");
        changed |= ui
            .add(egui::Slider::new(&mut settings.preview.background_opacity, 0.0..=1.0))
            .changed();
        ui.end_row();

        ui.label("Preview border:");
        changed |= hex_color_edit(ui, &mut settings.preview.border_color);
        ui.end_row();

        ui.label("Border width:");
        changed |= ui
            .add(egui::Slider::new(&mut settings.preview.border_width, 0.0..=8.0))
            .changed();
        ui.end_row();

        ui.label("Menu position:");
        let mut align = state.studio.menu_alignment();
        egui::ComboBox::from_id_salt("menu_alignment")
            .selected_text(align.label())
            .show_ui(ui, |ui| {
                for option in MenuAlignment::ALL {
                    ui.selectable_value(&mut align, option, option.label());
                }
            });
        if align != state.studio.menu_alignment() {
            state.studio.set_menu_alignment(align);
        }
        ui.end_row();

        ui.label("UI scale:");
        if ui
            .add(egui::Slider::new(&mut state.config.ui_scale, MIN_UI_SCALE..=MAX_UI_SCALE).step_by(0.25))
            .drag_stopped()
        {
            state.config.save();
        }
        ui.end_row();
    });
    if changed {
        state.studio.set_settings(settings);
    }
    ui.horizontal(|ui| {
        if ui.button("Reset Settings").clicked() {
            state.studio.reset(StateKind::Settings);
        }
        if ui.button("Reset Cameras").clicked() {
            state.studio.reset(StateKind::Viewport);
            state.studio.reset(StateKind::Preview);
            state.needs_zoom_fit = true;
        }
    });
}
