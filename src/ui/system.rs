use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use std::path::PathBuf;

use crate::file::pick_image_file;
use crate::model::MenuAlignment;
use crate::state::{AppState, DEFAULT_PANEL_MARGIN};
use crate::ui::canvas::render_canvas;
use crate::ui::dialogs::render_dialogs;
use crate::ui::frames_strip::render_frames_strip;
use crate::ui::inspector::render_inspector;
use crate::ui::preview::render_preview;
use crate::ui::widgets::{format_relative_time, format_zoom, scaled_font, scaled_margin, theme_visuals};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Collect the files dropped on the window this frame
pub fn file_drop_system(mut events: EventReader<FileDragAndDrop>, mut state: ResMut<AppState>) {
    let paths: Vec<PathBuf> = events
        .read()
        .filter_map(|event| match event {
            FileDragAndDrop::DroppedFile { path_buf, .. } => Some(path_buf.clone()),
            _ => None,
        })
        .collect();
    if !paths.is_empty() {
        state.open_dropped(paths);
    }
}

pub fn ui_system(mut contexts: EguiContexts, mut state: ResMut<AppState>, time: Res<Time>) {
    let ctx = contexts.ctx_mut();

    apply_style(ctx, &state);
    handle_scale_shortcuts(ctx, &mut state);

    // Background work and playback
    state.process_persistence();
    state.studio.tick(time.delta_secs_f64());
    state.poll_exports();
    state.poll_watcher();
    state.drain_studio_events();
    if state.studio.is_playing() {
        ctx.request_repaint();
    }

    handle_shortcuts(ctx, &mut state);

    // Dialogs (rendered first so they appear on top)
    render_dialogs(ctx, &mut state);

    render_menu_bar(ctx, &mut state);
    render_status_bar(ctx, &state);

    // Limit panel widths to ensure at least 25% of screen remains for the viewport
    let ui_scale = state.config.ui_scale;
    let max_panel_width = ctx.screen_rect().width() * 0.375;
    match state.studio.menu_alignment() {
        MenuAlignment::Left => {
            egui::SidePanel::left("inspector")
                .default_width(scaled_margin(300.0, ui_scale))
                .min_width(scaled_margin(220.0, ui_scale))
                .max_width(max_panel_width)
                .resizable(true)
                .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(0.0))
                .show(ctx, |ui| render_inspector(ui, &mut state));
        }
        MenuAlignment::Right => {
            egui::SidePanel::right("inspector")
                .default_width(scaled_margin(300.0, ui_scale))
                .min_width(scaled_margin(220.0, ui_scale))
                .max_width(max_panel_width)
                .resizable(true)
                .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(0.0))
                .show(ctx, |ui| render_inspector(ui, &mut state));
        }
        MenuAlignment::TopMiddle => {
            egui::Window::new("Inspector")
                .id(egui::Id::new("inspector_window"))
                .anchor(egui::Align2::CENTER_TOP, [0.0, scaled_margin(32.0, ui_scale)])
                .default_width(scaled_margin(360.0, ui_scale))
                .default_height(scaled_margin(320.0, ui_scale))
                .collapsible(true)
                .resizable(true)
                .show(ctx, |ui| render_inspector(ui, &mut state));
        }
    }

    if state.studio.image().is_loaded() {
        render_frames_strip(ctx, &mut state);
    }
    render_preview(ctx, &mut state);

    // Central viewport
    egui::CentralPanel::default()
        .frame(egui::Frame::central_panel(&ctx.style()).inner_margin(egui::Margin::ZERO))
        .show(ctx, |ui| {
            if state.studio.image().is_loaded() {
                render_canvas(ui, &mut state);
            } else {
                render_welcome_screen(ui, &mut state);
            }
        });

    // Pick up whatever the views just changed
    state.drain_studio_events();
}

/// Apply UI scale and theme to global text styles and spacing
fn apply_style(ctx: &egui::Context, state: &AppState) {
    let ui_scale = state.config.ui_scale;
    let mut style = (*ctx.style()).clone();
    style.visuals = theme_visuals(state.studio.settings().theme);
    style.text_styles.insert(
        egui::TextStyle::Heading,
        egui::FontId::proportional(scaled_font(18.0, ui_scale)),
    );
    style.text_styles.insert(
        egui::TextStyle::Body,
        egui::FontId::proportional(scaled_font(14.0, ui_scale)),
    );
    style.text_styles.insert(
        egui::TextStyle::Button,
        egui::FontId::proportional(scaled_font(14.0, ui_scale)),
    );
    style.text_styles.insert(
        egui::TextStyle::Small,
        egui::FontId::proportional(scaled_font(12.0, ui_scale)),
    );
    style.text_styles.insert(
        egui::TextStyle::Monospace,
        egui::FontId::monospace(scaled_font(13.0, ui_scale)),
    );
    // Scale checkbox/radio button sizes
    style.spacing.icon_width = scaled_margin(14.0, ui_scale);
    style.spacing.icon_width_inner = scaled_margin(8.0, ui_scale);
    style.spacing.icon_spacing = scaled_margin(4.0, ui_scale);
    // Prevent text wrapping in menus
    style.wrap_mode = Some(egui::TextWrapMode::Extend);
    ctx.set_style(style);
}

/// Ctrl+Plus/Minus/0. Plus requires Shift on most keyboards (Shift+=).
/// The key events are consumed even at min/max so widgets never see them.
fn handle_scale_shortcuts(ctx: &egui::Context, state: &mut AppState) {
    let increase_pressed = ctx.input_mut(|i| {
        i.consume_key(egui::Modifiers::COMMAND, egui::Key::Plus)
            || i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::Equals)
    });
    let decrease_pressed = ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::Minus));
    let reset_pressed = ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::Num0));

    let before = state.config.ui_scale;
    if increase_pressed {
        state.config.scale_up();
    }
    if decrease_pressed {
        state.config.scale_down();
    }
    if reset_pressed {
        state.config.ui_scale = 1.0;
    }
    if state.config.ui_scale != before {
        state.config.save();
    }
}

fn handle_shortcuts(ctx: &egui::Context, state: &mut AppState) {
    // Text fields keep their keys
    if ctx.wants_keyboard_input() {
        return;
    }
    let (play, left, right, open, export, select_all) = ctx.input_mut(|i| {
        (
            i.key_pressed(egui::Key::Space) || i.key_pressed(egui::Key::Enter),
            i.key_pressed(egui::Key::ArrowLeft),
            i.key_pressed(egui::Key::ArrowRight),
            i.consume_key(egui::Modifiers::COMMAND, egui::Key::O),
            i.consume_key(egui::Modifiers::COMMAND, egui::Key::E),
            i.consume_key(egui::Modifiers::COMMAND, egui::Key::A),
        )
    });
    let has_frames = !state.studio.frames().is_empty();
    if play && has_frames {
        state.studio.toggle_play();
    }
    if left && has_frames {
        state.studio.step_frame(false);
    }
    if right && has_frames {
        state.studio.step_frame(true);
    }
    if open {
        open_image_dialog(state);
    }
    if export && has_frames && !state.exports.is_running() {
        state.export();
    }
    if select_all {
        state.studio.select_all();
    }
}

fn open_image_dialog(state: &mut AppState) {
    if let Some(path) = pick_image_file() {
        state.open_image(&path);
    } else {
        let typed = state.import_path.trim().to_string();
        if !typed.is_empty() {
            state.open_image(&PathBuf::from(typed));
        }
    }
}

fn render_menu_bar(ctx: &egui::Context, state: &mut AppState) {
    let menu_font_size = scaled_font(15.0, state.config.ui_scale);
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button(egui::RichText::new("File").size(menu_font_size), |ui| {
                if ui.button("Open Image...").clicked() {
                    open_image_dialog(state);
                    ui.close_menu();
                }
                let recent = state.config.recent_images.clone();
                ui.add_enabled_ui(!recent.is_empty(), |ui| {
                    ui.menu_button("Open Recent", |ui| {
                        for path in &recent {
                            if ui.button(path).clicked() {
                                let path_buf = PathBuf::from(path);
                                if path_buf.exists() {
                                    state.open_image(&path_buf);
                                } else {
                                    state.config.remove_recent(path);
                                    state.set_status(format!("{path} no longer exists"));
                                }
                                ui.close_menu();
                            }
                        }
                    });
                });
                ui.separator();
                let has_frames = !state.studio.frames().is_empty();
                if ui.add_enabled(has_frames, egui::Button::new("Export")).clicked() {
                    state.export();
                    ui.close_menu();
                }
                if ui.button("Clear").clicked() {
                    state.clear();
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Exit").clicked() {
                    std::process::exit(0);
                }
            });
            ui.menu_button(egui::RichText::new("View").size(menu_font_size), |ui| {
                ui.checkbox(&mut state.show_preview, "Preview Window");
                let mut appearance = state.studio.grid().appearance.clone();
                if ui.checkbox(&mut appearance.visible, "Grid Lines").changed() {
                    state.studio.set_grid_appearance(appearance);
                }
                ui.separator();
                if ui.button("Zoom In").clicked() {
                    state.zoom_in();
                }
                if ui.button("Zoom Out").clicked() {
                    state.zoom_out();
                }
                if ui.button("Fit to View").clicked() {
                    state.needs_zoom_fit = true;
                    ui.close_menu();
                }
                ui.separator();
                ui.menu_button("Menu Position", |ui| {
                    let current = state.studio.menu_alignment();
                    for align in MenuAlignment::ALL {
                        if ui.radio(current == align, align.label()).clicked() {
                            state.studio.set_menu_alignment(align);
                            ui.close_menu();
                        }
                    }
                });
            });
            ui.menu_button(egui::RichText::new("Help").size(menu_font_size), |ui| {
                if ui.button("Keyboard & Mouse").clicked() {
                    state.show_help = true;
                    ui.close_menu();
                }
            });

            // Typed path for platforms without native dialogs
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Open").clicked() {
                    open_image_dialog(state);
                }
                ui.add(
                    egui::TextEdit::singleline(&mut state.import_path)
                        .hint_text("Image path")
                        .desired_width(scaled_margin(240.0, state.config.ui_scale)),
                );
            });
        });
    });
}

fn render_status_bar(ctx: &egui::Context, state: &AppState) {
    egui::TopBottomPanel::bottom("status_bar")
        .max_height(24.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some((ref msg, ref when)) = state.status_message {
                    let relative_time = format_relative_time(when.elapsed());
                    ui.label(format!("{} ({})", msg, relative_time));
                } else {
                    ui.label("Ready");
                }

                // Version number floating right
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("v{}", VERSION));
                    let image = state.studio.image();
                    if image.is_loaded() {
                        ui.separator();
                        ui.label(format_zoom(state.zoom_level()));
                        ui.separator();
                        ui.label(format!("{} ({}x{})", image.current_file_name, image.width, image.height));
                        if let Some(elapsed) = state.time_since_load() {
                            ui.label(format!("loaded {}", format_relative_time(elapsed)));
                        }
                    }
                });
            });
        });
}

fn render_welcome_screen(ui: &mut egui::Ui, state: &mut AppState) {
    let ui_scale = state.config.ui_scale;
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() / 4.0);
        ui.label(
            egui::RichText::new("Pixel Sprite Slicer")
                .size(scaled_font(28.0, ui_scale))
                .strong(),
        );
        ui.label(format!("v{}", VERSION));
        ui.add_space(scaled_margin(20.0, ui_scale));
        ui.label(
            egui::RichText::new("Drop a PNG, JPEG or GIF here to start slicing.")
                .size(scaled_font(16.0, ui_scale))
                .color(egui::Color32::GRAY),
        );
        ui.add_space(scaled_margin(DEFAULT_PANEL_MARGIN, ui_scale));
        let button_size = egui::vec2(scaled_margin(160.0, ui_scale), scaled_margin(40.0, ui_scale));
        if ui
            .add(
                egui::Button::new(egui::RichText::new("Open Image...").size(scaled_font(18.0, ui_scale)))
                    .min_size(button_size),
            )
            .clicked()
        {
            open_image_dialog(state);
        }

        // Recent images
        let recent = state.config.recent_images.clone();
        if !recent.is_empty() {
            ui.add_space(scaled_margin(30.0, ui_scale));
            ui.heading("Recent Images");
            ui.add_space(scaled_margin(10.0, ui_scale));
            for path in &recent {
                let path_buf = PathBuf::from(path);
                let modified_ago = std::fs::metadata(&path_buf)
                    .and_then(|m| m.modified())
                    .ok()
                    .and_then(|time| time.elapsed().ok())
                    .map(format_relative_time)
                    .unwrap_or_else(|| "missing".to_string());
                if ui
                    .link(format!("{path}  ({modified_ago})"))
                    .on_hover_text("Open")
                    .clicked()
                {
                    if path_buf.exists() {
                        state.open_image(&path_buf);
                    } else {
                        state.config.remove_recent(path);
                    }
                }
            }
        }
    });
}
