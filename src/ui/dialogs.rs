use bevy_egui::egui;

use crate::state::{AppState, ExportStatus, PendingAction, PopupKind};
use crate::ui::widgets::scaled_margin;

const SHORTCUTS: [(&str, &str); 12] = [
    ("Ctrl + Click", "Select or deselect a grid cell"),
    ("Shift + Drag", "Toggle every cell touched by the area"),
    ("Z + Click", "Show a selected cell in the preview"),
    ("Middle Drag", "Pan the viewport"),
    ("Mouse Wheel", "Zoom the viewport or preview"),
    ("Space / Enter", "Play / pause"),
    ("Left / Right", "Step frames while paused"),
    ("Ctrl + O", "Open image"),
    ("Ctrl + E", "Export"),
    ("Ctrl + A", "Select all cells"),
    ("Ctrl + Plus / Minus", "Scale the interface"),
    ("Ctrl + 0", "Reset interface scale"),
];

pub fn render_dialogs(ctx: &egui::Context, state: &mut AppState) {
    render_pending_action(ctx, state);
    render_export_status(ctx, state);
    render_popup(ctx, state);
    render_help(ctx, state);
}

/// Oldest unacknowledged popup
fn render_popup(ctx: &egui::Context, state: &mut AppState) {
    let Some(popup) = state.popups.front().cloned() else {
        return;
    };
    let color = match popup.kind {
        PopupKind::Info => egui::Color32::from_rgb(120, 170, 230),
        PopupKind::Warning => egui::Color32::from_rgb(230, 180, 60),
        PopupKind::Error => egui::Color32::from_rgb(230, 80, 80),
    };
    egui::Window::new(popup.kind.title())
        .id(egui::Id::new("popup"))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.set_max_width(scaled_margin(360.0, state.config.ui_scale));
            ui.label(egui::RichText::new(&popup.message).color(color));
            ui.add_space(10.0);
            let ok = ui.button("OK").clicked() || ui.input(|i| i.key_pressed(egui::Key::Escape));
            if ok {
                state.popups.pop_front();
            }
        });
}

fn render_pending_action(ctx: &egui::Context, state: &mut AppState) {
    let Some(action) = state.pending_action.clone() else {
        return;
    };
    match action {
        PendingAction::RecreateGrid => {
            egui::Window::new("Recreate Grid")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label("Recreating the grid removes every frame.");
                    ui.label("Do you want to continue?");
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if ui.button("Recreate").clicked() {
                            state.pending_action = None;
                            state.apply_grid(true);
                        }
                        if ui.button("Cancel").clicked() {
                            state.pending_action = None;
                        }
                    });
                });
        }
        PendingAction::OverwriteExport { paths } => {
            egui::Window::new("Overwrite Files?")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label("These files already exist:");
                    egui::ScrollArea::vertical()
                        .max_height(scaled_margin(160.0, state.config.ui_scale))
                        .show(ui, |ui| {
                            for path in &paths {
                                ui.label(egui::RichText::new(path.display().to_string()).monospace());
                            }
                        });
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if ui.button("Overwrite").clicked() {
                            state.pending_action = None;
                            state.confirm_overwrite(true);
                        }
                        if ui.button("Cancel").clicked() {
                            state.pending_action = None;
                            state.confirm_overwrite(false);
                        }
                    });
                });
        }
    }
}

fn render_export_status(ctx: &egui::Context, state: &mut AppState) {
    match state.export_status.clone() {
        ExportStatus::Idle => {}
        ExportStatus::Running(stage) => {
            egui::Window::new("Exporting")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(stage);
                    });
                });
            // Keep polling the worker while nothing else repaints
            ctx.request_repaint();
        }
        ExportStatus::Done(summary) => {
            egui::Window::new("Export Complete")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(summary);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        state.export_status = ExportStatus::Idle;
                    }
                });
        }
    }
}

fn render_help(ctx: &egui::Context, state: &mut AppState) {
    if !state.show_help {
        return;
    }
    let mut open = true;
    egui::Window::new("Keyboard & Mouse")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            egui::Grid::new("shortcuts").num_columns(2).striped(true).show(ui, |ui| {
                for (keys, action) in SHORTCUTS {
                    ui.label(egui::RichText::new(keys).strong());
                    ui.label(action);
                    ui.end_row();
                }
            });
        });
    state.show_help = open;
}
