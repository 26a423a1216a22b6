use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use pixel_sprite_slicer::state::AppState;
use pixel_sprite_slicer::ui::{file_drop_system, ui_system};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Pixel Sprite Slicer".into(),
                resolution: (1600., 900.).into(),
                resizable: true,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .init_resource::<AppState>()
        .add_systems(Startup, setup)
        .add_systems(Update, (file_drop_system, ui_system).chain())
        .run();
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);
}
