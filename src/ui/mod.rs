mod canvas;
mod dialogs;
mod frames_strip;
mod inspector;
mod preview;
mod system;
mod widgets;

pub use system::{file_drop_system, ui_system};
