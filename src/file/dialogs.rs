use std::path::PathBuf;

#[cfg(target_os = "windows")]
use rfd::FileDialog;

// Native file dialog functions (Windows only)
#[cfg(target_os = "windows")]
pub fn pick_image_file() -> Option<PathBuf> {
    FileDialog::new()
        .add_filter("Images", &["png", "jpg", "jpeg", "gif"])
        .pick_file()
}

#[cfg(target_os = "windows")]
pub fn pick_export_folder() -> Option<PathBuf> {
    FileDialog::new().pick_folder()
}

// Fallback for non-Windows (returns None, uses text input instead)
#[cfg(not(target_os = "windows"))]
pub fn pick_image_file() -> Option<PathBuf> {
    None
}
#[cfg(not(target_os = "windows"))]
pub fn pick_export_folder() -> Option<PathBuf> {
    None
}
