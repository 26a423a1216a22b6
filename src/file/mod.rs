mod dialogs;

pub use dialogs::{pick_export_folder, pick_image_file};
