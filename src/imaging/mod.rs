mod processing;
mod texture;

pub use processing::{
    decode_source, detect_format, flatten_gif, load_source_file, to_data_uri, validate_files_length,
    ImageError, SourceImage,
};
pub use texture::{calculate_fit_scale, rgba_to_texture};
