//! Export of the frame collection as a PNG sequence, a GIF or a spritesheet.

mod gif;
mod job;
pub mod naming;
mod png_sequence;
mod queue;
mod spritesheet;

use std::path::PathBuf;

pub use gif::{check_tool, gif_args, palette_args, TEMP_DIR_PREFIX};
pub use job::ExportJob;
pub use queue::{ExportNotice, ExportQueue, Submission};
pub use spritesheet::{compose, pack, Placement, SheetLayout};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("At least one frame is required. The frame list is empty!")]
    EmptyFrames,

    #[error("ffmpeg is missing. Install ffmpeg or set its path in the config to export GIFs.")]
    ToolMissing,

    #[error("ffmpeg {stage} failed: {stderr}")]
    ToolFailed { stage: &'static str, stderr: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to serialize metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("Failed to start the export worker: {0}")]
    Worker(#[source] std::io::Error),

    #[error("An export is already running.")]
    Busy,
}
