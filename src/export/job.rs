use std::path::PathBuf;

use image::RgbaImage;

use crate::model::{ExportKind, SpriteSheetOptions};

use super::{gif, naming, png_sequence, spritesheet, ExportError};

/// Everything a worker needs to write one export, detached from the studio
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub kind: ExportKind,
    pub dir: PathBuf,
    pub name: String,
    /// Already resolved tag suffix, empty for PNG sequences
    pub tags: String,
    pub frame_rate: f64,
    pub sprite_sheet: SpriteSheetOptions,
    pub frames: Vec<RgbaImage>,
    /// ffmpeg executable
    pub tool: PathBuf,
}

impl ExportJob {
    /// Every file the job will write
    pub fn outputs(&self) -> Vec<PathBuf> {
        match self.kind {
            ExportKind::PngSequence => (0..self.frames.len())
                .map(|index| naming::sequence_path(&self.dir, &self.name, index))
                .collect(),
            ExportKind::Gif => vec![naming::tagged_path(&self.dir, &self.name, &self.tags, "gif")],
            ExportKind::SpriteSheet => vec![
                naming::tagged_path(&self.dir, &self.name, &self.tags, "png"),
                naming::tagged_path(&self.dir, &self.name, &self.tags, "json"),
            ],
        }
    }

    /// Outputs that already exist on disk
    pub fn conflicts(&self) -> Vec<PathBuf> {
        self.outputs().into_iter().filter(|path| path.exists()).collect()
    }

    /// Run to completion on the calling thread
    pub fn run(&self, progress: &mut dyn FnMut(String)) -> Result<String, ExportError> {
        if self.frames.is_empty() {
            return Err(ExportError::EmptyFrames);
        }
        std::fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            path: self.dir.clone(),
            source,
        })?;
        tracing::info!(kind = ?self.kind, dir = %self.dir.display(), frames = self.frames.len(), "export started");

        match self.kind {
            ExportKind::PngSequence => png_sequence::export_png_sequence(self, progress),
            ExportKind::Gif => gif::export_gif(self, progress),
            ExportKind::SpriteSheet => spritesheet::export_spritesheet(self, progress),
        }
    }

    #[cfg(test)]
    pub(crate) fn for_test(kind: ExportKind, dir: &std::path::Path, frames: Vec<RgbaImage>) -> Self {
        Self {
            kind,
            dir: dir.to_path_buf(),
            name: crate::model::DEFAULT_EXPORT_FILE_NAME.to_string(),
            tags: String::new(),
            frame_rate: 10.0,
            sprite_sheet: SpriteSheetOptions::default(),
            frames,
            tool: PathBuf::from("ffmpeg"),
        }
    }
}
