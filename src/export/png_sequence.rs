use super::{naming, ExportError, ExportJob};

/// Write every frame as `{name}_{index}.png`
pub fn export_png_sequence(job: &ExportJob, progress: &mut dyn FnMut(String)) -> Result<String, ExportError> {
    for (index, frame) in job.frames.iter().enumerate() {
        let path = naming::sequence_path(&job.dir, &job.name, index);
        frame.save(&path).map_err(|source| ExportError::Encode {
            path: path.clone(),
            source,
        })?;
        progress(format!("Saved {}", path.display()));
    }
    Ok(format!("Exported {} frames to {}", job.frames.len(), job.dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExportKind;
    use image::RgbaImage;

    #[test]
    fn test_writes_numbered_files() {
        let dir = tempfile::tempdir().unwrap();
        let job = ExportJob::for_test(ExportKind::PngSequence, dir.path(), vec![RgbaImage::new(4, 4); 3]);
        let mut lines = Vec::new();
        export_png_sequence(&job, &mut |line| lines.push(line)).unwrap();
        for index in 0..3 {
            assert!(dir.path().join(format!("frame_{index}.png")).exists());
        }
        assert_eq!(lines.len(), 3);
    }
}
