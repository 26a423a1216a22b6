use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use super::{naming, ExportError, ExportJob};

/// Prefix of the scratch directory created next to the output
pub const TEMP_DIR_PREFIX: &str = "__temp__";

const FRAME_PATTERN: &str = "frame_%05d.png";
const PALETTE_FILE: &str = "palette.png";

/// `<tool> -version` must run and print a version banner
pub fn check_tool(tool: &Path) -> Result<(), ExportError> {
    let output = Command::new(tool)
        .arg("-version")
        .output()
        .map_err(|_| ExportError::ToolMissing)?;
    if String::from_utf8_lossy(&output.stdout).contains("version") {
        Ok(())
    } else {
        Err(ExportError::ToolMissing)
    }
}

/// Arguments for the palette generation pass
pub fn palette_args(frames: &Path, palette: &Path) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-i".into(),
        frames.as_os_str().to_owned(),
        "-vf".into(),
        "palettegen".into(),
        palette.as_os_str().to_owned(),
    ]
}

/// Arguments for assembling the GIF with the generated palette
pub fn gif_args(fps: f64, frames: &Path, palette: &Path, output: &Path) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-r".into(),
        fps.to_string().into(),
        "-i".into(),
        frames.as_os_str().to_owned(),
        "-i".into(),
        palette.as_os_str().to_owned(),
        "-lavfi".into(),
        "paletteuse=alpha_threshold=128".into(),
        "-gifflags".into(),
        "-offsetting".into(),
        output.as_os_str().to_owned(),
    ]
}

fn run_tool(tool: &Path, stage: &'static str, args: &[OsString]) -> Result<(), ExportError> {
    tracing::debug!(stage, ?args, "running ffmpeg");
    let output = Command::new(tool).args(args).output().map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ExportError::ToolMissing
        } else {
            ExportError::Io {
                path: tool.to_path_buf(),
                source,
            }
        }
    })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
        return Err(ExportError::ToolFailed {
            stage,
            stderr: tail.into_iter().rev().collect::<Vec<_>>().join("\n"),
        });
    }
    Ok(())
}

/// Write frames to a scratch directory, build a palette, then the GIF
pub fn export_gif(job: &ExportJob, progress: &mut dyn FnMut(String)) -> Result<String, ExportError> {
    check_tool(&job.tool)?;

    let temp = tempfile::Builder::new()
        .prefix(TEMP_DIR_PREFIX)
        .tempdir_in(&job.dir)
        .map_err(|source| ExportError::Io {
            path: job.dir.clone(),
            source,
        })?;

    // Numbered frames keep their order for the image2 demuxer
    for (index, frame) in job.frames.iter().enumerate() {
        let path = temp.path().join(format!("frame_{index:05}.png"));
        frame.save(&path).map_err(|source| ExportError::Encode { path, source })?;
    }
    progress(format!("Wrote {} frames", job.frames.len()));

    let frames = temp.path().join(FRAME_PATTERN);
    let palette = temp.path().join(PALETTE_FILE);
    let output = naming::tagged_path(&job.dir, &job.name, &job.tags, "gif");

    run_tool(&job.tool, "palettegen", &palette_args(&frames, &palette))?;
    progress("Palette generated".to_string());

    run_tool(&job.tool, "paletteuse", &gif_args(job.frame_rate, &frames, &palette, &output))?;
    progress(format!("Saved {}", output.display()));

    let temp_path = temp.path().to_path_buf();
    if let Err(e) = temp.close() {
        tracing::warn!(path = %temp_path.display(), "failed to remove temp directory: {e}");
    }

    Ok(format!("Export completed: {}", output.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExportKind;
    use image::RgbaImage;
    use std::path::PathBuf;

    #[test]
    fn test_gif_args_carry_rate_and_filters() {
        let args = gif_args(12.5, Path::new("t/frame_%05d.png"), Path::new("t/palette.png"), Path::new("o.gif"));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().to_string()).collect();
        assert_eq!(args[1..3], ["-r".to_string(), "12.5".to_string()]);
        assert!(args.contains(&"paletteuse=alpha_threshold=128".to_string()));
        assert!(args.contains(&"-offsetting".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("o.gif"));
    }

    #[test]
    fn test_palette_args() {
        let args = palette_args(Path::new("frames"), Path::new("palette.png"));
        assert!(args.contains(&OsString::from("palettegen")));
    }

    #[test]
    fn test_missing_tool_is_reported() {
        let tool = Path::new("/nonexistent/ffmpeg-binary");
        assert!(matches!(check_tool(tool), Err(ExportError::ToolMissing)));

        let dir = tempfile::tempdir().unwrap();
        let mut job = ExportJob::for_test(ExportKind::Gif, dir.path(), vec![RgbaImage::new(2, 2)]);
        job.tool = PathBuf::from(tool);
        assert!(matches!(export_gif(&job, &mut |_| {}), Err(ExportError::ToolMissing)));
        assert!(!dir.path().join("frame.gif").exists());
    }
}
