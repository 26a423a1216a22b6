use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::Engine;
use image::codecs::gif::GifDecoder;
use image::{imageops, AnimationDecoder, ImageFormat, RgbaImage};

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("'{0}' This file format is not supported yet.")]
    UnsupportedFileType(String),

    #[error("Please drop a single file, {0} files were dropped.")]
    MultipleFiles(usize),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} was still empty after {attempts} attempts")]
    EmptyRead { path: PathBuf, attempts: u32 },

    #[error("Invalid image: {0}")]
    Decode(#[from] image::ImageError),
}

/// A decoded upload ready to be shown in the viewport
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub name: String,
    pub format: ImageFormat,
    pub pixels: RgbaImage,
    /// `data:<mime>;base64,...` of the original bytes
    pub data_uri: String,
}

/// Only one file may be dropped at a time
pub fn validate_files_length(count: usize) -> Result<(), ImageError> {
    if count > 1 {
        return Err(ImageError::MultipleFiles(count));
    }
    Ok(())
}

/// Sniff the content, falling back to the file extension. Only PNG, JPEG and GIF are accepted.
pub fn detect_format(name: &str, bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    let format = image::guess_format(bytes)
        .ok()
        .or_else(|| ImageFormat::from_path(name).ok());
    match format {
        Some(format @ (ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif)) => Ok(format),
        _ => Err(ImageError::UnsupportedFileType(name.to_string())),
    }
}

/// Composite every GIF frame in order onto one canvas
pub fn flatten_gif(bytes: &[u8]) -> Result<RgbaImage, ImageError> {
    let decoder = GifDecoder::new(Cursor::new(bytes))?;
    let frames = decoder.into_frames().collect_frames()?;

    let (width, height) = frames
        .iter()
        .fold((0, 0), |(w, h), frame| {
            let buffer = frame.buffer();
            (
                w.max(frame.left() + buffer.width()),
                h.max(frame.top() + buffer.height()),
            )
        });
    let mut canvas = RgbaImage::new(width, height);
    for frame in &frames {
        imageops::overlay(&mut canvas, frame.buffer(), frame.left() as i64, frame.top() as i64);
    }
    Ok(canvas)
}

pub fn to_data_uri(format: ImageFormat, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Validate and decode uploaded bytes
pub fn decode_source(name: &str, bytes: &[u8]) -> Result<SourceImage, ImageError> {
    let format = detect_format(name, bytes)?;

    // Animated input is merged into a single still
    let pixels = match format {
        ImageFormat::Gif => flatten_gif(bytes)?,
        _ => image::load_from_memory_with_format(bytes, format)?.to_rgba8(),
    };

    Ok(SourceImage {
        name: name.to_string(),
        format,
        pixels,
        data_uri: to_data_uri(format, bytes),
    })
}

/// Read and decode an image file
pub fn load_source_file(path: &Path) -> Result<SourceImage, ImageError> {
    let bytes = fs::read(path).map_err(|source| ImageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    decode_source(&name, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame, Rgba};

    fn encode(image: &RgbaImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    #[test]
    fn test_png_decodes() {
        let image = RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 255]));
        let source = decode_source("walk.png", &encode(&image, ImageFormat::Png)).unwrap();
        assert_eq!(source.format, ImageFormat::Png);
        assert_eq!(source.pixels.dimensions(), (4, 3));
        assert!(source.data_uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_unsupported_type_is_rejected() {
        let err = decode_source("notes.txt", b"hello").unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedFileType(name) if name == "notes.txt"));
    }

    #[test]
    fn test_extension_fallback_still_checks_type() {
        assert_eq!(detect_format("a.jpeg", b"garbage").unwrap(), ImageFormat::Jpeg);
        assert!(detect_format("a.bmp", b"garbage").is_err());
    }

    #[test]
    fn test_multiple_files_rejected() {
        assert!(validate_files_length(1).is_ok());
        assert!(matches!(validate_files_length(3), Err(ImageError::MultipleFiles(3))));
    }

    #[test]
    fn test_gif_frames_are_flattened() {
        let mut first = RgbaImage::new(2, 1);
        first.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let mut second = RgbaImage::new(2, 1);
        second.put_pixel(1, 0, Rgba([0, 0, 255, 255]));

        let mut bytes = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut bytes);
            encoder
                .encode_frames(vec![
                    Frame::from_parts(first, 0, 0, Delay::from_numer_denom_ms(100, 1)),
                    Frame::from_parts(second, 0, 0, Delay::from_numer_denom_ms(100, 1)),
                ])
                .unwrap();
        }

        let flat = flatten_gif(&bytes).unwrap();
        assert_eq!(flat.dimensions(), (2, 1));
        assert_eq!(flat.get_pixel(0, 0)[3], 255);
        assert_eq!(flat.get_pixel(1, 0)[3], 255);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_source_file(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, ImageError::Read { .. }));
    }
}
