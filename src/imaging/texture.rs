use bevy_egui::egui;
use image::RgbaImage;

const MAX_TEXTURE_SIZE: u32 = 4096;

/// Upload an RGBA image as an egui texture. Pixel art uses nearest filtering.
pub fn rgba_to_texture(ctx: &egui::Context, name: &str, image: &RgbaImage, pixelated: bool) -> egui::TextureHandle {
    // Check if image needs to be resized
    let (width, height) = image.dimensions();
    let resized;
    let image = if width > MAX_TEXTURE_SIZE || height > MAX_TEXTURE_SIZE {
        let scale = calculate_fit_scale((width, height), (MAX_TEXTURE_SIZE, MAX_TEXTURE_SIZE));
        let new_width = ((width as f32 * scale) as u32).max(1);
        let new_height = ((height as f32 * scale) as u32).max(1);
        resized = image::imageops::resize(image, new_width, new_height, image::imageops::FilterType::Nearest);
        &resized
    } else {
        image
    };

    let size = [image.width() as usize, image.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());

    let options = if pixelated {
        egui::TextureOptions::NEAREST
    } else {
        egui::TextureOptions::LINEAR
    };
    ctx.load_texture(name, color_image, options)
}

/// Scale factor to fit an image within a box while preserving aspect ratio
pub fn calculate_fit_scale(image_size: (u32, u32), box_size: (u32, u32)) -> f32 {
    if image_size.0 == 0 || image_size.1 == 0 {
        return 1.0;
    }
    let scale_x = box_size.0 as f32 / image_size.0 as f32;
    let scale_y = box_size.1 as f32 / image_size.1 as f32;
    scale_x.min(scale_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_scale_uses_tighter_axis() {
        assert_eq!(calculate_fit_scale((200, 100), (100, 100)), 0.5);
        assert_eq!(calculate_fit_scale((50, 100), (100, 100)), 1.0);
        assert_eq!(calculate_fit_scale((0, 10), (100, 100)), 1.0);
    }
}
