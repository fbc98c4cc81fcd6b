// Image decoding and half-block rendering for card faces

use crate::error::{ArchflashError, Result};
use image::{DynamicImage, GenericImageView, Pixel};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};
use std::path::Path;
use std::sync::Arc;

/// Decoded images are downscaled to at most this size before caching
const MAX_IMAGE_WIDTH: u32 = 320;
const MAX_IMAGE_HEIGHT: u32 = 200;

/// A decoded card image, shrunk for terminal display
#[derive(Debug, Clone)]
pub struct CardImage {
    thumbnail: Arc<DynamicImage>,
    original: (u32, u32),
}

impl CardImage {
    pub fn from_image(img: DynamicImage) -> Self {
        let original = img.dimensions();
        let (width, height) =
            calculate_resize_dimensions(original.0, original.1, MAX_IMAGE_WIDTH, MAX_IMAGE_HEIGHT);
        let thumbnail = if (width, height) == original || width == 0 || height == 0 {
            img
        } else {
            img.thumbnail(width, height)
        };

        Self {
            thumbnail: Arc::new(thumbnail),
            original,
        }
    }

    /// Pixel size of the source image
    pub fn original_dimensions(&self) -> (u32, u32) {
        self.original
    }

    /// Renders to fit `columns` x `rows` terminal cells
    pub fn to_lines(&self, columns: u16, rows: u16) -> Vec<Line<'static>> {
        let (w, h) = self.thumbnail.dimensions();
        // Each cell holds two vertical pixels
        let (width, height) =
            calculate_resize_dimensions(w, h, columns as u32, rows as u32 * 2);
        if width == 0 || height == 0 {
            return Vec::new();
        }
        image_to_halfblock_lines(&self.thumbnail, width, height)
    }
}

/// Decodes image bytes of any format the `image` crate recognizes
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes)
        .map_err(|e| ArchflashError::ImageLoad(format!("Image decoding error: {}", e)))
}

/// Loads an image from a file path
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path)
        .map_err(|e| ArchflashError::ImageLoad(format!("{}: {}", path.display(), e)))
}

/// Calculates new dimensions to fit image within max width and height while preserving aspect ratio
pub fn calculate_resize_dimensions(
    original_width: u32,
    original_height: u32,
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    if original_width == 0 || original_height == 0 {
        return (0, 0);
    }

    let width_ratio = max_width as f64 / original_width as f64;
    let height_ratio = max_height as f64 / original_height as f64;

    let ratio = width_ratio.min(height_ratio);

    if ratio >= 1.0 {
        (original_width, original_height)
    } else {
        let new_width = (original_width as f64 * ratio) as u32;
        let new_height = (original_height as f64 * ratio) as u32;
        (new_width, new_height)
    }
}

/// Converts an image to styled lines using the upper half block (▀): the
/// foreground carries the upper pixel and the background the lower one.
pub fn image_to_halfblock_lines(img: &DynamicImage, width: u32, height: u32) -> Vec<Line<'static>> {
    let height = if height % 2 == 0 { height } else { height + 1 };

    // Triangle keeps resizing fast for large photos
    let img = img.resize_exact(width, height, image::imageops::FilterType::Triangle);
    let img = img.to_rgb8();

    let term_height = height / 2;
    let mut lines = Vec::with_capacity(term_height as usize);

    for y in 0..term_height {
        let upper_y = y * 2;
        let lower_y = upper_y + 1;

        let mut spans = Vec::with_capacity(width as usize);

        for x in 0..width {
            let upper = img.get_pixel(x, upper_y).to_rgb();
            let lower = if lower_y < height {
                img.get_pixel(x, lower_y).to_rgb()
            } else {
                upper
            };

            let style = Style::default()
                .fg(Color::Rgb(upper[0], upper[1], upper[2]))
                .bg(Color::Rgb(lower[0], lower[1], lower[2]));

            spans.push(Span::styled("▀", style));
        }

        lines.push(Line::from(spans));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn encoded_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, _| image::Rgb([x as u8, 0, 200]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    mod resize_tests {
        use super::*;

        #[test]
        fn test_calculate_resize_dimensions_scale_down() {
            let (width, height) = calculate_resize_dimensions(1600, 1200, 80, 40);
            assert!(width <= 80);
            assert!(height <= 40);
            let ratio_diff = (width * 3).abs_diff(height * 4);
            assert!(ratio_diff <= 4, "Aspect ratio not preserved: {}x{}", width, height);
        }

        #[test]
        fn test_calculate_resize_dimensions_no_upscale() {
            assert_eq!(calculate_resize_dimensions(40, 30, 80, 40), (40, 30));
        }

        #[test]
        fn test_calculate_resize_dimensions_zero() {
            assert_eq!(calculate_resize_dimensions(0, 0, 80, 40), (0, 0));
        }

        #[test]
        fn test_calculate_resize_dimensions_wide_and_tall() {
            assert_eq!(calculate_resize_dimensions(1600, 400, 80, 40), (80, 20));
            assert_eq!(calculate_resize_dimensions(400, 1600, 80, 40), (10, 40));
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_image_to_halfblock_dimensions() {
            let img = DynamicImage::new_rgb8(10, 10);
            let lines = image_to_halfblock_lines(&img, 5, 6);

            assert_eq!(lines.len(), 3);
            for line in &lines {
                assert_eq!(line.spans.len(), 5);
            }
        }

        #[test]
        fn test_halfblock_colors_carry_pixels() {
            let img = image::RgbImage::from_fn(1, 2, |_, y| {
                if y == 0 {
                    image::Rgb([255, 0, 0])
                } else {
                    image::Rgb([0, 0, 255])
                }
            });
            let lines = image_to_halfblock_lines(&DynamicImage::ImageRgb8(img), 1, 2);

            let style = lines[0].spans[0].style;
            assert_eq!(style.fg, Some(Color::Rgb(255, 0, 0)));
            assert_eq!(style.bg, Some(Color::Rgb(0, 0, 255)));
        }

        #[test]
        fn test_card_image_downscales_large_sources() {
            let card = CardImage::from_image(DynamicImage::new_rgb8(1600, 1000));
            assert_eq!(card.original_dimensions(), (1600, 1000));

            let (w, h) = card.thumbnail.dimensions();
            assert!(w <= MAX_IMAGE_WIDTH && h <= MAX_IMAGE_HEIGHT);
        }

        #[test]
        fn test_card_image_fits_requested_cells() {
            let card = CardImage::from_image(DynamicImage::new_rgb8(200, 100));
            let lines = card.to_lines(40, 30);

            // 200x100 fits 40 columns as 40x20 pixels, i.e. 10 rows
            assert_eq!(lines.len(), 10);
            assert!(lines.iter().all(|l| l.spans.len() == 40));
        }

        #[test]
        fn test_card_image_zero_area_renders_nothing() {
            let card = CardImage::from_image(DynamicImage::new_rgb8(20, 20));
            assert!(card.to_lines(0, 10).is_empty());
        }
    }

    mod load_tests {
        use super::*;

        #[test]
        fn test_decode_png_bytes() {
            let img = decode_image(&encoded_png(12, 8)).unwrap();
            assert_eq!(img.dimensions(), (12, 8));
        }

        #[test]
        fn test_decode_garbage_fails() {
            let result = decode_image(b"definitely not an image");
            assert!(matches!(result, Err(ArchflashError::ImageLoad(_))));
        }

        #[test]
        fn test_load_image_jpg() {
            let temp_dir = TempDir::new().unwrap();
            let image_path = temp_dir.path().join("duomo.jpg");
            let img = image::RgbImage::from_fn(10, 10, |_, _| image::Rgb([0, 0, 255]));
            img.save(&image_path).unwrap();

            let loaded = load_image(&image_path).unwrap();
            assert_eq!(loaded.dimensions(), (10, 10));
        }

        #[test]
        fn test_load_image_nonexistent() {
            let result = load_image(Path::new("/nonexistent/image.png"));
            assert!(matches!(result, Err(ArchflashError::ImageLoad(_))));
        }
    }
}
