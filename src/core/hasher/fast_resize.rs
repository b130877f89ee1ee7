//! SIMD-accelerated grayscale downscaling via fast_image_resize.

use crate::error::DescriptorError;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, GrayImage};
use std::path::Path;

/// Reusable resizer; keeps its scratch buffers between calls
pub struct FastResizer {
    resizer: Resizer,
}

impl FastResizer {
    pub fn new() -> Self {
        Self {
            resizer: Resizer::new(),
        }
    }

    /// Convert to grayscale, then resize to `width` x `height`.
    ///
    /// `path` only labels errors.
    pub fn resize_to_grayscale(
        &mut self,
        image: &DynamicImage,
        width: u32,
        height: u32,
        path: &Path,
    ) -> Result<GrayImage, DescriptorError> {
        let fail = |reason: String| DescriptorError::Decode {
            path: path.to_path_buf(),
            reason,
        };

        let gray = image.to_luma8();
        let (src_width, src_height) = gray.dimensions();
        if src_width == 0 || src_height == 0 || width == 0 || height == 0 {
            return Err(fail(format!(
                "cannot resize {}x{} to {}x{}",
                src_width, src_height, width, height
            )));
        }

        let src = Image::from_vec_u8(src_width, src_height, gray.into_raw(), PixelType::U8)
            .map_err(|e| fail(format!("source buffer: {}", e)))?;
        let mut dst = Image::new(width, height, PixelType::U8);

        let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
        self.resizer
            .resize(&src, &mut dst, &options)
            .map_err(|e| fail(format!("resize: {}", e)))?;

        GrayImage::from_raw(width, height, dst.into_vec())
            .ok_or_else(|| fail("result buffer size mismatch".to_string()))
    }
}

impl Default for FastResizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn checkerboard(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            if (x / 10 + y / 10) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn resize_produces_requested_dimensions() {
        let resized = FastResizer::new()
            .resize_to_grayscale(&checkerboard(120, 80), 8, 8, Path::new("mem"))
            .unwrap();
        assert_eq!(resized.dimensions(), (8, 8));
    }

    #[test]
    fn resizer_can_be_reused() {
        let mut resizer = FastResizer::new();
        let image = checkerboard(50, 50);
        let first = resizer.resize_to_grayscale(&image, 8, 8, Path::new("mem")).unwrap();
        let second = resizer.resize_to_grayscale(&image, 8, 8, Path::new("mem")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn zero_sized_target_is_rejected() {
        let result =
            FastResizer::new().resize_to_grayscale(&checkerboard(10, 10), 0, 8, Path::new("mem"));
        assert!(matches!(result, Err(DescriptorError::Decode { .. })));
    }
}
