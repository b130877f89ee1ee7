//! Average Hash (aHash) implementation.
//!
//! 1. Resize the grayscale image to 8x8
//! 2. Compute the mean brightness
//! 3. For each pixel: bit is 1 when brighter than the mean

use super::fast_decode::FastDecoder;
use super::fast_resize::FastResizer;
use super::value::ImageHashValue;
use crate::error::DescriptorError;
use image::{DynamicImage, GrayImage};
use std::path::Path;

const HASH_SIZE: u32 = 8;

/// Average Hash (aHash) hasher. Cheap to create; holds no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct AverageHasher;

impl AverageHasher {
    pub fn new() -> Self {
        Self
    }

    /// Decode and hash an image file
    pub fn hash_file(&self, path: &Path) -> Result<ImageHashValue, DescriptorError> {
        let image = FastDecoder::decode(path)?;
        self.hash_image(&image, path)
    }

    /// Hash an already decoded image; `path` is only used for error context
    pub fn hash_image(
        &self,
        image: &DynamicImage,
        path: &Path,
    ) -> Result<ImageHashValue, DescriptorError> {
        let gray = FastResizer::new().resize_to_grayscale(image, HASH_SIZE, HASH_SIZE, path)?;
        Ok(hash_grayscale(&gray))
    }
}

fn hash_grayscale(gray: &GrayImage) -> ImageHashValue {
    let pixels: Vec<u8> = gray.pixels().map(|p| p[0]).collect();
    let mean = pixels.iter().map(|&p| p as f64).sum::<f64>() / pixels.len().max(1) as f64;

    let bits = pixels
        .iter()
        .fold(0u64, |acc, &p| (acc << 1) | u64::from(p as f64 > mean));
    ImageHashValue::new(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, _| {
            let v = (x * 255 / width.max(1)) as u8;
            Rgb([v, v, v])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn uniform_image_hashes_to_zero() {
        let gray: GrayImage = ImageBuffer::from_pixel(8, 8, Luma([128u8]));
        assert_eq!(hash_grayscale(&gray).bits(), 0);
    }

    #[test]
    fn left_dark_right_bright_sets_right_half() {
        let gray: GrayImage =
            ImageBuffer::from_fn(8, 8, |x, _| Luma([if x < 4 { 0u8 } else { 255u8 }]));
        assert_eq!(hash_grayscale(&gray).bits(), 0x0F0F_0F0F_0F0F_0F0F);
    }

    #[test]
    fn rescaled_copy_is_within_one_bit() {
        let hasher = AverageHasher::new();
        let path = Path::new("memory");

        let large = hasher.hash_image(&gradient(400, 300), path).unwrap();
        let small = hasher.hash_image(&gradient(200, 150), path).unwrap();

        assert!(large.distance(&small) <= 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = AverageHasher::new().hash_file(Path::new("/nonexistent/a.png"));
        assert!(result.is_err());
    }
}
