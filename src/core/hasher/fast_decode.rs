//! Image decoding with a fast path for JPEG.
//!
//! JPEG files go through zune-jpeg; anything else, or a JPEG zune cannot
//! handle, falls back to the image crate.

use crate::error::DescriptorError;
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use std::fs;
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Decoder picking the fastest available path per format
pub struct FastDecoder;

impl FastDecoder {
    pub fn decode(path: &Path) -> Result<DynamicImage, DescriptorError> {
        if is_jpeg(path) {
            Self::decode_jpeg(path).or_else(|_| Self::decode_fallback(path))
        } else {
            Self::decode_fallback(path)
        }
    }

    fn decode_jpeg(path: &Path) -> Result<DynamicImage, DescriptorError> {
        let bytes = fs::read(path).map_err(|e| DescriptorError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let decode_error = |reason: String| DescriptorError::Decode {
            path: path.to_path_buf(),
            reason,
        };

        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(&bytes, options);
        let pixels = decoder
            .decode()
            .map_err(|e| decode_error(format!("zune-jpeg: {:?}", e)))?;
        let info = decoder
            .info()
            .ok_or_else(|| decode_error("missing image info".to_string()))?;
        let (width, height) = (info.width as u32, info.height as u32);

        let image = match decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB) {
            ColorSpace::RGB => RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
            ColorSpace::RGBA => {
                RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8)
            }
            ColorSpace::Luma => {
                GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8)
            }
            other => return Err(decode_error(format!("unsupported colorspace {:?}", other))),
        };

        image.ok_or_else(|| decode_error("pixel buffer size mismatch".to_string()))
    }

    fn decode_fallback(path: &Path) -> Result<DynamicImage, DescriptorError> {
        image::open(path).map_err(|e| match e {
            image::ImageError::IoError(source) => DescriptorError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => DescriptorError::Decode {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })
    }
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}
