//! # Media Module
//!
//! Perceptual descriptors and the backend that computes them.
//!
//! ## Descriptors
//! - Images: 64-bit average hash, compared by Hamming distance
//! - Videos: number of frames of the first video stream
//!
//! A failure to compute either becomes `MediaDescriptor::Unavailable`,
//! which never matches anything.

mod probe;

pub use probe::FfprobeFrameCounter;

use crate::core::hasher::{AverageHasher, ImageHashValue};
use crate::core::scanner::MediaKind;
use crate::error::DescriptorError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Perceptual signature of one media file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaDescriptor {
    ImageHash(ImageHashValue),
    VideoFrameCount(u64),
    Unavailable,
}

impl MediaDescriptor {
    pub fn is_available(&self) -> bool {
        !matches!(self, MediaDescriptor::Unavailable)
    }
}

/// Computes descriptors; each call may fail independently.
///
/// Implement this trait to plug another decoder or a test stub.
pub trait MediaBackend: Send + Sync {
    fn image_hash(&self, path: &Path) -> Result<ImageHashValue, DescriptorError>;

    fn frame_count(&self, path: &Path) -> Result<u64, DescriptorError>;

    /// Descriptor for a file of the given kind; failures fold into `Unavailable`
    fn describe(&self, path: &Path, kind: MediaKind) -> MediaDescriptor {
        let result = match kind {
            MediaKind::Image => self.image_hash(path).map(MediaDescriptor::ImageHash),
            MediaKind::Video => self.frame_count(path).map(MediaDescriptor::VideoFrameCount),
            MediaKind::Other => Err(DescriptorError::UnsupportedKind {
                path: path.to_path_buf(),
            }),
        };

        result.unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            MediaDescriptor::Unavailable
        })
    }
}

/// Default backend: average hash for images, ffprobe for videos
#[derive(Debug, Clone, Default)]
pub struct FileMediaBackend {
    hasher: AverageHasher,
    frames: FfprobeFrameCounter,
}

impl FileMediaBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another ffprobe executable
    pub fn with_ffprobe(mut self, program: impl Into<String>) -> Self {
        self.frames = FfprobeFrameCounter::new(program);
        self
    }
}

impl MediaBackend for FileMediaBackend {
    fn image_hash(&self, path: &Path) -> Result<ImageHashValue, DescriptorError> {
        self.hasher.hash_file(path)
    }

    fn frame_count(&self, path: &Path) -> Result<u64, DescriptorError> {
        self.frames.count(path)
    }
}
