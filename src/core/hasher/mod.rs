//! # Hasher Module
//!
//! Average hash (aHash) of images, the default image descriptor.
//!
//! ## How It Works
//! 1. Decode the image (zune-jpeg for JPEG, image crate otherwise)
//! 2. Convert to grayscale and resize to 8x8
//! 3. Set one bit per pixel brighter than the mean
//! 4. Compare hashes using Hamming distance
//!
//! A distance of 0 means visually identical at hash resolution; re-encoded
//! or slightly resized copies usually stay within 1 or 2 bits.
//!
//! ## Example
//! ```rust,ignore
//! let hasher = AverageHasher::new();
//! let a = hasher.hash_file(Path::new("IMG_1.jpg"))?;
//! let b = hasher.hash_file(Path::new("IMG_1_shrink.jpg"))?;
//! assert!(a.distance(&b) <= 1);
//! ```

mod average;
pub mod fast_decode;
pub mod fast_resize;
mod value;

pub use average::AverageHasher;
pub use fast_decode::FastDecoder;
pub use fast_resize::FastResizer;
pub use value::ImageHashValue;
