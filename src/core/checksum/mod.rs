//! # Checksum Module
//!
//! Fast non-cryptographic content digest (xxh3, 64 bit).
//!
//! Only used to confirm equal-sized pairs; collisions are accepted.
//! Files above `MMAP_THRESHOLD` are memory-mapped instead of read into a
//! buffer.

use crate::error::DescriptorError;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use xxhash_rust::xxh3::xxh3_64;

/// Files at least this big are hashed through a memory map
pub const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Digest the whole content of a file
pub fn file_checksum(path: &Path) -> Result<u64, DescriptorError> {
    let io_error = |source| DescriptorError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_error)?;
    let len = file.metadata().map_err(io_error)?.len();

    if len >= MMAP_THRESHOLD {
        // SAFETY: the map is read-only and dropped before returning; a file
        // truncated concurrently can fault, like any mmap reader.
        let map = unsafe { Mmap::map(&file) }.map_err(io_error)?;
        Ok(xxh3_64(&map))
    } else {
        let bytes = std::fs::read(path).map_err(io_error)?;
        Ok(xxh3_64(&bytes))
    }
}
