//! 64-bit perceptual hash value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An 8x8 average hash packed row-major, most significant bit first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageHashValue(u64);

impl ImageHashValue {
    pub const BITS: u32 = 64;

    pub fn new(bits: u64) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u64 {
        self.0
    }

    /// Hamming distance: number of differing bits
    pub fn distance(&self, other: &Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// Similarity as a percentage (100 = identical)
    pub fn similarity(&self, other: &Self) -> f64 {
        (1.0 - self.distance(other) as f64 / Self::BITS as f64) * 100.0
    }

    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl fmt::Display for ImageHashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let hash = ImageHashValue::new(0xFF00_AA55_0F0F_F0F0);
        assert_eq!(hash.distance(&hash), 0);
        assert_eq!(hash.similarity(&hash), 100.0);
    }

    #[test]
    fn distance_is_symmetric_and_counts_bits() {
        let a = ImageHashValue::new(0b1111_0000);
        let b = ImageHashValue::new(0b0000_0001);

        assert_eq!(a.distance(&b), 5);
        assert_eq!(b.distance(&a), 5);
    }

    #[test]
    fn opposite_hashes_have_zero_similarity() {
        let a = ImageHashValue::new(u64::MAX);
        let b = ImageHashValue::new(0);
        assert_eq!(a.distance(&b), 64);
        assert_eq!(a.similarity(&b), 0.0);
    }

    #[test]
    fn hex_is_zero_padded() {
        assert_eq!(ImageHashValue::new(0xDEAD).to_hex(), "000000000000dead");
    }
}
