//! Bit-packed binary hash.

use super::{write_bracketed, Descriptor};
use crate::error::HashError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A bit-packed hash.
///
/// Bit `i` lives in byte `i / 8` at bit `i % 8` (least significant first).
/// Bits past the logical length are always zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BinaryHash {
    bytes: Vec<u8>,
}

impl BinaryHash {
    /// Allocate a zeroed hash able to hold `bits` bits.
    pub fn new(bits: usize) -> Self {
        Self {
            bytes: vec![0; bits.div_ceil(8)],
        }
    }

    /// Wrap raw bytes (for restoring stored hashes)
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Set bit `index` using least-significant-first order within each byte.
    pub fn set(&mut self, index: usize) -> Result<(), HashError> {
        let byte = self.byte_mut(index)?;
        *byte |= 1 << (index % 8);
        Ok(())
    }

    /// Set bit `index` using most-significant-first order within each byte.
    pub fn set_reverse(&mut self, index: usize) -> Result<(), HashError> {
        let byte = self.byte_mut(index)?;
        *byte |= 1 << (7 - index % 8);
        Ok(())
    }

    /// Read bit `index` in least-significant-first order.
    ///
    /// Returns `None` when the index is past the stored bytes.
    pub fn get(&self, index: usize) -> Option<bool> {
        self.bytes
            .get(index / 8)
            .map(|byte| byte & (1 << (index % 8)) != 0)
    }

    /// Raw hash bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Capacity in bits
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8
    }

    /// Number of set bits
    pub fn count_ones(&self) -> u32 {
        self.bytes.iter().map(|b| b.count_ones()).sum()
    }

    /// Lowercase hexadecimal rendering, two digits per byte.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    fn byte_mut(&mut self, index: usize) -> Result<&mut u8, HashError> {
        let len = self.bytes.len();
        self.bytes
            .get_mut(index / 8)
            .ok_or(HashError::OutOfBounds { index, len })
    }
}

impl Descriptor for BinaryHash {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn value_at(&self, index: usize) -> f64 {
        self.bytes[index] as f64
    }

    fn distance(&self, other: &Self) -> f64 {
        self.bytes
            .iter()
            .zip(other.bytes.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum::<u32>() as f64
    }
}

impl fmt::Display for BinaryHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_bracketed(f, &self.bytes)
    }
}
