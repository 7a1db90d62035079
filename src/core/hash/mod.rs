//! # Hash Module
//!
//! Descriptor types produced by the hashers.
//!
//! ## Variants
//! - **Binary** - bit-packed hash, compared with Hamming-style metrics
//! - **UInt8** - byte vector, compared with L1/L2/chi-square and friends
//! - **Float64** - float vector, compared with L2/cosine
//!
//! `HashValue` is the tagged union returned by every hasher. Metrics match on
//! the tag, so two descriptors of different variants never compare.

mod binary;
mod numeric;

pub use binary::BinaryHash;
pub use numeric::{Float64Hash, UInt8Hash};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Common read access shared by all descriptor variants.
pub trait Descriptor {
    /// Number of stored elements (bytes for binary hashes).
    fn len(&self) -> usize;

    /// Element `index` widened to `f64`.
    ///
    /// Panics if `index >= self.len()`.
    fn value_at(&self, index: usize) -> f64;

    /// Distance to another descriptor of the same variant under the variant's
    /// natural metric (Hamming for binary, L2 otherwise).
    fn distance(&self, other: &Self) -> f64;

    /// Whether the descriptor holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over all elements as `f64`.
    fn values(&self) -> Vec<f64> {
        (0..self.len()).map(|i| self.value_at(i)).collect()
    }
}

/// Tag identifying a descriptor variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashVariant {
    Binary,
    UInt8,
    Float64,
}

impl fmt::Display for HashVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashVariant::Binary => write!(f, "binary"),
            HashVariant::UInt8 => write!(f, "uint8"),
            HashVariant::Float64 => write!(f, "float64"),
        }
    }
}

/// A computed image descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum HashValue {
    Binary(BinaryHash),
    UInt8(UInt8Hash),
    Float64(Float64Hash),
}

impl HashValue {
    /// The variant tag of this descriptor.
    pub fn variant(&self) -> HashVariant {
        match self {
            HashValue::Binary(_) => HashVariant::Binary,
            HashValue::UInt8(_) => HashVariant::UInt8,
            HashValue::Float64(_) => HashVariant::Float64,
        }
    }

    pub fn as_binary(&self) -> Option<&BinaryHash> {
        match self {
            HashValue::Binary(hash) => Some(hash),
            _ => None,
        }
    }

    pub fn as_uint8(&self) -> Option<&UInt8Hash> {
        match self {
            HashValue::UInt8(hash) => Some(hash),
            _ => None,
        }
    }

    pub fn as_float64(&self) -> Option<&Float64Hash> {
        match self {
            HashValue::Float64(hash) => Some(hash),
            _ => None,
        }
    }
}

impl Descriptor for HashValue {
    fn len(&self) -> usize {
        match self {
            HashValue::Binary(hash) => hash.len(),
            HashValue::UInt8(hash) => hash.len(),
            HashValue::Float64(hash) => hash.len(),
        }
    }

    fn value_at(&self, index: usize) -> f64 {
        match self {
            HashValue::Binary(hash) => hash.value_at(index),
            HashValue::UInt8(hash) => hash.value_at(index),
            HashValue::Float64(hash) => hash.value_at(index),
        }
    }

    /// Natural distance; variants that differ are infinitely far apart.
    fn distance(&self, other: &Self) -> f64 {
        match (self, other) {
            (HashValue::Binary(a), HashValue::Binary(b)) => a.distance(b),
            (HashValue::UInt8(a), HashValue::UInt8(b)) => a.distance(b),
            (HashValue::Float64(a), HashValue::Float64(b)) => a.distance(b),
            _ => f64::INFINITY,
        }
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashValue::Binary(hash) => hash.fmt(f),
            HashValue::UInt8(hash) => hash.fmt(f),
            HashValue::Float64(hash) => hash.fmt(f),
        }
    }
}

impl From<BinaryHash> for HashValue {
    fn from(hash: BinaryHash) -> Self {
        HashValue::Binary(hash)
    }
}

impl From<UInt8Hash> for HashValue {
    fn from(hash: UInt8Hash) -> Self {
        HashValue::UInt8(hash)
    }
}

impl From<Float64Hash> for HashValue {
    fn from(hash: Float64Hash) -> Self {
        HashValue::Float64(hash)
    }
}

/// Writes `[v0 v1 ... vn]` for any displayable sequence.
pub(crate) fn write_bracketed<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    values: &[T],
) -> fmt::Result {
    write!(f, "[")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", value)?;
    }
    write!(f, "]")
}
