//! Vector-valued hashes.

use super::{write_bracketed, Descriptor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute tolerance used when comparing `Float64Hash` values for equality.
pub const FLOAT_EPSILON: f64 = 1e-9;

/// A hash made of bytes, each an independent feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UInt8Hash {
    values: Vec<u8>,
}

impl UInt8Hash {
    pub fn new(values: Vec<u8>) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.values
    }
}

impl Descriptor for UInt8Hash {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn value_at(&self, index: usize) -> f64 {
        self.values[index] as f64
    }

    fn distance(&self, other: &Self) -> f64 {
        euclidean(self, other)
    }
}

impl fmt::Display for UInt8Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_bracketed(f, &self.values)
    }
}

/// A hash made of `f64` features.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Float64Hash {
    values: Vec<f64>,
}

impl Float64Hash {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

impl PartialEq for Float64Hash {
    fn eq(&self, other: &Self) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(a, b)| (a - b).abs() <= FLOAT_EPSILON)
    }
}

impl Descriptor for Float64Hash {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn value_at(&self, index: usize) -> f64 {
        self.values[index]
    }

    fn distance(&self, other: &Self) -> f64 {
        euclidean(self, other)
    }
}

impl fmt::Display for Float64Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_bracketed(f, &self.values)
    }
}

fn euclidean<D: Descriptor>(a: &D, b: &D) -> f64 {
    (0..a.len().min(b.len()))
        .map(|i| {
            let d = a.value_at(i) - b.value_at(i);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint8_exposes_values_as_f64() {
        let hash = UInt8Hash::new(vec![0, 7, 255]);
        assert_eq!(hash.len(), 3);
        assert_eq!(hash.value_at(1), 7.0);
        assert_eq!(hash.values(), vec![0.0, 7.0, 255.0]);
    }

    #[test]
    fn float_equality_tolerates_rounding() {
        let a = Float64Hash::new(vec![0.1 + 0.2, 1.0]);
        let b = Float64Hash::new(vec![0.3, 1.0]);
        assert_eq!(a, b);
        assert_ne!(a, Float64Hash::new(vec![0.3]));
        assert_ne!(a, Float64Hash::new(vec![0.3, 1.1]));
    }

    #[test]
    fn natural_distance_is_euclidean() {
        let a = UInt8Hash::new(vec![0, 0]);
        let b = UInt8Hash::new(vec![3, 4]);
        assert_eq!(a.distance(&b), 5.0);

        let c = Float64Hash::new(vec![1.0, 1.0]);
        assert_eq!(c.distance(&c), 0.0);
    }

    #[test]
    fn display_lists_values() {
        assert_eq!(UInt8Hash::new(vec![36, 26, 31]).to_string(), "[36 26 31]");
        assert_eq!(Float64Hash::default().to_string(), "[]");
    }
}
