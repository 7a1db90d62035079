//! Distance functions over descriptors.
//!
//! Numeric metrics accept any [`Descriptor`] and iterate over the shorter of
//! the two inputs unless noted otherwise.

use crate::core::hash::{BinaryHash, Descriptor};
use crate::error::CompareError;

/// Guard added to the correlation denominator.
const CORRELATION_EPSILON: f64 = 1e-12;

/// Number of differing bits.
pub fn hamming(a: &BinaryHash, b: &BinaryHash) -> f64 {
    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum::<u32>() as f64
}

/// Hamming distance with one weight per byte.
///
/// `weights` must have exactly as many entries as the shorter hash has bytes.
pub fn weighted_hamming(a: &BinaryHash, b: &BinaryHash, weights: &[f64]) -> Result<f64, CompareError> {
    let len = a.len().min(b.len());
    if weights.len() != len {
        return Err(CompareError::HashLengthMismatch {
            expected: len,
            found: weights.len(),
        });
    }
    Ok(a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .zip(weights)
        .map(|((x, y), w)| (x ^ y).count_ones() as f64 * w)
        .sum())
}

fn pairs<'a, A, B>(a: &'a A, b: &'a B) -> impl Iterator<Item = (f64, f64)> + 'a
where
    A: Descriptor + ?Sized,
    B: Descriptor + ?Sized,
{
    (0..a.len().min(b.len())).map(move |i| (a.value_at(i), b.value_at(i)))
}

/// Manhattan distance.
pub fn l1<A: Descriptor + ?Sized, B: Descriptor + ?Sized>(a: &A, b: &B) -> f64 {
    pairs(a, b).map(|(x, y)| (x - y).abs()).sum()
}

/// Euclidean distance.
pub fn l2<A: Descriptor + ?Sized, B: Descriptor + ?Sized>(a: &A, b: &B) -> f64 {
    pairs(a, b).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt()
}

/// `1 - cos(a, b)`, in `[0, 2]`; `0` when either vector has zero norm.
pub fn cosine<A: Descriptor + ?Sized, B: Descriptor + ?Sized>(a: &A, b: &B) -> f64 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0, 0.0, 0.0);
    for (x, y) in pairs(a, b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 2.0)
}

/// `Σ (a - b)² / (a + b)`, skipping positions where `a + b == 0`.
pub fn chi_square<A: Descriptor + ?Sized, B: Descriptor + ?Sized>(a: &A, b: &B) -> f64 {
    pairs(a, b)
        .filter(|(x, y)| x + y != 0.0)
        .map(|(x, y)| (x - y) * (x - y) / (x + y))
        .sum()
}

/// `1 - |a ∧ b| / |a ∨ b|` over set bits; bytes past the shorter hash count
/// towards the union only. Two empty sets have distance `0`.
pub fn jaccard(a: &BinaryHash, b: &BinaryHash) -> f64 {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let shared = a.len().min(b.len());

    let mut intersection = 0u32;
    let mut union = 0u32;
    for (x, y) in a.iter().zip(b) {
        intersection += (x & y).count_ones();
        union += (x | y).count_ones();
    }
    let tail = if a.len() > shared { &a[shared..] } else { &b[shared..] };
    union += tail.iter().map(|x| x.count_ones()).sum::<u32>();

    if union == 0 {
        return 0.0;
    }
    1.0 - intersection as f64 / union as f64
}

/// Fraction of positions that differ between two MinHash-style signatures.
pub fn jaccard_signature<A, B>(a: &A, b: &B) -> Result<f64, CompareError>
where
    A: Descriptor + ?Sized,
    B: Descriptor + ?Sized,
{
    if a.len() != b.len() {
        return Err(CompareError::HashLengthMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }
    if a.is_empty() {
        return Ok(0.0);
    }
    let equal = pairs(a, b).filter(|(x, y)| x == y).count();
    Ok(1.0 - equal as f64 / a.len() as f64)
}

/// Peak normalized cross-correlation over all cyclic shifts of `b`.
///
/// Returns a correlation, not a distance: `1.0` for identical non-constant
/// vectors, `0.0` when either vector is constant or empty.
pub fn peak_cross_correlation<A, B>(a: &A, b: &B) -> Result<f64, CompareError>
where
    A: Descriptor + ?Sized,
    B: Descriptor + ?Sized,
{
    if a.len() != b.len() {
        return Err(CompareError::HashLengthMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }
    let n = a.len();
    if n == 0 {
        return Ok(0.0);
    }

    let centre = |values: Vec<f64>| {
        let mean = values.iter().sum::<f64>() / n as f64;
        let centred: Vec<f64> = values.iter().map(|v| v - mean).collect();
        let sigma = (centred.iter().map(|v| v * v).sum::<f64>() / n as f64).sqrt();
        (centred, sigma)
    };
    let (x, sigma_x) = centre(a.values());
    let (y, sigma_y) = centre(b.values());
    let denominator = n as f64 * sigma_x * sigma_y + CORRELATION_EPSILON;

    let peak = (0..n)
        .map(|shift| {
            let numerator: f64 = x
                .iter()
                .enumerate()
                .map(|(i, xv)| xv * y[(i + shift) % n])
                .sum();
            numerator / denominator
        })
        .fold(f64::NEG_INFINITY, f64::max);
    Ok(peak)
}
