//! # Similarity Module
//!
//! Distances between descriptors.
//!
//! ## Metrics
//! | Metric | Inputs | Notes |
//! |--------|--------|-------|
//! | Hamming | binary | differing bits |
//! | Weighted Hamming | binary | one weight per byte |
//! | L1 / L2 | numeric | over the shorter length |
//! | Cosine | numeric | `1 - cos`, in `[0, 2]` |
//! | Chi-square | numeric | histogram distance |
//! | Jaccard | binary | set-bit overlap |
//! | Jaccard signature | numeric | MinHash agreement, equal lengths |
//! | Peak cross-correlation | numeric | cyclic-shift invariant, equal lengths |
//!
//! [`compare`] picks Hamming for binary descriptors and L2 otherwise;
//! [`compare_with`] takes an explicit [`Metric`].

mod metrics;

pub use metrics::{
    chi_square, cosine, hamming, jaccard, jaccard_signature, l1, l2, peak_cross_correlation,
    weighted_hamming,
};

use crate::core::hash::{BinaryHash, HashValue, HashVariant};
use crate::error::{CompareError, ConfigError};
use std::fmt;
use std::str::FromStr;

/// Caller-supplied distance function.
pub type DistanceFn = fn(&HashValue, &HashValue) -> Result<f64, CompareError>;

/// Selects how two descriptors are compared.
#[derive(Debug, Clone)]
pub enum Metric {
    Hamming,
    WeightedHamming(Vec<f64>),
    L1,
    L2,
    Cosine,
    ChiSquare,
    Jaccard,
    JaccardSignature,
    PeakCrossCorrelation,
    Custom(DistanceFn),
}

impl Metric {
    /// The metric [`compare`] uses for a descriptor variant.
    pub fn default_for(variant: HashVariant) -> Self {
        match variant {
            HashVariant::Binary => Metric::Hamming,
            HashVariant::UInt8 | HashVariant::Float64 => Metric::L2,
        }
    }

    /// Raw metric value. Peak cross-correlation yields a correlation here,
    /// every other metric a distance.
    pub fn evaluate(&self, a: &HashValue, b: &HashValue) -> Result<f64, CompareError> {
        match self {
            Metric::Hamming => {
                let (a, b) = binary_pair(a, b)?;
                Ok(hamming(a, b))
            }
            Metric::WeightedHamming(weights) => {
                let (a, b) = binary_pair(a, b)?;
                weighted_hamming(a, b, weights)
            }
            Metric::Jaccard => {
                let (a, b) = binary_pair(a, b)?;
                Ok(jaccard(a, b))
            }
            Metric::L1 => same_variant(a, b).map(|_| l1(a, b)),
            Metric::L2 => same_variant(a, b).map(|_| l2(a, b)),
            Metric::Cosine => same_variant(a, b).map(|_| cosine(a, b)),
            Metric::ChiSquare => same_variant(a, b).map(|_| chi_square(a, b)),
            Metric::JaccardSignature => {
                same_variant(a, b)?;
                jaccard_signature(a, b)
            }
            Metric::PeakCrossCorrelation => {
                same_variant(a, b)?;
                peak_cross_correlation(a, b)
            }
            Metric::Custom(distance) => distance(a, b),
        }
    }

    /// Distance between `a` and `b`, with correlations turned into
    /// `max(0, 1 - pcc)`.
    pub fn distance(&self, a: &HashValue, b: &HashValue) -> Result<f64, CompareError> {
        let value = self.evaluate(a, b)?;
        Ok(match self {
            Metric::PeakCrossCorrelation => (1.0 - value).max(0.0),
            _ => value,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Hamming => "hamming",
            Metric::WeightedHamming(_) => "weighted-hamming",
            Metric::L1 => "l1",
            Metric::L2 => "l2",
            Metric::Cosine => "cosine",
            Metric::ChiSquare => "chi-square",
            Metric::Jaccard => "jaccard",
            Metric::JaccardSignature => "jaccard-signature",
            Metric::PeakCrossCorrelation => "pcc",
            Metric::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses the parameterless metrics by name.
impl FromStr for Metric {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "hamming" => Ok(Metric::Hamming),
            "l1" | "manhattan" => Ok(Metric::L1),
            "l2" | "euclidean" => Ok(Metric::L2),
            "cosine" => Ok(Metric::Cosine),
            "chi-square" | "chisquare" => Ok(Metric::ChiSquare),
            "jaccard" => Ok(Metric::Jaccard),
            "jaccard-signature" => Ok(Metric::JaccardSignature),
            "pcc" | "peak-cross-correlation" => Ok(Metric::PeakCrossCorrelation),
            _ => Err(ConfigError::UnknownMetric(s.to_string())),
        }
    }
}

fn binary_pair<'a>(
    a: &'a HashValue,
    b: &'a HashValue,
) -> Result<(&'a BinaryHash, &'a BinaryHash), CompareError> {
    let incompatible = |h: &HashValue| CompareError::IncompatibleHash {
        expected: HashVariant::Binary,
        found: h.variant(),
    };
    let a = a.as_binary().ok_or_else(|| incompatible(a))?;
    let b = b.as_binary().ok_or_else(|| incompatible(b))?;
    Ok((a, b))
}

fn same_variant(a: &HashValue, b: &HashValue) -> Result<(), CompareError> {
    if a.variant() != b.variant() {
        return Err(CompareError::IncompatibleHash {
            expected: a.variant(),
            found: b.variant(),
        });
    }
    Ok(())
}

/// Compares with the default metric of `a`'s variant.
pub fn compare(a: &HashValue, b: &HashValue) -> Result<f64, CompareError> {
    compare_with(a, b, &Metric::default_for(a.variant()))
}

/// Compares with an explicit metric.
pub fn compare_with(a: &HashValue, b: &HashValue, metric: &Metric) -> Result<f64, CompareError> {
    metric.distance(a, b)
}
