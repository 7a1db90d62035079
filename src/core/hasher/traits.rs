//! Trait definitions for image hashing.

use crate::core::hash::{Descriptor, HashValue, HashVariant};
use crate::core::similarity::Metric;
use crate::error::{CompareError, ConfigError, HashError};
use image::{DynamicImage, ImageError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Available hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithmKind {
    /// Average Hash (aHash)
    Average,
    /// Median Hash (mHash)
    Median,
    /// Difference Hash (dHash)
    Difference,
    /// DCT perceptual hash (pHash)
    PHash,
    BlockMean,
    MarrHildreth,
    RadialVariance,
    ColorMoment,
    /// MPEG-7 Color Layout Descriptor
    Cld,
    /// MPEG-7 Edge Histogram Descriptor
    Ehd,
    /// Histogram of oriented gradients
    Hog,
    /// Local binary patterns
    Lbp,
    /// Wavelet hash
    WHash,
    Pdq,
    /// Rotation-aware spatial hash
    Rash,
    Zernike,
    Gist,
    /// Bag of visual words
    BoVW,
}

impl HashAlgorithmKind {
    pub const ALL: [HashAlgorithmKind; 18] = [
        HashAlgorithmKind::Average,
        HashAlgorithmKind::Median,
        HashAlgorithmKind::Difference,
        HashAlgorithmKind::PHash,
        HashAlgorithmKind::BlockMean,
        HashAlgorithmKind::MarrHildreth,
        HashAlgorithmKind::RadialVariance,
        HashAlgorithmKind::ColorMoment,
        HashAlgorithmKind::Cld,
        HashAlgorithmKind::Ehd,
        HashAlgorithmKind::Hog,
        HashAlgorithmKind::Lbp,
        HashAlgorithmKind::WHash,
        HashAlgorithmKind::Pdq,
        HashAlgorithmKind::Rash,
        HashAlgorithmKind::Zernike,
        HashAlgorithmKind::Gist,
        HashAlgorithmKind::BoVW,
    ];

    /// Get a human-readable description of the algorithm
    pub fn description(&self) -> &'static str {
        match self {
            HashAlgorithmKind::Average => "Average Hash (aHash) - pixels brighter than the mean",
            HashAlgorithmKind::Median => "Median Hash (mHash) - pixels brighter than the median",
            HashAlgorithmKind::Difference => {
                "Difference Hash (dHash) - brightness gradients between neighbouring pixels"
            }
            HashAlgorithmKind::PHash => "Perceptual Hash (pHash) - low-frequency DCT coefficients",
            HashAlgorithmKind::BlockMean => "Block Mean Hash - block means against the image mean",
            HashAlgorithmKind::MarrHildreth => {
                "Marr-Hildreth Hash - Laplacian-of-Gaussian edge energy in blocks"
            }
            HashAlgorithmKind::RadialVariance => {
                "Radial Variance Hash - DCT of variance along radial projections"
            }
            HashAlgorithmKind::ColorMoment => "Color Moment Hash - Hu moments in HSV and YCrCb",
            HashAlgorithmKind::Cld => "Color Layout Descriptor (MPEG-7) - DCT of an 8x8 YCbCr grid",
            HashAlgorithmKind::Ehd => "Edge Histogram Descriptor (MPEG-7) - local edge orientations",
            HashAlgorithmKind::Hog => "HOG Hash - histograms of oriented gradients per cell",
            HashAlgorithmKind::Lbp => "LBP Hash - histograms of local binary patterns",
            HashAlgorithmKind::WHash => "Wavelet Hash (wHash) - Haar LL band against its median",
            HashAlgorithmKind::Pdq => "PDQ - box-filtered DCT against its median, 256 bits",
            HashAlgorithmKind::Rash => "RASH - DCT of concentric ring means, rotation tolerant",
            HashAlgorithmKind::Zernike => "Zernike Hash - magnitudes of Zernike moments",
            HashAlgorithmKind::Gist => "GIST - pooled Gabor filter energies",
            HashAlgorithmKind::BoVW => "Bag of Visual Words - quantized keypoint descriptors",
        }
    }

    /// Short name used by `Display` and accepted by `FromStr`.
    pub fn short_name(&self) -> &'static str {
        match self {
            HashAlgorithmKind::Average => "ahash",
            HashAlgorithmKind::Median => "mhash",
            HashAlgorithmKind::Difference => "dhash",
            HashAlgorithmKind::PHash => "phash",
            HashAlgorithmKind::BlockMean => "blockmean",
            HashAlgorithmKind::MarrHildreth => "marrhildreth",
            HashAlgorithmKind::RadialVariance => "radialvariance",
            HashAlgorithmKind::ColorMoment => "colormoment",
            HashAlgorithmKind::Cld => "cld",
            HashAlgorithmKind::Ehd => "ehd",
            HashAlgorithmKind::Hog => "hog",
            HashAlgorithmKind::Lbp => "lbp",
            HashAlgorithmKind::WHash => "whash",
            HashAlgorithmKind::Pdq => "pdq",
            HashAlgorithmKind::Rash => "rash",
            HashAlgorithmKind::Zernike => "zernike",
            HashAlgorithmKind::Gist => "gist",
            HashAlgorithmKind::BoVW => "bovw",
        }
    }
}

impl std::fmt::Display for HashAlgorithmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for HashAlgorithmKind {
    type Err = ConfigError;

    /// Accepts short names and their long forms, ignoring case and `-`/`_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        let kind = match key.as_str() {
            "average" => Some(HashAlgorithmKind::Average),
            "median" => Some(HashAlgorithmKind::Median),
            "difference" => Some(HashAlgorithmKind::Difference),
            "perceptual" => Some(HashAlgorithmKind::PHash),
            "wavelet" => Some(HashAlgorithmKind::WHash),
            _ => HashAlgorithmKind::ALL
                .into_iter()
                .find(|kind| kind.short_name() == key),
        };
        kind.ok_or_else(|| ConfigError::UnknownAlgorithm(s.to_string()))
    }
}

/// Trait for hash algorithm implementations
///
/// Hashers are immutable once built, so one instance can hash images from
/// many threads at once.
pub trait HashAlgorithm: Send + Sync {
    /// Compute a descriptor from an already-loaded image
    fn calculate(&self, image: &DynamicImage) -> Result<HashValue, HashError>;

    /// Get the algorithm kind
    fn kind(&self) -> HashAlgorithmKind;

    /// Variant and length of every descriptor this hasher produces.
    fn shape(&self) -> (HashVariant, usize);

    /// Metric used by [`HashAlgorithm::compare`].
    fn metric(&self) -> &Metric;

    /// Distance between two descriptors produced by this hasher.
    ///
    /// Both inputs must have the expected variant and length.
    fn compare(&self, a: &HashValue, b: &HashValue) -> Result<f64, CompareError> {
        let (variant, len) = self.shape();
        for hash in [a, b] {
            if hash.variant() != variant {
                return Err(CompareError::IncompatibleHash {
                    expected: variant,
                    found: hash.variant(),
                });
            }
        }
        for hash in [a, b] {
            if hash.len() != len {
                return Err(CompareError::HashLengthMismatch {
                    expected: len,
                    found: hash.len(),
                });
            }
        }
        self.metric().distance(a, b)
    }

    /// Decode an image file and compute its descriptor.
    fn hash_file(&self, path: &Path) -> Result<HashValue, HashError> {
        let image = image::open(path).map_err(|e| match e {
            ImageError::IoError(source) => HashError::IoError {
                path: path.to_path_buf(),
                source,
            },
            other => HashError::DecodeError {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })?;
        self.calculate(&image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_kind_display() {
        assert_eq!(HashAlgorithmKind::Average.to_string(), "ahash");
        assert_eq!(HashAlgorithmKind::Difference.to_string(), "dhash");
        assert_eq!(HashAlgorithmKind::PHash.to_string(), "phash");
        assert_eq!(HashAlgorithmKind::BoVW.to_string(), "bovw");
    }

    #[test]
    fn every_kind_round_trips_through_its_name() {
        for kind in HashAlgorithmKind::ALL {
            assert_eq!(kind.to_string().parse::<HashAlgorithmKind>(), Ok(kind));
            assert!(!kind.description().is_empty());
        }
    }

    #[test]
    fn parses_long_names() {
        assert_eq!("Average".parse(), Ok(HashAlgorithmKind::Average));
        assert_eq!("marr-hildreth".parse(), Ok(HashAlgorithmKind::MarrHildreth));
        assert_eq!("Block_Mean".parse(), Ok(HashAlgorithmKind::BlockMean));
        assert_eq!(
            "sha256".parse::<HashAlgorithmKind>(),
            Err(ConfigError::UnknownAlgorithm("sha256".into()))
        );
    }
}
