//! # Hasher Module
//!
//! Computes perceptual hashes and descriptors for images.
//!
//! ## Supported Algorithms
//! - **aHash / mHash / dHash** - fast 64-bit hashes from an 8x8 thumbnail
//! - **pHash / PDQ / wHash** - frequency-domain hashes (DCT, Haar wavelet)
//! - **BlockMean / MarrHildreth / RASH** - block, edge and ring based binary hashes
//! - **RadialVariance** - Radon projections, robust to rotation and scaling
//! - **ColorMoment / CLD / EHD / HOG / LBP** - color and texture descriptors
//! - **Zernike / GIST / BoVW** - moment, filter-bank and local-feature descriptors
//!
//! ## How It Works
//! 1. Every algorithm is configured through its own `*Config` builder
//! 2. `build()` validates the configuration and returns the hasher
//! 3. `calculate()` turns a `DynamicImage` into a [`HashValue`](crate::core::hash::HashValue)
//! 4. `compare()` measures the distance with the hasher's metric
//!
//! ## Example
//! ```rust,no_run
//! use image_hashes::core::hasher::{HashAlgorithm, HashAlgorithmKind, HasherConfig};
//! use std::path::Path;
//!
//! let hasher = HasherConfig::new()
//!     .algorithm(HashAlgorithmKind::PHash)
//!     .build()?;
//!
//! let a = hasher.hash_file(Path::new("a.jpg"))?;
//! let b = hasher.hash_file(Path::new("b.jpg"))?;
//! println!("distance: {}", hasher.compare(&a, &b)?);
//! # Ok::<(), image_hashes::ImageHashError>(())
//! ```

mod algorithms;
pub mod batch;
pub mod options;
mod traits;

pub use algorithms::{
    AverageConfig, AverageHasher, BlockMeanConfig, BlockMeanHasher, BlockMeanMethod, BoVWConfig,
    BoVWFeatureType, BoVWHasher, BoVWStorageType, CldConfig, CldHasher, ColorMomentConfig,
    ColorMomentHasher, DifferenceConfig, DifferenceHasher, EhdConfig, EhdHasher, GistConfig,
    GistHasher, HogConfig, HogHasher, LbpConfig, LbpHasher, MarrHildrethConfig,
    MarrHildrethHasher, MedianConfig, MedianHasher, PHashConfig, PdqConfig, PdqHasher,
    PerceptualHasher, RadialVarianceConfig, RadialVarianceHasher, RashConfig, RashHasher,
    WHashConfig, WHashHasher, ZernikeConfig, ZernikeHasher,
};
pub use options::ResizeOptions;
pub use traits::{HashAlgorithm, HashAlgorithmKind};

use crate::core::imgproc::Interpolation;
use crate::core::similarity::Metric;
use crate::error::ConfigError;

/// Configuration builder for any hasher in the catalog.
///
/// Options left unset keep the algorithm's own defaults. Size and
/// interpolation are ignored by algorithms that do not resize
/// (RadialVariance).
#[derive(Debug, Clone)]
pub struct HasherConfig {
    /// Algorithm to use
    algorithm: HashAlgorithmKind,
    /// Resize target, width by height
    size: Option<(u32, u32)>,
    interpolation: Option<Interpolation>,
    /// Distance override
    metric: Option<Metric>,
}

/// Applies the shared options to a `*Config` builder and builds it.
macro_rules! build_with {
    ($self:ident, $config:expr) => {{
        let mut config = $config;
        if let Some((width, height)) = $self.size {
            config = config.size(width, height);
        }
        if let Some(interpolation) = $self.interpolation {
            config = config.interpolation(interpolation);
        }
        if let Some(metric) = $self.metric {
            config = config.distance(metric);
        }
        Box::new(config.build()?) as Box<dyn HashAlgorithm>
    }};
}

impl HasherConfig {
    /// Create a new hasher configuration with defaults
    pub fn new() -> Self {
        Self {
            algorithm: HashAlgorithmKind::Difference,
            size: None,
            interpolation: None,
            metric: None,
        }
    }

    /// Set the hash algorithm
    pub fn algorithm(mut self, algorithm: HashAlgorithmKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the resize target
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }

    pub fn interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = Some(interpolation);
        self
    }

    /// Override the algorithm's default distance metric
    pub fn metric(mut self, metric: Metric) -> Self {
        self.metric = Some(metric);
        self
    }

    /// Build the hasher
    pub fn build(self) -> Result<Box<dyn HashAlgorithm>, ConfigError> {
        let hasher: Box<dyn HashAlgorithm> = match self.algorithm {
            HashAlgorithmKind::Average => build_with!(self, AverageHasher::builder()),
            HashAlgorithmKind::Median => build_with!(self, MedianHasher::builder()),
            HashAlgorithmKind::Difference => build_with!(self, DifferenceHasher::builder()),
            HashAlgorithmKind::PHash => build_with!(self, PerceptualHasher::builder()),
            HashAlgorithmKind::BlockMean => build_with!(self, BlockMeanHasher::builder()),
            HashAlgorithmKind::MarrHildreth => build_with!(self, MarrHildrethHasher::builder()),
            HashAlgorithmKind::RadialVariance => {
                let mut config = RadialVarianceHasher::builder();
                if let Some(metric) = self.metric {
                    config = config.distance(metric);
                }
                Box::new(config.build()?) as Box<dyn HashAlgorithm>
            }
            HashAlgorithmKind::ColorMoment => build_with!(self, ColorMomentHasher::builder()),
            HashAlgorithmKind::Cld => build_with!(self, CldHasher::builder()),
            HashAlgorithmKind::Ehd => build_with!(self, EhdHasher::builder()),
            HashAlgorithmKind::Hog => build_with!(self, HogHasher::builder()),
            HashAlgorithmKind::Lbp => build_with!(self, LbpHasher::builder()),
            HashAlgorithmKind::WHash => build_with!(self, WHashHasher::builder()),
            HashAlgorithmKind::Pdq => build_with!(self, PdqHasher::builder()),
            HashAlgorithmKind::Rash => build_with!(self, RashHasher::builder()),
            HashAlgorithmKind::Zernike => build_with!(self, ZernikeHasher::builder()),
            HashAlgorithmKind::Gist => build_with!(self, GistHasher::builder()),
            HashAlgorithmKind::BoVW => build_with!(self, BoVWHasher::builder()),
        };
        Ok(hasher)
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::HashVariant;

    #[test]
    fn config_defaults_to_dhash() {
        let config = HasherConfig::new();
        assert_eq!(config.algorithm, HashAlgorithmKind::Difference);
        assert!(config.size.is_none());
    }

    #[test]
    fn config_builder_works() {
        let config = HasherConfig::new()
            .algorithm(HashAlgorithmKind::Average)
            .size(16, 16);

        assert_eq!(config.algorithm, HashAlgorithmKind::Average);
        assert_eq!(config.size, Some((16, 16)));
    }

    #[test]
    fn build_creates_every_hasher() {
        for kind in HashAlgorithmKind::ALL {
            let hasher = HasherConfig::new().algorithm(kind).build().unwrap();
            assert_eq!(hasher.kind(), kind);
        }
    }

    #[test]
    fn shared_size_reaches_the_hasher() {
        let hasher = HasherConfig::new()
            .algorithm(HashAlgorithmKind::Average)
            .size(16, 16)
            .build()
            .unwrap();
        assert_eq!(hasher.shape(), (HashVariant::Binary, 32));
    }

    #[test]
    fn metric_override_is_applied() {
        let hasher = HasherConfig::new()
            .algorithm(HashAlgorithmKind::Hog)
            .metric(Metric::L1)
            .build()
            .unwrap();
        assert!(matches!(hasher.metric(), Metric::L1));
    }

    #[test]
    fn invalid_size_is_rejected() {
        let error = HasherConfig::new()
            .algorithm(HashAlgorithmKind::Pdq)
            .size(8, 8)
            .build()
            .err();
        assert_eq!(error, Some(ConfigError::InvalidSize { width: 8, height: 8 }));
    }
}
