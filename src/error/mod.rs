//! # Error Module
//!
//! Error types for hashing, configuration and comparison.
//!
//! ## Design Principles
//! - **Never panic** on caller data - return errors instead
//! - **Separate phases** - construction, calculation and comparison fail differently
//! - **Include context** - the offending value travels with the error

use crate::core::hash::HashVariant;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level library error
#[derive(Error, Debug)]
pub enum ImageHashError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Comparison error: {0}")]
    Compare(#[from] CompareError),
}

/// Validation errors returned while building a hasher
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid size {width}x{height}: width and height must be non-zero")]
    InvalidSize { width: u32, height: u32 },

    #[error("Invalid block size {width}x{height}: width and height must be non-zero")]
    InvalidBlockSize { width: u32, height: u32 },

    #[error("Invalid number of angles: {0} (must be positive)")]
    InvalidAngles(u32),

    #[error("Invalid Gaussian kernel size: {0} (must be a positive odd number)")]
    InvalidKernelSize(u32),

    #[error("Invalid scale: {0} (must be positive)")]
    InvalidScale(f64),

    #[error("Invalid alpha: {0} (must be positive)")]
    InvalidAlpha(f64),

    #[error("Invalid sigma: {0} (must not be negative)")]
    InvalidSigma(f64),

    #[error("Invalid wavelet level: {0} (must be positive)")]
    InvalidLevel(u32),

    #[error("Invalid grid size {x}x{y}: both dimensions must be non-zero")]
    InvalidGridSize { x: u32, y: u32 },

    #[error("Invalid cell size: {0} (must be positive)")]
    InvalidCellSize(u32),

    #[error("Invalid number of histogram bins: {0} (must be positive)")]
    InvalidNumBins(u32),

    #[error("Invalid interpolation: {0}")]
    InvalidInterpolation(String),

    #[error("Invalid block mean method: {0}")]
    InvalidBlockMeanMethod(String),

    #[error("Invalid Zernike degree: {0} (must be positive)")]
    InvalidDegree(u32),

    #[error("Invalid number of rings: {0} (must be positive)")]
    InvalidRings(u32),

    #[error("Invalid BoVW feature type: {0}")]
    InvalidBoVWFeatureType(String),

    #[error("Invalid BoVW storage type: {0}")]
    InvalidBoVWStorageType(String),

    #[error("Invalid vocabulary size: {0} (must be positive)")]
    InvalidVocabularySize(u32),

    #[error("Invalid keypoint count: {0} (must be positive)")]
    InvalidKeypoints(u32),

    #[error("Invalid signature size: {0}")]
    InvalidSignatureSize(u32),

    #[error("Invalid weights: expected {expected} finite values, got {found}")]
    InvalidWeights { expected: usize, found: usize },

    #[error("Unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
}

/// Errors that occur while computing a hash
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Image is nil: it has no pixels")]
    ImageIsNil,

    #[error("Bit index {index} is out of bounds for a hash of {len} bytes")]
    OutOfBounds { index: usize, len: usize },

    #[error("Resize failed: {0}")]
    ResizeError(String),

    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Failed to open image file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while comparing two hashes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompareError {
    #[error("Incompatible hash: expected {expected} descriptor, got {found}")]
    IncompatibleHash {
        expected: HashVariant,
        found: HashVariant,
    },

    #[error("Hash length mismatch: expected {expected}, got {found}")]
    HashLengthMismatch { expected: usize, found: usize },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ImageHashError>;
