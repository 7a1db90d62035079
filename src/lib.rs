//! # Image Hashes
//!
//! Perceptual image hashing: eighteen algorithms over one shared
//! image-processing core.
//!
//! ## Core Philosophy
//! - **Deterministic** - the same image and configuration always give the same descriptor
//! - **Validated up front** - a configuration that fails validation never yields a hasher
//! - **Never panic on caller data** - empty images and mismatched hashes are errors
//!
//! ## Architecture
//! - `core` - image primitives, descriptors, metrics and the hashers
//! - `error` - error types split by phase (configuration, hashing, comparison)
//!
//! ## Example
//! ```rust
//! use image::{DynamicImage, GrayImage, Luma};
//! use image_hashes::{HashAlgorithm, PerceptualHasher};
//!
//! let img = DynamicImage::ImageLuma8(GrayImage::from_fn(64, 64, |x, y| Luma([(x ^ y) as u8])));
//! let hasher = PerceptualHasher::new();
//! let hash = hasher.calculate(&img)?;
//! assert_eq!(hasher.compare(&hash, &hash)?, 0.0);
//! # Ok::<(), image_hashes::ImageHashError>(())
//! ```

pub mod core;
pub mod error;

// Re-export commonly used types at the crate root
pub use crate::core::hash::{BinaryHash, Descriptor, Float64Hash, HashValue, HashVariant, UInt8Hash};
pub use crate::core::hasher::*;
pub use crate::core::imgproc::Interpolation;
pub use crate::core::similarity::{compare, compare_with, DistanceFn, Metric};
pub use error::{CompareError, ConfigError, HashError, ImageHashError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. Filtering follows
/// `RUST_LOG`. Installing a second subscriber is a no-op.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    // fails only when a global subscriber is already set
    let _ = tracing::subscriber::set_global_default(subscriber);
}
