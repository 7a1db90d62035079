//! # Core Module
//!
//! The hashing engine, bottom-up.
//!
//! ## Modules
//! - `imgproc` - resize, color conversion, filtering and transforms
//! - `hash` - descriptor types produced by the hashers
//! - `similarity` - distance metrics between descriptors
//! - `hasher` - the hash algorithms and their configuration

pub mod hash;
pub mod hasher;
pub mod imgproc;
pub mod similarity;

// Re-export commonly used types
pub use hash::{HashValue, HashVariant};
pub use hasher::{HashAlgorithm, HashAlgorithmKind, HasherConfig};
pub use similarity::Metric;
