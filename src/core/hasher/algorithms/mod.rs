//! Hash algorithm implementations.

mod average;
mod block_mean;
mod bovw;
mod cld;
mod color_moment;
mod difference;
mod ehd;
mod gist;
mod hog;
mod lbp;
mod marr_hildreth;
mod median;
mod pdq;
mod perceptual;
mod radial_variance;
mod rash;
mod whash;
mod zernike;

pub use average::{AverageConfig, AverageHasher};
pub use block_mean::{BlockMeanConfig, BlockMeanHasher, BlockMeanMethod};
pub use bovw::{BoVWConfig, BoVWFeatureType, BoVWHasher, BoVWStorageType};
pub use cld::{CldConfig, CldHasher};
pub use color_moment::{ColorMomentConfig, ColorMomentHasher};
pub use difference::{DifferenceConfig, DifferenceHasher};
pub use ehd::{EhdConfig, EhdHasher};
pub use gist::{GistConfig, GistHasher};
pub use hog::{HogConfig, HogHasher};
pub use lbp::{LbpConfig, LbpHasher};
pub use marr_hildreth::{MarrHildrethConfig, MarrHildrethHasher};
pub use median::{MedianConfig, MedianHasher};
pub use pdq::{PdqConfig, PdqHasher};
pub use perceptual::{PHashConfig, PerceptualHasher};
pub use radial_variance::{RadialVarianceConfig, RadialVarianceHasher};
pub use rash::{RashConfig, RashHasher};
pub use whash::{WHashConfig, WHashHasher};
pub use zernike::{ZernikeConfig, ZernikeHasher};

use crate::core::hash::BinaryHash;
use crate::error::HashError;

/// Packs one bit per predicate result, LSB-first within each byte.
fn threshold_bits<I>(bits: I) -> Result<BinaryHash, HashError>
where
    I: ExactSizeIterator<Item = bool>,
{
    let mut hash = BinaryHash::new(bits.len());
    for (index, bit) in bits.enumerate() {
        if bit {
            hash.set(index)?;
        }
    }
    Ok(hash)
}
