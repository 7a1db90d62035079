//! Parallel hashing of many images with one hasher.
//!
//! Results come back in input order, one per input. A failure only affects
//! its own entry.

use super::HashAlgorithm;
use crate::core::hash::HashValue;
use crate::error::HashError;
use image::DynamicImage;
use rayon::prelude::*;
use std::path::Path;
use tracing::warn;

/// Hash decoded images in parallel
pub fn hash_images(
    hasher: &dyn HashAlgorithm,
    images: &[DynamicImage],
) -> Vec<Result<HashValue, HashError>> {
    images
        .par_iter()
        .map(|image| {
            hasher.calculate(image).inspect_err(|e| {
                warn!(
                    algorithm = %hasher.kind(),
                    width = image.width(),
                    height = image.height(),
                    error = %e,
                    "failed to hash image"
                );
            })
        })
        .collect()
}

/// Decode and hash image files in parallel
pub fn hash_files<P>(hasher: &dyn HashAlgorithm, paths: &[P]) -> Vec<Result<HashValue, HashError>>
where
    P: AsRef<Path> + Sync,
{
    paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            hasher.hash_file(path).inspect_err(|e| {
                warn!(
                    algorithm = %hasher.kind(),
                    path = %path.display(),
                    error = %e,
                    "failed to hash file"
                );
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hasher::{AverageHasher, DifferenceHasher};
    use image::{GrayImage, Luma};

    fn gradient(offset: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(32, 32, |x, y| {
            Luma([((x * 7 + y * 3 + offset) % 256) as u8])
        }))
    }

    #[test]
    fn preserves_input_order() {
        let hasher = DifferenceHasher::new();
        let images: Vec<_> = (0..16).map(|i| gradient(i * 13)).collect();
        let results = hash_images(&hasher, &images);
        assert_eq!(results.len(), images.len());
        for (image, result) in images.iter().zip(&results) {
            assert_eq!(result.as_ref().unwrap(), &hasher.calculate(image).unwrap());
        }
    }

    #[test]
    fn empty_image_fails_alone() {
        let hasher = AverageHasher::new();
        let images = vec![gradient(0), DynamicImage::new_luma8(0, 0), gradient(5)];
        let results = hash_images(&hasher, &images);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(HashError::ImageIsNil)));
        assert!(results[2].is_ok());
    }

    #[test]
    fn missing_files_are_reported_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        gradient(3).save(&good).unwrap();
        let missing = dir.path().join("missing.png");

        let hasher = AverageHasher::new();
        let results = hash_files(&hasher, &[good.clone(), missing]);
        assert_eq!(results[0].as_ref().unwrap(), &hasher.hash_file(&good).unwrap());
        assert!(matches!(results[1], Err(HashError::IoError { .. })));
    }
}
