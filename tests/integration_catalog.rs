//! Integration tests across the whole algorithm catalog.
//!
//! These tests verify properties every hasher must have:
//! - Determinism, including across threads
//! - Descriptor shape matches the advertised shape
//! - Distances are zero on identical input, symmetric, and triangle-bounded
//! - Rotation robustness for the rotation-aware hashers

use image::{imageops, DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use image_hashes::{
    compare, compare_with, CompareError, Descriptor, HashAlgorithm, HashAlgorithmKind, HashValue,
    HashVariant, HasherConfig, Metric,
};
use rayon::prelude::*;

/// A synthetic photo: smooth color gradients, a bright disc and some texture.
fn photo(width: u32, height: u32, seed: u32) -> DynamicImage {
    let (cx, cy) = ((width / 3 + seed * 7) as f32, (height / 2 + seed * 3) as f32);
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        let (dx, dy) = (x as f32 - cx, y as f32 - cy);
        let disc = if dx * dx + dy * dy < (width as f32 / 5.0).powi(2) { 90 } else { 0 };
        let texture = ((x / 8 + y / 8 + seed) % 3) * 12;
        Rgb([
            ((x * 160 / width) + disc + texture).min(255) as u8,
            ((y * 160 / height) + disc / 2) as u8,
            (((x + y) * 100 / (width + height)) + texture + 40) as u8,
        ])
    }))
}

/// A very different picture: vertical bars.
fn bars(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, _| {
        Luma([if (x / 12) % 2 == 0 { 230 } else { 20 }])
    }))
}

fn hasher(kind: HashAlgorithmKind) -> Box<dyn HashAlgorithm> {
    HasherConfig::new().algorithm(kind).build().unwrap()
}

#[test]
fn every_hasher_is_deterministic() {
    let img = photo(160, 120, 1);
    for kind in HashAlgorithmKind::ALL {
        let hasher = hasher(kind);
        let a = hasher.calculate(&img).unwrap();
        let b = hasher.calculate(&img).unwrap();
        assert_eq!(a, b, "{} is not deterministic", kind);
    }
}

#[test]
fn descriptors_match_advertised_shape() {
    let img = photo(200, 150, 2);
    for kind in HashAlgorithmKind::ALL {
        let hasher = hasher(kind);
        let hash = hasher.calculate(&img).unwrap();
        let (variant, len) = hasher.shape();
        assert_eq!(hash.variant(), variant, "{}", kind);
        assert_eq!(hash.len(), len, "{}", kind);
    }
}

#[test]
fn default_shapes() {
    let expected = [
        (HashAlgorithmKind::Average, HashVariant::Binary, 8),
        (HashAlgorithmKind::Median, HashVariant::Binary, 8),
        (HashAlgorithmKind::Difference, HashVariant::Binary, 8),
        (HashAlgorithmKind::PHash, HashVariant::Binary, 8),
        (HashAlgorithmKind::BlockMean, HashVariant::Binary, 32),
        (HashAlgorithmKind::MarrHildreth, HashVariant::Binary, 72),
        (HashAlgorithmKind::RadialVariance, HashVariant::UInt8, 40),
        (HashAlgorithmKind::ColorMoment, HashVariant::Float64, 42),
        (HashAlgorithmKind::Cld, HashVariant::UInt8, 12),
        (HashAlgorithmKind::Ehd, HashVariant::UInt8, 80),
        (HashAlgorithmKind::Lbp, HashVariant::UInt8, 256),
        (HashAlgorithmKind::WHash, HashVariant::Binary, 8),
        (HashAlgorithmKind::Pdq, HashVariant::Binary, 32),
        (HashAlgorithmKind::Rash, HashVariant::Binary, 8),
        (HashAlgorithmKind::Zernike, HashVariant::Float64, 24),
        (HashAlgorithmKind::Gist, HashVariant::Float64, 320),
        (HashAlgorithmKind::BoVW, HashVariant::Float64, 256),
    ];
    for (kind, variant, len) in expected {
        assert_eq!(hasher(kind).shape(), (variant, len), "{}", kind);
    }
}

#[test]
fn self_distance_is_zero() {
    let img = photo(128, 128, 3);
    for kind in HashAlgorithmKind::ALL {
        let hasher = hasher(kind);
        let hash = hasher.calculate(&img).unwrap();
        let distance = hasher.compare(&hash, &hash).unwrap();
        assert!(distance.abs() < 1e-6, "{}: self distance {}", kind, distance);
    }
}

#[test]
fn distances_are_symmetric_and_non_negative() {
    let a = photo(128, 96, 4);
    let b = bars(128, 96);
    for kind in HashAlgorithmKind::ALL {
        let hasher = hasher(kind);
        let ha = hasher.calculate(&a).unwrap();
        let hb = hasher.calculate(&b).unwrap();
        let ab = hasher.compare(&ha, &hb).unwrap();
        let ba = hasher.compare(&hb, &ha).unwrap();
        assert!(ab >= 0.0, "{}: negative distance {}", kind, ab);
        assert!((ab - ba).abs() < 1e-9, "{}: {} != {}", kind, ab, ba);
    }
}

#[test]
fn hamming_and_l2_obey_the_triangle_inequality() {
    let images = [photo(96, 96, 5), photo(96, 96, 9), bars(96, 96)];
    for kind in [
        HashAlgorithmKind::Difference,
        HashAlgorithmKind::Pdq,
        HashAlgorithmKind::Zernike,
        HashAlgorithmKind::Cld,
    ] {
        let hasher = hasher(kind);
        let hashes: Vec<HashValue> = images
            .iter()
            .map(|img| hasher.calculate(img).unwrap())
            .collect();
        let d = |i: usize, j: usize| hasher.compare(&hashes[i], &hashes[j]).unwrap();
        assert!(d(0, 2) <= d(0, 1) + d(1, 2) + 1e-9, "{}", kind);
    }
}

#[test]
fn concurrent_hashing_matches_sequential() {
    let images: Vec<DynamicImage> = (0..4).map(|seed| photo(120, 90, seed)).collect();
    for kind in HashAlgorithmKind::ALL {
        let hasher = hasher(kind);
        let sequential: Vec<HashValue> = images
            .iter()
            .map(|img| hasher.calculate(img).unwrap())
            .collect();
        let parallel: Vec<HashValue> = images
            .par_iter()
            .map(|img| hasher.calculate(img).unwrap())
            .collect();
        assert_eq!(sequential, parallel, "{}", kind);
    }
}

#[test]
fn rotation_aware_hashers_tolerate_right_angle_rotations() {
    let gray = photo(128, 128, 6).to_luma8();
    let unrelated = bars(128, 128);
    for kind in [HashAlgorithmKind::Rash, HashAlgorithmKind::Zernike] {
        let hasher = hasher(kind);
        let original = hasher.calculate(&DynamicImage::ImageLuma8(gray.clone())).unwrap();
        let baseline = hasher
            .compare(&original, &hasher.calculate(&unrelated).unwrap())
            .unwrap();
        for rotated in [
            imageops::rotate90(&gray),
            imageops::rotate180(&gray),
            imageops::rotate270(&gray),
        ] {
            let hash = hasher.calculate(&DynamicImage::ImageLuma8(rotated)).unwrap();
            let distance = hasher.compare(&original, &hash).unwrap();
            assert!(
                distance < baseline,
                "{}: rotated {} vs unrelated {}",
                kind,
                distance,
                baseline
            );
        }
    }
}

#[test]
fn pdq_sets_exactly_half_the_bits() {
    let hasher = hasher(HashAlgorithmKind::Pdq);
    for seed in 0..3 {
        let hash = hasher.calculate(&photo(150, 100, seed)).unwrap();
        let ones = hash.as_binary().unwrap().count_ones();
        assert!((127..=129).contains(&ones), "{} bits set", ones);
    }
}

#[test]
fn mismatched_descriptors_are_rejected() {
    let img = photo(64, 64, 0);
    let binary = hasher(HashAlgorithmKind::Average).calculate(&img).unwrap();
    let floats = hasher(HashAlgorithmKind::Zernike).calculate(&img).unwrap();
    let long = hasher(HashAlgorithmKind::Pdq).calculate(&img).unwrap();

    let average = hasher(HashAlgorithmKind::Average);
    assert_eq!(
        average.compare(&binary, &floats).unwrap_err(),
        CompareError::IncompatibleHash {
            expected: HashVariant::Binary,
            found: HashVariant::Float64,
        }
    );
    assert_eq!(
        average.compare(&binary, &long).unwrap_err(),
        CompareError::HashLengthMismatch {
            expected: 8,
            found: 32,
        }
    );
}

#[test]
fn global_compare_picks_the_natural_metric() {
    let img = photo(64, 64, 1);
    let other = bars(64, 64);
    let hasher = hasher(HashAlgorithmKind::Cld);
    let a = hasher.calculate(&img).unwrap();
    let b = hasher.calculate(&other).unwrap();
    assert_eq!(
        compare(&a, &b).unwrap(),
        compare_with(&a, &b, &Metric::L2).unwrap()
    );
    assert!(compare_with(&a, &b, &Metric::L1).unwrap() >= compare(&a, &b).unwrap());
}

#[test]
fn custom_metric_is_used_by_compare() {
    fn always_seven(_: &HashValue, _: &HashValue) -> Result<f64, CompareError> {
        Ok(7.0)
    }
    let hasher = HasherConfig::new()
        .algorithm(HashAlgorithmKind::Average)
        .metric(Metric::Custom(always_seven))
        .build()
        .unwrap();
    let hash = hasher.calculate(&photo(32, 32, 0)).unwrap();
    assert_eq!(hasher.compare(&hash, &hash).unwrap(), 7.0);
}
