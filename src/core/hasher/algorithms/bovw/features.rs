//! Keypoint detection and 256-bit binary descriptors.
//!
//! ## Detectors
//! - **ORB** - FAST-12 corners, intensity-centroid orientation, rotated BRIEF
//! - **AKAZE** - multi-scale Hessian determinant maxima, patch-mean comparisons
//!
//! Both use fixed pseudo-random sampling pairs, so descriptors are
//! reproducible across runs and platforms.

use crate::core::imgproc::{gaussian_blur, reflect101, Matrix};
use crate::error::HashError;
use image::GrayImage;
use std::cmp::Ordering;

/// Bytes in one binary descriptor.
pub(super) const DESCRIPTOR_BYTES: usize = 32;
const DESCRIPTOR_BITS: usize = DESCRIPTOR_BYTES * 8;

pub(super) type Descriptor = [u8; DESCRIPTOR_BYTES];

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
const ORB_PAIR_SEED: u64 = 0x6A09_E667_F3BC_C909;
const AKAZE_PAIR_SEED: u64 = 0xBB67_AE85_84CA_A73B;

const FAST_THRESHOLD: i32 = 20;
const FAST_ARC: usize = 12;
/// Bresenham circle of radius 3, clockwise from the top.
const FAST_CIRCLE: [(i32, i32); 16] = [
    (0, -3),
    (1, -3),
    (2, -2),
    (3, -1),
    (3, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 3),
    (-1, 3),
    (-2, 2),
    (-3, 1),
    (-3, 0),
    (-3, -1),
    (-2, -2),
    (-1, -3),
];

const ORB_PATCH_RADIUS: i32 = 15;
const AKAZE_PATCH_RADIUS: i32 = 12;
const AKAZE_SCALES: [f64; 3] = [1.0, 1.6, 2.2];
const AKAZE_DESCRIPTOR_SIGMA: f64 = 1.2;
/// Determinant threshold on intensities scaled to `[0, 1]`.
const HESSIAN_THRESHOLD: f32 = 0.001;

/// Advances `state` and returns the next SplitMix64 output.
pub(super) fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(GOLDEN_GAMMA);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// One SplitMix64 step from `seed`.
pub(super) fn mix(seed: u64) -> u64 {
    let mut state = seed;
    splitmix64(&mut state)
}

/// Sampling pair `(x1, y1, x2, y2)` relative to the keypoint.
type Pair = [i32; 4];

/// `DESCRIPTOR_BITS` pairs with coordinates in `[-radius, radius]`.
fn sampling_pairs(seed: u64, radius: i32) -> Vec<Pair> {
    let span = (2 * radius + 1) as u64;
    let mut state = seed;
    let mut coord = move || (splitmix64(&mut state) % span) as i32 - radius;
    (0..DESCRIPTOR_BITS)
        .map(|_| [coord(), coord(), coord(), coord()])
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Keypoint {
    pub x: u32,
    pub y: u32,
    pub response: f32,
    /// Orientation in radians (ORB only).
    pub angle: f32,
}

/// Strongest first; ties by row, then column.
fn rank(a: &Keypoint, b: &Keypoint) -> Ordering {
    b.response
        .total_cmp(&a.response)
        .then(a.y.cmp(&b.y))
        .then(a.x.cmp(&b.x))
}

fn sample(gray: &GrayImage, x: i32, y: i32) -> u8 {
    let (width, height) = gray.dimensions();
    let sx = reflect101(x as isize, width as usize);
    let sy = reflect101(y as isize, height as usize);
    gray.get_pixel(sx as u32, sy as u32)[0]
}

fn pack(bits: impl Iterator<Item = bool>) -> Descriptor {
    let mut descriptor = [0u8; DESCRIPTOR_BYTES];
    for (i, bit) in bits.enumerate().take(DESCRIPTOR_BITS) {
        if bit {
            descriptor[i / 8] |= 1 << (i % 8);
        }
    }
    descriptor
}

/// True when `flags` has a cyclic run of at least `FAST_ARC` set entries.
fn has_arc(flags: &[bool; 16]) -> bool {
    let mut run = 0;
    for i in 0..32 {
        if flags[i % 16] {
            run += 1;
            if run >= FAST_ARC {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// FAST-12 score at `(x, y)`, or zero if the pixel is not a corner.
///
/// The score is the summed excess over the threshold of the brighter or
/// darker circle pixels, whichever qualifies.
fn fast_score(gray: &GrayImage, x: u32, y: u32) -> f32 {
    let centre = gray.get_pixel(x, y)[0] as i32;
    let mut brighter = [false; 16];
    let mut darker = [false; 16];
    let (mut bright_sum, mut dark_sum) = (0i32, 0i32);
    for (i, (dx, dy)) in FAST_CIRCLE.iter().enumerate() {
        let value = gray.get_pixel((x as i32 + dx) as u32, (y as i32 + dy) as u32)[0] as i32;
        let diff = value - centre;
        if diff > FAST_THRESHOLD {
            brighter[i] = true;
            bright_sum += diff - FAST_THRESHOLD;
        } else if diff < -FAST_THRESHOLD {
            darker[i] = true;
            dark_sum += -diff - FAST_THRESHOLD;
        }
    }

    let mut score = 0;
    if has_arc(&brighter) {
        score = bright_sum;
    }
    if has_arc(&darker) {
        score = score.max(dark_sum);
    }
    score as f32
}

/// Keeps `(r, c)` when no 3x3 neighbour beats it; equal neighbours earlier in
/// raster order win.
fn is_local_max(scores: &Matrix<f32>, r: usize, c: usize) -> bool {
    let value = scores[(r, c)];
    for nr in r.saturating_sub(1)..=(r + 1).min(scores.rows() - 1) {
        for nc in c.saturating_sub(1)..=(c + 1).min(scores.cols() - 1) {
            if (nr, nc) == (r, c) {
                continue;
            }
            let other = scores[(nr, nc)];
            if other > value || (other == value && (nr, nc) < (r, c)) {
                return false;
            }
        }
    }
    true
}

/// FAST-12 corners after 3x3 non-maximum suppression, strongest first.
pub(super) fn fast_keypoints(gray: &GrayImage, max_keypoints: usize) -> Vec<Keypoint> {
    let (width, height) = gray.dimensions();
    if width < 7 || height < 7 {
        return Vec::new();
    }

    let mut scores = Matrix::filled(height as usize, width as usize, 0.0f32);
    for y in 3..height - 3 {
        for x in 3..width - 3 {
            scores[(y as usize, x as usize)] = fast_score(gray, x, y);
        }
    }

    let mut keypoints = Vec::new();
    for y in 3..height - 3 {
        for x in 3..width - 3 {
            let (r, c) = (y as usize, x as usize);
            if scores[(r, c)] > 0.0 && is_local_max(&scores, r, c) {
                keypoints.push(Keypoint {
                    x,
                    y,
                    response: scores[(r, c)],
                    angle: 0.0,
                });
            }
        }
    }
    keypoints.sort_by(rank);
    keypoints.truncate(max_keypoints);
    keypoints
}

/// Intensity-centroid orientation over the disk of `ORB_PATCH_RADIUS`.
fn centroid_angle(gray: &GrayImage, x: u32, y: u32) -> f32 {
    let (mut m10, mut m01) = (0i64, 0i64);
    let r2 = ORB_PATCH_RADIUS * ORB_PATCH_RADIUS;
    for dy in -ORB_PATCH_RADIUS..=ORB_PATCH_RADIUS {
        for dx in -ORB_PATCH_RADIUS..=ORB_PATCH_RADIUS {
            if dx * dx + dy * dy > r2 {
                continue;
            }
            let value = sample(gray, x as i32 + dx, y as i32 + dy) as i64;
            m10 += dx as i64 * value;
            m01 += dy as i64 * value;
        }
    }
    (m01 as f32).atan2(m10 as f32)
}

/// ORB-style descriptors: FAST keypoints with steered BRIEF tests.
pub(super) fn orb(gray: &GrayImage, max_keypoints: usize) -> Vec<(Keypoint, Descriptor)> {
    let pairs = sampling_pairs(ORB_PAIR_SEED, ORB_PATCH_RADIUS);
    fast_keypoints(gray, max_keypoints)
        .into_iter()
        .map(|mut kp| {
            kp.angle = centroid_angle(gray, kp.x, kp.y);
            let (sin, cos) = kp.angle.sin_cos();
            let steer = |dx: i32, dy: i32| {
                let rx = (dx as f32 * cos - dy as f32 * sin).round() as i32;
                let ry = (dx as f32 * sin + dy as f32 * cos).round() as i32;
                (kp.x as i32 + rx, kp.y as i32 + ry)
            };
            let descriptor = pack(pairs.iter().map(|&[x1, y1, x2, y2]| {
                let (ax, ay) = steer(x1, y1);
                let (bx, by) = steer(x2, y2);
                sample(gray, ax, ay) < sample(gray, bx, by)
            }));
            (kp, descriptor)
        })
        .collect()
}

/// Scale-normalized Hessian determinant of a blurred image.
fn hessian_response(blurred: &GrayImage, sigma: f64) -> Matrix<f32> {
    let (width, height) = blurred.dimensions();
    let norm = sigma.powi(4) as f32;
    let at = |x: i32, y: i32| sample(blurred, x, y) as f32 / 255.0;
    Matrix::from_fn(height as usize, width as usize, |r, c| {
        let (x, y) = (c as i32, r as i32);
        let centre = at(x, y);
        let dxx = at(x + 1, y) - 2.0 * centre + at(x - 1, y);
        let dyy = at(x, y + 1) - 2.0 * centre + at(x, y - 1);
        let dxy = (at(x + 1, y + 1) - at(x + 1, y - 1) - at(x - 1, y + 1) + at(x - 1, y - 1)) / 4.0;
        norm * (dxx * dyy - dxy * dxy)
    })
}

/// Strict maximum over its 3x3 neighbourhood in this and adjacent scales.
fn is_scale_space_max(responses: &[Matrix<f32>], s: usize, r: usize, c: usize) -> bool {
    let value = responses[s][(r, c)];
    let scales = s.saturating_sub(1)..=(s + 1).min(responses.len() - 1);
    for (ns, layer) in responses.iter().enumerate().take(*scales.end() + 1).skip(*scales.start()) {
        for nr in r - 1..=r + 1 {
            for nc in c - 1..=c + 1 {
                if (ns, nr, nc) != (s, r, c) && layer[(nr, nc)] >= value {
                    return false;
                }
            }
        }
    }
    true
}

/// Hessian-determinant maxima across `AKAZE_SCALES`, strongest first.
pub(super) fn hessian_keypoints(
    gray: &GrayImage,
    max_keypoints: usize,
) -> Result<Vec<Keypoint>, HashError> {
    let (width, height) = gray.dimensions();
    let responses = AKAZE_SCALES
        .iter()
        .map(|&sigma| Ok(hessian_response(&gaussian_blur(gray, 0, sigma)?, sigma)))
        .collect::<Result<Vec<_>, HashError>>()?;
    if width < 3 || height < 3 {
        return Ok(Vec::new());
    }

    let mut keypoints = Vec::new();
    for (s, layer) in responses.iter().enumerate() {
        for r in 1..height as usize - 1 {
            for c in 1..width as usize - 1 {
                let response = layer[(r, c)];
                if response > HESSIAN_THRESHOLD && is_scale_space_max(&responses, s, r, c) {
                    keypoints.push(Keypoint {
                        x: c as u32,
                        y: r as u32,
                        response,
                        angle: 0.0,
                    });
                }
            }
        }
    }
    keypoints.sort_by(rank);
    keypoints.truncate(max_keypoints);
    Ok(keypoints)
}

/// Mean of the 3x3 patch centred on `(x, y)`.
fn patch_mean(gray: &GrayImage, x: i32, y: i32) -> u32 {
    let mut sum = 0u32;
    for dy in -1..=1 {
        for dx in -1..=1 {
            sum += sample(gray, x + dx, y + dy) as u32;
        }
    }
    // all patches have nine samples, so sums order like means
    sum
}

/// AKAZE-style descriptors: Hessian keypoints with patch-mean tests on a
/// smoothed image.
pub(super) fn akaze(
    gray: &GrayImage,
    max_keypoints: usize,
) -> Result<Vec<(Keypoint, Descriptor)>, HashError> {
    let keypoints = hessian_keypoints(gray, max_keypoints)?;
    let smooth = gaussian_blur(gray, 0, AKAZE_DESCRIPTOR_SIGMA)?;
    let pairs = sampling_pairs(AKAZE_PAIR_SEED, AKAZE_PATCH_RADIUS);
    Ok(keypoints
        .into_iter()
        .map(|kp| {
            let (x, y) = (kp.x as i32, kp.y as i32);
            let descriptor = pack(pairs.iter().map(|&[x1, y1, x2, y2]| {
                patch_mean(&smooth, x + x1, y + y1) < patch_mean(&smooth, x + x2, y + y2)
            }));
            (kp, descriptor)
        })
        .collect())
}
