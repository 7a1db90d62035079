//! Visual-word quantization and the three storage encodings.

use super::features::{mix, Descriptor};
use crate::core::hash::BinaryHash;
use crate::error::HashError;

const FNV_OFFSET: u64 = 0xCBF2_9CE4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

/// Largest prime below 2^32; the MinHash modulus.
pub(super) const MINHASH_PRIME: u64 = 4_294_967_291;

const MINHASH_A_BASE: u64 = 0x9E37_79B9_7F4A_7C15;
const MINHASH_A_STEP: u64 = 0xD1B5_4A32_D192_ED03;
const MINHASH_C_BASE: u64 = 0x94D0_49BB_1331_11EB;
const MINHASH_C_STEP: u64 = 0xBF58_476D_1CE4_E5B9;
const SIMHASH_WORD_OFFSET: u64 = 0xA076_1D64_78BD_642F;
const SIMHASH_BIT_STEP: u64 = 0xE703_7ED1_A0B4_28DB;

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, &b| {
        (hash ^ b as u64).wrapping_mul(FNV_PRIME)
    })
}

/// Word counts: each descriptor lands in bucket `fnv1a(descriptor) % vocabulary`.
pub(super) fn word_histogram<'a, I>(descriptors: I, vocabulary: usize) -> Vec<u32>
where
    I: IntoIterator<Item = &'a Descriptor>,
{
    let mut counts = vec![0u32; vocabulary];
    for descriptor in descriptors {
        counts[(fnv1a(descriptor) % vocabulary as u64) as usize] += 1;
    }
    counts
}

/// Counts scaled to unit L2 norm; all zeros when there are no words.
pub(super) fn normalized(counts: &[u32]) -> Vec<f64> {
    let norm = counts
        .iter()
        .map(|&c| (c as f64) * (c as f64))
        .sum::<f64>()
        .sqrt();
    counts
        .iter()
        .map(|&c| if norm > 0.0 { c as f64 / norm } else { 0.0 })
        .collect()
}

/// Minimum of `(a * word + c) mod p` over the present words, for `size`
/// hash functions. An empty word set yields `p` everywhere.
pub(super) fn min_hash(counts: &[u32], size: usize) -> Vec<f64> {
    let p = MINHASH_PRIME as u128;
    (0..size as u64)
        .map(|i| {
            let a_seed = mix(MINHASH_A_BASE.wrapping_add(i.wrapping_mul(MINHASH_A_STEP)));
            let c_seed = mix(MINHASH_C_BASE.wrapping_add(i.wrapping_mul(MINHASH_C_STEP)));
            let a = (mix(a_seed) | 1) as u128;
            let c = mix(c_seed) as u128;
            counts
                .iter()
                .enumerate()
                .filter(|&(_, &count)| count > 0)
                .map(|(word, _)| ((a * word as u128 + c) % p) as u64)
                .min()
                .unwrap_or(MINHASH_PRIME) as f64
        })
        .collect()
}

/// Count-weighted SimHash of `bits` bits.
pub(super) fn sim_hash(counts: &[u32], bits: usize) -> Result<BinaryHash, HashError> {
    let mut acc = vec![0i64; bits];
    for (word, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let word_base = mix((word as u64).wrapping_add(SIMHASH_WORD_OFFSET));
        for (bit, total) in acc.iter_mut().enumerate() {
            let seed = mix(word_base.wrapping_add((bit as u64).wrapping_mul(SIMHASH_BIT_STEP)));
            if seed & 1 == 1 {
                *total += count as i64;
            } else {
                *total -= count as i64;
            }
        }
    }

    let mut hash = BinaryHash::new(bits);
    for (bit, &total) in acc.iter().enumerate() {
        if total > 0 {
            hash.set(bit)?;
        }
    }
    Ok(hash)
}
