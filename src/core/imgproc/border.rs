//! Reflection-101 border handling.

/// Folds `index` into `[0, len)` by mirroring around the edges without
/// repeating the edge sample (`-1 -> 1`, `len -> len - 2`).
///
/// Returns 0 when `len <= 1`.
pub fn reflect101(index: isize, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let n = len as isize;
    let period = 2 * (n - 1);
    let folded = index.rem_euclid(period);
    if folded >= n {
        (period - folded) as usize
    } else {
        folded as usize
    }
}
