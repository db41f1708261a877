//! Process-independent hashing for shingles and band slices.
//!
//! `std::collections::hash_map::DefaultHasher` is keyed per process, so two
//! runs (or two workers) would disagree on token values and bucket keys.
//! Everything here goes through `xxh3_64` with no seed instead.

use xxhash_rust::xxh3::xxh3_64;

/// Map a shingle to a token value in `[0, modulus)`.
#[inline]
pub(crate) fn token_value(shingle: &str, modulus: u64) -> u64 {
    xxh3_64(shingle.as_bytes()) % modulus
}

/// Order-sensitive key for one band of a signature.
pub(crate) fn band_key(rows: &[u64]) -> u64 {
    let mut bytes = Vec::with_capacity(rows.len() * 8);
    for v in rows {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    xxh3_64(&bytes)
}
