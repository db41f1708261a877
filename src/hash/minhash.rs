//! MinHash for Jaccard similarity estimation.
//!
//! MinHash provides locality-sensitive hashing for set similarity,
//! estimating the Jaccard coefficient J(A,B) = |A ∩ B| / |A ∪ B|.
//!
//! ## Algorithm
//!
//! Each shingle is first mapped to a token value `x ∈ [0, p)` with a stable
//! string hash. Then, for each of the `H` affine hash functions
//! `h_i(x) = (a_i·x + b_i) mod p`:
//!
//! - MinHash_i(S) = min_{x ∈ S} h_i(x)
//!
//! The probability that MinHash values match equals Jaccard similarity:
//! P[MinHash_i(A) = MinHash_i(B)] = J(A,B)
//!
//! The coefficients `(a_i, b_i)` are drawn once per generator from a
//! `StdRng` seeded with the configured seed, so two generators built with the
//! same `(H, seed, p)` agree bit-for-bit on every signature.
//!
//! ## References
//!
//! - Broder (1997). "On the resemblance and containment of documents"
//! - Broder et al. (2000). "Min-wise independent permutations"

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::stable::token_value;
use crate::error::ConfigError;

/// 2^31 - 1.
pub const DEFAULT_MODULUS: u64 = 2_147_483_647;

/// Smallest modulus accepted; below this, token collisions dominate.
pub const MIN_MODULUS: u64 = 65_537;

/// Seed used by [`MinHash::new`].
pub const DEFAULT_SEED: u64 = 42;

/// MinHash signature generator.
#[derive(Debug, Clone)]
pub struct MinHash {
    /// Number of hash functions (signature length).
    num_hashes: usize,
    /// Seed the coefficients were drawn from.
    seed: u64,
    /// Prime modulus `p`; also the empty-set sentinel value.
    modulus: u64,
    /// `(a_i, b_i)` per hash function.
    coefficients: Vec<(u64, u64)>,
}

impl MinHash {
    /// Create a new MinHash with `num_hashes` functions and the default modulus.
    ///
    /// More hashes = more accurate Jaccard estimate, but larger signatures.
    /// Typical values: 50-200 hashes.
    pub fn new(num_hashes: usize, seed: u64) -> Result<Self, ConfigError> {
        Self::with_modulus(num_hashes, seed, DEFAULT_MODULUS)
    }

    /// Create MinHash with an explicit prime modulus.
    pub fn with_modulus(num_hashes: usize, seed: u64, modulus: u64) -> Result<Self, ConfigError> {
        if num_hashes == 0 {
            return Err(ConfigError::invalid(
                "num_hashes",
                "at least one hash function is required",
            ));
        }
        validate_modulus(modulus)?;

        let mut rng = StdRng::seed_from_u64(seed);
        let coefficients = (0..num_hashes)
            .map(|_| (rng.random_range(1..modulus), rng.random_range(0..modulus)))
            .collect();

        Ok(Self {
            num_hashes,
            seed,
            modulus,
            coefficients,
        })
    }

    /// Compute MinHash signature for a set of shingles.
    pub fn signature<S: AsRef<str>>(&self, shingles: &HashSet<S>) -> MinHashSignature {
        self.signature_from_iter(shingles.iter())
    }

    /// Compute MinHash signature from an iterator of shingles.
    ///
    /// Repeated items do not change the result. An empty iterator yields the
    /// sentinel signature (every entry equal to the modulus).
    pub fn signature_from_iter<S: AsRef<str>, I: IntoIterator<Item = S>>(
        &self,
        shingles: I,
    ) -> MinHashSignature {
        let p = self.modulus;
        let mut mins = vec![p; self.num_hashes];

        for shingle in shingles {
            let x = token_value(shingle.as_ref(), p);
            for (slot, &(a, b)) in mins.iter_mut().zip(&self.coefficients) {
                let h = affine(a, b, x, p);
                if h < *slot {
                    *slot = h;
                }
            }
        }

        MinHashSignature { values: mins }
    }

    /// Signatures for many shingle sets, in input order.
    ///
    /// Runs on rayon's pool when the `parallel` feature is enabled; the
    /// coefficients are shared read-only.
    #[cfg(feature = "parallel")]
    pub fn signatures<S>(&self, sets: &[HashSet<S>]) -> Vec<MinHashSignature>
    where
        S: AsRef<str> + Sync,
    {
        use rayon::prelude::*;
        sets.par_iter().map(|s| self.signature(s)).collect()
    }

    /// Signatures for many shingle sets, in input order.
    #[cfg(not(feature = "parallel"))]
    pub fn signatures<S>(&self, sets: &[HashSet<S>]) -> Vec<MinHashSignature>
    where
        S: AsRef<str> + Sync,
    {
        sets.iter().map(|s| self.signature(s)).collect()
    }

    /// The signature every empty set maps to.
    pub fn sentinel(&self) -> MinHashSignature {
        MinHashSignature {
            values: vec![self.modulus; self.num_hashes],
        }
    }

    /// Number of hash functions.
    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// The `(a_i, b_i)` pairs, one per hash function.
    pub fn coefficients(&self) -> &[(u64, u64)] {
        &self.coefficients
    }
}

#[inline]
fn affine(a: u64, b: u64, x: u64, p: u64) -> u64 {
    ((a as u128 * x as u128 + b as u128) % p as u128) as u64
}

fn validate_modulus(modulus: u64) -> Result<(), ConfigError> {
    if modulus < MIN_MODULUS {
        return Err(ConfigError::InvalidModulus {
            modulus,
            reason: "must be at least 65537",
        });
    }
    if !is_prime(modulus) {
        return Err(ConfigError::InvalidModulus {
            modulus,
            reason: "must be prime",
        });
    }
    Ok(())
}

/// Deterministic Miller-Rabin for 64-bit integers.
pub fn is_prime(n: u64) -> bool {
    const BASES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

    if n < 2 {
        return false;
    }
    for &p in &BASES {
        if n % p == 0 {
            return n == p;
        }
    }

    let mut d = n - 1;
    let mut s = 0;
    while d % 2 == 0 {
        d /= 2;
        s += 1;
    }

    'witness: for &a in &BASES {
        let mut x = pow_mod(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

#[inline]
fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

fn pow_mod(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut acc = 1u64;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = mul_mod(acc, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    acc
}

/// A MinHash signature (fingerprint) of a set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MinHashSignature {
    /// The minimum hash values for each hash function.
    pub values: Vec<u64>,
}

impl MinHashSignature {
    /// Estimate Jaccard similarity between two signatures.
    ///
    /// Returns a value in [0, 1] where 1 means identical sets. Signatures of
    /// different lengths came from different generators and are rejected.
    pub fn jaccard(&self, other: &MinHashSignature) -> Result<f64, ConfigError> {
        estimate_similarity(self, other)
    }

    /// Check if estimated similarity reaches `threshold`.
    pub fn is_similar(&self, other: &MinHashSignature, threshold: f64) -> Result<bool, ConfigError> {
        Ok(self.jaccard(other)? >= threshold)
    }

    /// Number of positions where hash values differ.
    pub fn hamming_distance(&self, other: &MinHashSignature) -> Result<usize, ConfigError> {
        check_lengths(self, other)?;
        Ok(self
            .values
            .iter()
            .zip(&other.values)
            .filter(|(a, b)| a != b)
            .count())
    }

    /// Merge two signatures (union of underlying sets).
    ///
    /// Takes element-wise minimum. The empty-set sentinel is the identity.
    pub fn merge(&self, other: &MinHashSignature) -> Result<MinHashSignature, ConfigError> {
        check_lengths(self, other)?;
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(&a, &b)| a.min(b))
            .collect();
        Ok(MinHashSignature { values })
    }

    /// True if this is the empty-set sentinel for `modulus`.
    pub fn is_sentinel(&self, modulus: u64) -> bool {
        self.values.iter().all(|&v| v == modulus)
    }

    /// Length of the signature.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if signature is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl AsRef<[u64]> for MinHashSignature {
    fn as_ref(&self) -> &[u64] {
        &self.values
    }
}

/// Fraction of positions where the two signatures agree.
///
/// Unbiased estimate of the Jaccard similarity of the underlying sets; its
/// variance shrinks as the signature length grows.
pub fn estimate_similarity(a: &MinHashSignature, b: &MinHashSignature) -> Result<f64, ConfigError> {
    check_lengths(a, b)?;
    if a.is_empty() {
        return Ok(0.0);
    }
    let matches = a
        .values
        .iter()
        .zip(&b.values)
        .filter(|(x, y)| x == y)
        .count();
    Ok(matches as f64 / a.len() as f64)
}

fn check_lengths(a: &MinHashSignature, b: &MinHashSignature) -> Result<(), ConfigError> {
    if a.len() != b.len() {
        return Err(ConfigError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_minhash_identical_sets() {
        let mh = MinHash::new(128, 7).unwrap();
        let s = set(&["a", "b", "c"]);

        let sig1 = mh.signature(&s);
        let sig2 = mh.signature(&s);

        assert_eq!(sig1, sig2);
        assert_eq!(sig1.jaccard(&sig2).unwrap(), 1.0);
    }

    #[test]
    fn test_minhash_disjoint_sets() {
        let mh = MinHash::new(128, 7).unwrap();
        let sig1 = mh.signature(&set(&["a", "b", "c"]));
        let sig2 = mh.signature(&set(&["x", "y", "z"]));

        assert!(sig1.jaccard(&sig2).unwrap() < 0.2);
    }

    #[test]
    fn test_minhash_similar_sets() {
        let mh = MinHash::new(256, 42).unwrap();

        let set1: HashSet<String> = (0..100).map(|i| i.to_string()).collect();
        let set2: HashSet<String> = (50..150).map(|i| i.to_string()).collect();

        // Actual Jaccard = 50/150 = 0.333...
        let estimated = mh.signature(&set1).jaccard(&mh.signature(&set2)).unwrap();
        assert!((estimated - 0.333).abs() < 0.1, "estimated {estimated}");
    }

    #[test]
    fn same_seed_gives_same_coefficients() {
        let a = MinHash::new(64, 1234).unwrap();
        let b = MinHash::new(64, 1234).unwrap();
        assert_eq!(a.coefficients(), b.coefficients());

        let c = MinHash::new(64, 1235).unwrap();
        assert_ne!(a.coefficients(), c.coefficients());
    }

    #[test]
    fn coefficients_are_in_range() {
        let mh = MinHash::with_modulus(500, 9, MIN_MODULUS).unwrap();
        for &(a, b) in mh.coefficients() {
            assert!((1..MIN_MODULUS).contains(&a));
            assert!(b < MIN_MODULUS);
        }
    }

    #[test]
    fn empty_set_is_sentinel() {
        let mh = MinHash::new(16, 42).unwrap();
        let sig = mh.signature(&HashSet::<String>::new());
        assert_eq!(sig, mh.sentinel());
        assert!(sig.is_sentinel(DEFAULT_MODULUS));
        assert_eq!(sig.values, vec![DEFAULT_MODULUS; 16]);

        let real = mh.signature(&set(&["^a", "ab", "b$"]));
        assert!(real.values.iter().all(|&v| v < DEFAULT_MODULUS));
        assert_eq!(sig.jaccard(&real).unwrap(), 0.0);
    }

    #[test]
    fn test_signature_merge() {
        let mh = MinHash::new(64, 42).unwrap();

        let sig1 = mh.signature(&set(&["a", "b"]));
        let sig2 = mh.signature(&set(&["c", "d"]));
        let sig_union = mh.signature(&set(&["a", "b", "c", "d"]));

        assert_eq!(sig1.merge(&sig2).unwrap(), sig_union);
        assert_eq!(sig1.merge(&mh.sentinel()).unwrap(), sig1);
    }

    #[test]
    fn mismatched_lengths_are_config_errors() {
        let short = MinHash::new(10, 42).unwrap().signature(&set(&["a"]));
        let long = MinHash::new(20, 42).unwrap().signature(&set(&["a"]));

        assert_eq!(
            estimate_similarity(&short, &long),
            Err(ConfigError::LengthMismatch { left: 10, right: 20 })
        );
        assert!(short.hamming_distance(&long).is_err());
        assert!(short.merge(&long).is_err());
    }

    #[test]
    fn hamming_complements_jaccard() {
        let mh = MinHash::new(100, 3).unwrap();
        let a = mh.signature(&set(&["ab", "bc", "cd"]));
        let b = mh.signature(&set(&["bc", "cd", "de"]));
        let dist = a.hamming_distance(&b).unwrap();
        let sim = a.jaccard(&b).unwrap();
        assert!((sim - (1.0 - dist as f64 / 100.0)).abs() < 1e-12);
    }

    #[test]
    fn iterator_and_set_agree() {
        let mh = MinHash::new(32, 5).unwrap();
        let s = set(&["x", "y", "z"]);
        let from_iter = mh.signature_from_iter(["x", "y", "z", "x"]);
        assert_eq!(mh.signature(&s), from_iter);
    }

    #[test]
    fn batch_preserves_order() {
        let mh = MinHash::new(32, 5).unwrap();
        let sets = vec![set(&["a"]), set(&["b", "c"]), HashSet::new()];
        let sigs = mh.signatures(&sets);
        assert_eq!(sigs.len(), 3);
        for (s, sig) in sets.iter().zip(&sigs) {
            assert_eq!(&mh.signature(s), sig);
        }
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(matches!(
            MinHash::new(0, 42),
            Err(ConfigError::InvalidParameter { name: "num_hashes", .. })
        ));
        assert!(matches!(
            MinHash::with_modulus(10, 42, 1_000_000),
            Err(ConfigError::InvalidModulus { .. })
        ));
        assert!(matches!(
            MinHash::with_modulus(10, 42, 101),
            Err(ConfigError::InvalidModulus { .. })
        ));
    }

    #[test]
    fn primality() {
        assert!(is_prime(2));
        assert!(is_prime(65_537));
        assert!(is_prime(DEFAULT_MODULUS));
        assert!(is_prime((1u64 << 61) - 1));
        assert!(!is_prime(1));
        assert!(!is_prime(65_535));
        // Carmichael number
        assert!(!is_prime(561));
        assert!(!is_prime(DEFAULT_MODULUS * 3));
    }

    #[test]
    fn large_modulus_does_not_overflow() {
        let p = (1u64 << 61) - 1;
        let mh = MinHash::with_modulus(8, 42, p).unwrap();
        let sig = mh.signature(&set(&["abc", "bcd"]));
        assert!(sig.values.iter().all(|&v| v < p));
    }
}
