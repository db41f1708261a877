//! Banded LSH index over MinHash signatures.
//!
//! A signature of length `H = b·r` is cut into `b` bands of `r` rows. Each
//! band is hashed to a bucket key, and an item lands in one bucket per band.
//! Two items become candidates when they agree on every row of at least one
//! band, which for per-row agreement `s` happens with probability
//!
//! ```text
//! P(candidate) = 1 - (1 - s^r)^b
//! ```
//!
//! More bands raise recall, more rows raise precision. The steepest point
//! of this S-curve sits near `(1/b)^(1/r)`.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use super::minhash::MinHashSignature;
use super::stable::band_key;
use crate::error::ConfigError;

/// Entries per worker chunk in [`BandedIndex::build_par`].
#[cfg(feature = "parallel")]
const BUILD_CHUNK: usize = 1024;

type BandBuckets = Vec<HashMap<u64, Vec<String>>>;

/// LSH index mapping `(band, bucket_key)` to the ids that hashed there.
#[derive(Debug, Clone)]
pub struct BandedIndex {
    /// Number of bands.
    bands: usize,
    /// Number of rows per band.
    rows: usize,
    /// Band hash tables: band_idx -> (band_hash -> ids, in insertion order)
    buckets: BandBuckets,
    /// Number of indexed items.
    len: usize,
}

impl BandedIndex {
    /// Create an empty index with `bands` bands of `rows` rows.
    ///
    /// Signatures passed to [`build`](Self::build) or [`query`](Self::query)
    /// must have length `bands * rows`.
    pub fn new(bands: usize, rows: usize) -> Result<Self, ConfigError> {
        if bands == 0 {
            return Err(ConfigError::invalid("bands", "must be at least 1"));
        }
        if rows == 0 {
            return Err(ConfigError::invalid("rows", "must be at least 1"));
        }
        if bands.checked_mul(rows).is_none() {
            return Err(ConfigError::invalid("bands", "bands * rows overflows"));
        }
        Ok(Self {
            bands,
            rows,
            buckets: empty_buckets(bands),
            len: 0,
        })
    }

    /// Create an index for signatures of a known length, checking `b·r == H`.
    pub fn for_signature_len(bands: usize, rows: usize, num_hashes: usize) -> Result<Self, ConfigError> {
        let index = Self::new(bands, rows)?;
        if index.num_hashes() != num_hashes {
            return Err(ConfigError::band_mismatch(bands, rows, num_hashes));
        }
        Ok(index)
    }

    /// Create an index whose S-curve threshold is closest to `threshold`.
    ///
    /// Tries every factorization `b·r = num_hashes`.
    pub fn with_threshold(num_hashes: usize, threshold: f64) -> Result<Self, ConfigError> {
        let (bands, rows) = bands_for_threshold(num_hashes, threshold)?;
        Self::new(bands, rows)
    }

    /// Populate a fresh index from `(id, signature)` pairs.
    ///
    /// Every signature is length-checked before anything is inserted. Ids
    /// are appended to their buckets in the order the pairs are given.
    ///
    /// The index is write-once: calling this on an index that already holds
    /// items is an error.
    pub fn build<'a, S, I>(mut self, entries: I) -> Result<Self, ConfigError>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, &'a MinHashSignature)>,
    {
        self.check_unbuilt()?;
        let entries: Vec<(S, &MinHashSignature)> = entries.into_iter().collect();
        for (_, sig) in &entries {
            self.check_len(sig)?;
        }

        for (id, sig) in entries {
            insert_into(&mut self.buckets, self.rows, id.into(), sig);
            self.len += 1;
        }

        debug!(
            items = self.len,
            bands = self.bands,
            rows = self.rows,
            buckets = self.num_buckets(),
            "built banded index"
        );
        Ok(self)
    }

    /// Populate a fresh index using rayon workers.
    ///
    /// Each worker builds a partial index over a contiguous chunk; partials
    /// are merged in chunk order, so bucket contents match [`build`](Self::build).
    #[cfg(feature = "parallel")]
    pub fn build_par(mut self, entries: &[(String, MinHashSignature)]) -> Result<Self, ConfigError> {
        use rayon::prelude::*;

        self.check_unbuilt()?;
        for (_, sig) in entries {
            self.check_len(sig)?;
        }

        let bands = self.bands;
        let rows = self.rows;
        let partials: Vec<BandBuckets> = entries
            .par_chunks(BUILD_CHUNK)
            .map(|chunk| {
                let mut partial = empty_buckets(bands);
                for (id, sig) in chunk {
                    insert_into(&mut partial, rows, id.clone(), sig);
                }
                partial
            })
            .collect();

        for partial in partials {
            for (band, table) in partial.into_iter().enumerate() {
                for (key, ids) in table {
                    self.buckets[band].entry(key).or_default().extend(ids);
                }
            }
        }
        self.len += entries.len();

        debug!(
            items = self.len,
            bands = self.bands,
            rows = self.rows,
            buckets = self.num_buckets(),
            "built banded index in parallel"
        );
        Ok(self)
    }

    /// Query for candidate ids.
    ///
    /// Returns every id sharing at least one full band with `signature`,
    /// including the query item itself if it was indexed.
    pub fn query(&self, signature: &MinHashSignature) -> Result<BTreeSet<&str>, ConfigError> {
        self.check_len(signature)?;

        let mut candidates = BTreeSet::new();
        for (band_idx, chunk) in signature.values.chunks(self.rows).enumerate() {
            if let Some(ids) = self.buckets[band_idx].get(&band_key(chunk)) {
                candidates.extend(ids.iter().map(String::as_str));
            }
        }
        Ok(candidates)
    }

    /// Ids in the bucket that `signature` maps to within `band`.
    pub fn bucket_for(&self, band: usize, signature: &MinHashSignature) -> Result<&[String], ConfigError> {
        self.check_len(signature)?;
        if band >= self.bands {
            return Err(ConfigError::invalid(
                "band",
                format!("{band} out of range for {} bands", self.bands),
            ));
        }
        let start = band * self.rows;
        let key = band_key(&signature.values[start..start + self.rows]);
        Ok(self.buckets[band]
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or(&[]))
    }

    fn check_unbuilt(&self) -> Result<(), ConfigError> {
        if !self.is_empty() {
            return Err(ConfigError::invalid(
                "index",
                format!("already holds {} items; build a new index instead", self.len),
            ));
        }
        Ok(())
    }

    fn check_len(&self, signature: &MinHashSignature) -> Result<(), ConfigError> {
        if signature.len() != self.num_hashes() {
            return Err(ConfigError::band_mismatch(self.bands, self.rows, signature.len()));
        }
        Ok(())
    }

    /// Number of indexed items.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if index is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Signature length this index accepts.
    pub fn num_hashes(&self) -> usize {
        self.bands * self.rows
    }

    /// Number of non-empty buckets across all bands.
    pub fn num_buckets(&self) -> usize {
        self.buckets.iter().map(HashMap::len).sum()
    }

    /// Approximate threshold for this configuration: `(1/b)^(1/r)`.
    pub fn threshold(&self) -> f64 {
        s_curve_threshold(self.bands, self.rows)
    }

    /// Probability that two items with per-row agreement `s` share a bucket.
    pub fn collision_probability(&self, s: f64) -> f64 {
        collision_probability(self.bands, self.rows, s)
    }
}

fn empty_buckets(bands: usize) -> BandBuckets {
    (0..bands).map(|_| HashMap::new()).collect()
}

fn insert_into(buckets: &mut BandBuckets, rows: usize, id: String, signature: &MinHashSignature) {
    let last = buckets.len() - 1;
    for (band_idx, chunk) in signature.values.chunks(rows).enumerate() {
        let table = &mut buckets[band_idx];
        let key = band_key(chunk);
        if band_idx == last {
            table.entry(key).or_default().push(id);
            return;
        }
        table.entry(key).or_default().push(id.clone());
    }
}

/// `1 - (1 - s^r)^b`.
pub fn collision_probability(bands: usize, rows: usize, s: f64) -> f64 {
    let s = s.clamp(0.0, 1.0);
    1.0 - (1.0 - s.powi(rows as i32)).powi(bands as i32)
}

/// `(1/b)^(1/r)`.
pub fn s_curve_threshold(bands: usize, rows: usize) -> f64 {
    (1.0 / bands as f64).powf(1.0 / rows as f64)
}

/// Factorization `(b, r)` of `num_hashes` whose threshold is closest to `threshold`.
pub fn bands_for_threshold(num_hashes: usize, threshold: f64) -> Result<(usize, usize), ConfigError> {
    if num_hashes == 0 {
        return Err(ConfigError::invalid("num_hashes", "must be at least 1"));
    }
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ConfigError::invalid("threshold", "must lie in [0, 1]"));
    }

    let mut best = (num_hashes, 1);
    let mut best_error = f64::MAX;
    for (b, r) in factor_pairs(num_hashes) {
        let error = (s_curve_threshold(b, r) - threshold).abs();
        if error < best_error {
            best_error = error;
            best = (b, r);
        }
    }
    Ok(best)
}

/// Every `(bands, rows)` with `bands * rows == num_hashes`, ordered by rows.
pub fn factor_pairs(num_hashes: usize) -> Vec<(usize, usize)> {
    (1..=num_hashes)
        .filter(|r| num_hashes % r == 0)
        .map(|r| (num_hashes / r, r))
        .collect()
}
