//! Hash-based near-duplicate search.
//!
//! This module turns text into features and features into comparable,
//! bucketable fingerprints. The core idea of locality sensitive hashing:
//! **design hash functions where similar items collide more often than
//! dissimilar ones**.
//!
//! ## Pipeline
//!
//! ```text
//! text ──shingles──▶ {k-grams} ──MinHash──▶ [u64; H] ──bands──▶ buckets
//! ```
//!
//! ## MinHash: Jaccard Similarity for Sets
//!
//! **Problem**: Given many documents, find near-duplicates without an
//! O(n²) all-pairs Jaccard comparison.
//!
//! **Key insight** (Broder 1997): For a random permutation π of the universe,
//!
//! ```text
//! P[min(π(A)) = min(π(B))] = |A ∩ B| / |A ∪ B| = Jaccard(A, B)
//! ```
//!
//! The minimum element of A ∪ B is equally likely to be any element, and it
//! is in A ∩ B with probability |A ∩ B| / |A ∪ B|.
//!
//! **Amplification with bands**: Divide signature into b bands of r rows.
//! Hash each band. Similar items collide in *any* band with high probability.
//!
//! ```rust
//! use neardup::hash::{shingles, BandedIndex, MinHash};
//!
//! let mh = MinHash::new(100, 42).unwrap();
//! let a = mh.signature(&shingles("stainless steel dryer vent", 3).unwrap());
//! let b = mh.signature(&shingles("stainless steel dryer vent kit", 3).unwrap());
//!
//! let index = BandedIndex::for_signature_len(50, 2, 100)
//!     .unwrap()
//!     .build([("a", &a), ("b", &b)])
//!     .unwrap();
//!
//! let candidates = index.query(&a).unwrap();
//! assert!(candidates.contains("b"));
//! ```
//!
//! ## Stability
//!
//! Token values and bucket keys use `xxh3_64`, not the process-keyed
//! `DefaultHasher`, so signatures and indexes built in different processes
//! agree.
//!
//! ## References
//!
//! - Broder (1997). "On the resemblance and containment of documents." (MinHash)
//! - Indyk & Motwani (1998). "Approximate nearest neighbors: towards removing
//!   the curse of dimensionality." (LSH theory)
//! - Leskovec, Rajaraman & Ullman. "Mining of Massive Datasets", ch. 3 (banding)

pub mod lsh;
pub mod minhash;
pub mod shingle;
mod stable;

pub use lsh::{bands_for_threshold, collision_probability, factor_pairs, BandedIndex};
pub use minhash::{estimate_similarity, MinHash, MinHashSignature, DEFAULT_MODULUS, DEFAULT_SEED};
pub use shingle::shingles;
