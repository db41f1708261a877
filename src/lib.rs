//! neardup: near-duplicate retrieval with MinHash and banded LSH.
//!
//! Finds, for a query item, the corpus items whose text is likely to be a
//! near-duplicate, without an all-pairs Jaccard comparison:
//!
//! ```text
//! text ─▶ shingles ─▶ MinHash signature ─▶ banded LSH index
//!                                               │
//! query signature ─────────────────────▶ candidates ─▶ ranked by estimate
//! ```
//!
//! - [`hash`]: shingling, MinHash signatures, the banded index
//! - [`ranking`]: ordering candidates by estimated similarity
//! - [`benchmark`]: precision@k, MAP@k, synthetic corpora, parameter sweeps
//! - [`engine`]: id-level search over a [`corpus::Corpus`]
//!
//! # Critical Nuances
//!
//! ## Estimates, not exact similarity
//!
//! The fraction of equal signature positions is an unbiased estimate of
//! Jaccard similarity with standard deviation `sqrt(J(1-J)/H)`. At `H = 100`
//! and `J = 0.5` that is ±0.05; ranking within that band is noisy.
//!
//! ## The banding tradeoff
//!
//! With `b` bands of `r` rows, a pair with agreement `s` becomes a candidate
//! with probability `1 - (1 - s^r)^b`. Raising `b` buys recall at the cost of
//! more candidates to score; raising `r` does the opposite.
//!
//! ## Comparability
//!
//! Signatures are only comparable when produced by generators with the same
//! `(H, seed, modulus)`. Mixing them is a configuration error when lengths
//! differ and silently meaningless when they do not.
//!
//! # Example
//!
//! ```rust
//! use neardup::config::LshConfig;
//! use neardup::corpus::{Corpus, Item};
//! use neardup::engine::SimilarityEngine;
//!
//! let corpus: Corpus = [
//!     Item::from_raw("A1", "Dryer Vent Hose, 4 in.", "", vec![]),
//!     Item::from_raw("A2", "Dryer Vent Hose 4in", "", vec![]),
//!     Item::from_raw("B1", "Ice Maker Water Line", "", vec![]),
//! ]
//! .into_iter()
//! .collect();
//!
//! let config = LshConfig { shingle_size: 3, bands: 50, rows: 2, ..LshConfig::default() };
//! let engine = SimilarityEngine::build(&config, &corpus).unwrap();
//! let top = engine.similar_to("A1", 1).unwrap();
//! assert_eq!(top[0].id, "A2");
//! ```

pub mod benchmark;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod hash;
pub mod ranking;
pub mod text;

// Re-exports
pub use config::LshConfig;
pub use engine::SimilarityEngine;
pub use error::{ConfigError, Error, Result};
pub use hash::{estimate_similarity, shingles, BandedIndex, MinHash, MinHashSignature};
pub use ranking::{rank, ScoredItem};
