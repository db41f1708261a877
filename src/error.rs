//! Error types for neardup.

use thiserror::Error;

/// Invariant violations in signature, index, or shingle configuration.
///
/// These are fatal: a caller holding one must not go on with the
/// configuration that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A count or size parameter is out of range (e.g. zero).
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Bands times rows does not cover the signature length.
    #[error("bands ({bands}) * rows ({rows}) = {product} does not match signature length {num_hashes}")]
    BandMismatch {
        bands: usize,
        rows: usize,
        product: usize,
        num_hashes: usize,
    },

    /// Two signatures (or a signature and an index) disagree on length.
    #[error("signature length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// The hash modulus is not a usable prime.
    #[error("invalid modulus {modulus}: {reason}")]
    InvalidModulus { modulus: u64, reason: &'static str },
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn band_mismatch(bands: usize, rows: usize, num_hashes: usize) -> Self {
        Self::BandMismatch {
            bands,
            rows,
            product: bands.saturating_mul(rows),
            num_hashes,
        }
    }
}

/// Errors raised by the corpus-facing layer (engine, corpus, evaluation).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Configuration invariant violated.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Requested item id is not in the corpus.
    #[error("item not found: {0}")]
    NotFound(String),

    /// Configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
