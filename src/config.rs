//! Run configuration for the similarity engine.
//!
//! One [`LshConfig`] fixes every parameter that makes signatures and indexes
//! comparable: shingle size `K`, hash count `H`, bands `b`, rows `r`, seed
//! and modulus. Loaded from JSON or built in code, it is validated once and
//! then treated as immutable for the rest of the run.

use serde::{Deserialize, Serialize};

use crate::corpus::TextField;
use crate::error::{ConfigError, Result};
use crate::hash::lsh::{bands_for_threshold, s_curve_threshold};
use crate::hash::minhash::{is_prime, DEFAULT_MODULUS, DEFAULT_SEED, MIN_MODULUS};

/// Parameters for shingling, MinHash, banding and ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LshConfig {
    /// Shingle size `K` in characters.
    pub shingle_size: usize,
    /// Signature length `H`.
    pub num_hashes: usize,
    /// Number of bands `b`.
    pub bands: usize,
    /// Rows per band `r`.
    pub rows: usize,
    /// Seed for the hash coefficients.
    pub seed: u64,
    /// Prime modulus `p` for the affine hash family.
    pub modulus: u64,
    /// Results kept per query.
    pub top_k: usize,
    /// Which item text is shingled.
    pub text_field: TextField,
}

impl Default for LshConfig {
    fn default() -> Self {
        Self {
            shingle_size: 5,
            num_hashes: 100,
            bands: 20,
            rows: 5,
            seed: DEFAULT_SEED,
            modulus: DEFAULT_MODULUS,
            top_k: 10,
            text_field: TextField::TitleDescription,
        }
    }
}

impl LshConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Default configuration with `(b, r)` chosen for a target threshold.
    pub fn for_threshold(num_hashes: usize, threshold: f64) -> std::result::Result<Self, ConfigError> {
        let (bands, rows) = bands_for_threshold(num_hashes, threshold)?;
        Ok(Self {
            num_hashes,
            bands,
            rows,
            ..Self::default()
        })
    }

    /// Check every parameter invariant.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.shingle_size == 0 {
            return Err(ConfigError::invalid("shingle_size", "must be at least 1"));
        }
        if self.num_hashes == 0 {
            return Err(ConfigError::invalid("num_hashes", "must be at least 1"));
        }
        if self.bands == 0 {
            return Err(ConfigError::invalid("bands", "must be at least 1"));
        }
        if self.rows == 0 {
            return Err(ConfigError::invalid("rows", "must be at least 1"));
        }
        if self.bands.checked_mul(self.rows) != Some(self.num_hashes) {
            return Err(ConfigError::band_mismatch(self.bands, self.rows, self.num_hashes));
        }
        if self.modulus < MIN_MODULUS || !is_prime(self.modulus) {
            return Err(ConfigError::InvalidModulus {
                modulus: self.modulus,
                reason: "must be a prime of at least 65537",
            });
        }
        Ok(())
    }

    /// S-curve midpoint `(1/b)^(1/r)` for this banding.
    pub fn threshold(&self) -> f64 {
        s_curve_threshold(self.bands, self.rows)
    }
}
