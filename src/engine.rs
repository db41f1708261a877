//! Corpus-level similarity search.
//!
//! [`SimilarityEngine`] is the caller layer around the hashing core: it
//! resolves item ids to signatures, reports unknown ids as
//! [`Error::NotFound`], and drops the query item from its own results.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Instant;

use tracing::info;

use crate::benchmark::metrics::precision_at_k;
use crate::config::LshConfig;
use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::hash::{shingles, BandedIndex, MinHash, MinHashSignature};
use crate::ranking::{rank, ScoredItem};
use crate::text::normalize_text;

/// Signatures and banded index for one corpus under one configuration.
///
/// Immutable after [`build`](Self::build); every query takes `&self`.
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    config: LshConfig,
    minhash: MinHash,
    index: BandedIndex,
    signatures: HashMap<String, MinHashSignature>,
    truth: HashMap<String, HashSet<String>>,
}

impl SimilarityEngine {
    /// Shingle, sign and index every item in `corpus`.
    pub fn build(config: &LshConfig, corpus: &Corpus) -> Result<Self> {
        config.validate()?;
        let start = Instant::now();

        let minhash = MinHash::with_modulus(config.num_hashes, config.seed, config.modulus)?;

        let ids: Vec<String> = corpus.ids().map(str::to_string).collect();
        let shingle_sets = corpus
            .iter()
            .map(|item| shingles(&item.text(config.text_field), config.shingle_size))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let signatures = minhash.signatures(&shingle_sets);
        let entries: Vec<(String, MinHashSignature)> = ids.into_iter().zip(signatures).collect();

        let index = BandedIndex::for_signature_len(config.bands, config.rows, config.num_hashes)?;
        #[cfg(feature = "parallel")]
        let index = index.build_par(&entries)?;
        #[cfg(not(feature = "parallel"))]
        let index = index.build(entries.iter().map(|(id, sig)| (id.as_str(), sig)))?;

        let truth = corpus
            .iter()
            .filter(|item| !item.related.is_empty())
            .map(|item| (item.id.clone(), item.related_set()))
            .collect();

        info!(
            items = entries.len(),
            shingle_size = config.shingle_size,
            num_hashes = config.num_hashes,
            bands = config.bands,
            rows = config.rows,
            buckets = index.num_buckets(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "similarity engine built"
        );

        Ok(Self {
            config: config.clone(),
            minhash,
            index,
            signatures: entries.into_iter().collect(),
            truth,
        })
    }

    /// Signature of an indexed item.
    pub fn signature(&self, id: &str) -> Result<&MinHashSignature> {
        self.signatures
            .get(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Signature of arbitrary raw text under this engine's configuration.
    pub fn signature_for_text(&self, raw: &str) -> Result<MinHashSignature> {
        let set = shingles(&normalize_text(raw), self.config.shingle_size)?;
        Ok(self.minhash.signature(&set))
    }

    /// LSH candidates for an indexed item, excluding the item itself.
    pub fn candidates(&self, id: &str) -> Result<BTreeSet<&str>> {
        let mut found = self.index.query(self.signature(id)?)?;
        found.remove(id);
        Ok(found)
    }

    /// Top `top_k` candidates for an indexed item, excluding itself.
    pub fn similar_to(&self, id: &str, top_k: usize) -> Result<Vec<ScoredItem>> {
        let query = self.signature(id)?;
        let candidates = self.candidates(id)?;
        self.rank_candidates(query, candidates, top_k)
    }

    /// Top `top_k` indexed items for raw text that need not be in the corpus.
    pub fn similar_to_text(&self, raw: &str, top_k: usize) -> Result<Vec<ScoredItem>> {
        let query = self.signature_for_text(raw)?;
        let candidates = self.index.query(&query)?;
        self.rank_candidates(&query, candidates, top_k)
    }

    /// precision@`top_k` of [`similar_to`](Self::similar_to) against the
    /// item's own related ids (0 when it has none).
    pub fn precision_for(&self, id: &str, top_k: usize) -> Result<f64> {
        let predicted: Vec<String> = self
            .similar_to(id, top_k)?
            .into_iter()
            .map(|s| s.id)
            .collect();
        let empty = HashSet::new();
        let truth = self.truth.get(id).unwrap_or(&empty);
        Ok(precision_at_k(&predicted, truth, top_k))
    }

    fn rank_candidates(
        &self,
        query: &MinHashSignature,
        candidates: BTreeSet<&str>,
        top_k: usize,
    ) -> Result<Vec<ScoredItem>> {
        let scored = candidates
            .into_iter()
            .filter_map(|cid| self.signatures.get(cid).map(|sig| (cid, sig)));
        Ok(rank(query, scored, top_k)?)
    }

    pub fn config(&self) -> &LshConfig {
        &self.config
    }

    pub fn minhash(&self) -> &MinHash {
        &self.minhash
    }

    pub fn index(&self) -> &BandedIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Item, TextField};

    fn corpus() -> Corpus {
        [
            Item::new("a", "stainless steel dryer vent hose", "", vec!["b".into()]),
            Item::new("b", "stainless steel dryer vent hose kit", "", vec!["a".into()]),
            Item::new("c", "refrigerator water filter replacement", "", vec![]),
            Item::new("d", "", "", vec![]),
        ]
        .into_iter()
        .collect()
    }

    fn config() -> LshConfig {
        LshConfig {
            shingle_size: 3,
            num_hashes: 100,
            bands: 50,
            rows: 2,
            text_field: TextField::Title,
            ..LshConfig::default()
        }
    }

    #[test]
    fn finds_near_duplicate_and_excludes_self() {
        let engine = SimilarityEngine::build(&config(), &corpus()).unwrap();
        assert_eq!(engine.len(), 4);

        let results = engine.similar_to("a", 5).unwrap();
        assert_eq!(results[0].id, "b");
        assert!(results.iter().all(|r| r.id != "a"));
        assert!(!engine.candidates("a").unwrap().contains("a"));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let engine = SimilarityEngine::build(&config(), &corpus()).unwrap();
        assert_eq!(
            engine.similar_to("zzz", 5).unwrap_err(),
            Error::NotFound("zzz".into())
        );
    }

    #[test]
    fn empty_items_only_match_each_other() {
        let engine = SimilarityEngine::build(&config(), &corpus()).unwrap();
        let sig = engine.signature("d").unwrap();
        assert!(sig.is_sentinel(engine.config().modulus));
        assert!(engine.candidates("d").unwrap().is_empty());
    }

    #[test]
    fn text_query_includes_exact_match() {
        let engine = SimilarityEngine::build(&config(), &corpus()).unwrap();
        let results = engine
            .similar_to_text("<i>Refrigerator</i> Water Filter Replacement", 3)
            .unwrap();
        assert_eq!(results[0].id, "c");
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn precision_against_related() {
        let engine = SimilarityEngine::build(&config(), &corpus()).unwrap();
        // "b" is the single related id; one hit out of k=1.
        assert_eq!(engine.precision_for("a", 1).unwrap(), 1.0);
        assert_eq!(engine.precision_for("c", 1).unwrap(), 0.0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let bad = LshConfig {
            bands: 7,
            rows: 3,
            num_hashes: 20,
            ..LshConfig::default()
        };
        assert!(matches!(
            SimilarityEngine::build(&bad, &corpus()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn empty_corpus_builds() {
        let engine = SimilarityEngine::build(&config(), &Corpus::new()).unwrap();
        assert!(engine.is_empty());
        assert!(engine.index().is_empty());
    }
}
