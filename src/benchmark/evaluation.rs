//! Evaluation driver: MAP@k of the similarity engine against ground truth.
//!
//! One [`evaluate`] call builds an engine for a configuration, predicts the
//! top-k similar items for every evaluation query, and scores the
//! predictions against each item's `related` ids. The sweep helpers repeat
//! that over a grid of one parameter and hand back rows for an external
//! report writer.
//!
//! | Metric | Formula | Interpretation |
//! |--------|---------|----------------|
//! | MAP@K | mean over queries of AP@K | Rank-aware retrieval quality |
//! | Precision@K | \|pred[..K] ∩ truth\| / K | Fraction of useful results |
//! | QPS | queries / seconds | Throughput |

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, info_span};

use super::metrics::{mean_average_precision_at_k, mean_precision_at_k};
use crate::config::LshConfig;
use crate::corpus::Corpus;
use crate::engine::SimilarityEngine;
use crate::error::Result;
use crate::hash::factor_pairs;

/// Up to `n` ids with non-empty ground truth, most related ids first.
///
/// Ties are broken by ascending id.
pub fn select_eval_ids(corpus: &Corpus, n: usize) -> Vec<String> {
    let mut counts: Vec<(&str, usize)> = corpus
        .iter()
        .filter(|item| !item.related.is_empty())
        .map(|item| (item.id.as_str(), item.related.len()))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    counts.into_iter().take(n).map(|(id, _)| id.to_string()).collect()
}

/// Size of the evaluation set and the spread of its ground-truth sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EvalSetStats {
    pub size: usize,
    pub max_related: usize,
    pub min_related: usize,
}

impl EvalSetStats {
    pub fn from_corpus(corpus: &Corpus, eval_ids: &[String]) -> Result<Self> {
        let mut max_related = 0;
        let mut min_related = usize::MAX;
        for id in eval_ids {
            let n = corpus.get(id)?.related.len();
            max_related = max_related.max(n);
            min_related = min_related.min(n);
        }
        if eval_ids.is_empty() {
            min_related = 0;
        }
        Ok(Self {
            size: eval_ids.len(),
            max_related,
            min_related,
        })
    }
}

/// Outcome of one configuration over one evaluation set.
#[derive(Debug, Clone)]
pub struct EvalResult {
    /// Configuration evaluated
    pub config: LshConfig,
    /// MAP@top_k over the evaluation ids
    pub map: f64,
    /// Mean precision@top_k over the evaluation ids
    pub mean_precision: f64,
    /// Mean LSH candidates per query (self excluded)
    pub mean_candidates: f64,
    /// Time to shingle, sign and index the corpus
    pub build_time: Duration,
    /// Per-query latency
    pub latencies_us: Vec<u64>,
}

impl EvalResult {
    /// Queries per second.
    pub fn qps(&self) -> f64 {
        if self.latencies_us.is_empty() {
            return 0.0;
        }
        let total_us: u64 = self.latencies_us.iter().sum();
        if total_us == 0 {
            return f64::INFINITY;
        }
        self.latencies_us.len() as f64 / (total_us as f64 / 1_000_000.0)
    }

    /// P50 (median) latency.
    pub fn p50_latency_us(&self) -> u64 {
        if self.latencies_us.is_empty() {
            return 0;
        }
        let mut sorted = self.latencies_us.clone();
        sorted.sort_unstable();
        sorted[sorted.len() / 2]
    }

    /// Format as a summary string.
    pub fn summary(&self) -> String {
        format!(
            "K={},H={},b={},r={}: map@{}={:.4}, p@{}={:.4}, cands={:.1}, qps={:.1}, build={:.2}s",
            self.config.shingle_size,
            self.config.num_hashes,
            self.config.bands,
            self.config.rows,
            self.config.top_k,
            self.map,
            self.config.top_k,
            self.mean_precision,
            self.mean_candidates,
            self.qps(),
            self.build_time.as_secs_f64(),
        )
    }
}

/// Build an engine for `config` and score it on `eval_ids`.
pub fn evaluate(corpus: &Corpus, config: &LshConfig, eval_ids: &[String]) -> Result<EvalResult> {
    let start = Instant::now();
    let engine = SimilarityEngine::build(config, corpus)?;
    let build_time = start.elapsed();

    let mut predictions: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    let mut truths: HashMap<&str, HashSet<String>> = HashMap::new();
    let mut latencies_us = Vec::with_capacity(eval_ids.len());
    let mut total_candidates = 0usize;

    for id in eval_ids {
        // Latency covers one lookup plus ranking; the candidate count is
        // taken outside the timed region.
        let query_start = Instant::now();
        let ranked = engine.similar_to(id, config.top_k)?;
        latencies_us.push(query_start.elapsed().as_micros() as u64);

        total_candidates += engine.candidates(id)?.len();
        predictions.insert(id.as_str(), ranked.into_iter().map(|s| s.id).collect());
        truths.insert(id.as_str(), corpus.truth_set(id)?);
    }

    let map = mean_average_precision_at_k(&predictions, &truths, config.top_k);
    let mean_precision = mean_precision_at_k(&predictions, &truths, config.top_k);
    let mean_candidates = if eval_ids.is_empty() {
        0.0
    } else {
        total_candidates as f64 / eval_ids.len() as f64
    };

    let result = EvalResult {
        config: config.clone(),
        map,
        mean_precision,
        mean_candidates,
        build_time,
        latencies_us,
    };
    info!(summary = %result.summary(), "evaluated configuration");
    Ok(result)
}

/// Which parameter a sweep varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepAxis {
    ShingleSize,
    NumHashes,
    BandsRows,
}

/// One row of a parameter sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRow {
    pub vary: SweepAxis,
    pub shingle_size: usize,
    pub num_hashes: usize,
    pub bands: usize,
    pub rows: usize,
    pub top_k: usize,
    pub map: f64,
    pub mean_precision: f64,
}

impl SweepRow {
    fn new(vary: SweepAxis, result: &EvalResult) -> Self {
        Self {
            vary,
            shingle_size: result.config.shingle_size,
            num_hashes: result.config.num_hashes,
            bands: result.config.bands,
            rows: result.config.rows,
            top_k: result.config.top_k,
            map: result.map,
            mean_precision: result.mean_precision,
        }
    }
}

/// Vary `K` with `H`, `b`, `r` taken from `base`.
pub fn sweep_shingle_sizes(
    corpus: &Corpus,
    base: &LshConfig,
    sizes: &[usize],
    eval_ids: &[String],
) -> Result<Vec<SweepRow>> {
    let configs = sizes.iter().map(|&shingle_size| LshConfig {
        shingle_size,
        ..base.clone()
    });
    run_sweep(corpus, SweepAxis::ShingleSize, configs, eval_ids)
}

/// Vary `H`, picking `r` with [`rows_for_hash_count`] and `b = H / r`.
pub fn sweep_num_hashes(
    corpus: &Corpus,
    base: &LshConfig,
    hash_counts: &[usize],
    eval_ids: &[String],
) -> Result<Vec<SweepRow>> {
    let configs = hash_counts.iter().map(|&num_hashes| {
        let rows = rows_for_hash_count(num_hashes);
        LshConfig {
            num_hashes,
            bands: num_hashes / rows,
            rows,
            ..base.clone()
        }
    });
    run_sweep(corpus, SweepAxis::NumHashes, configs, eval_ids)
}

/// Vary `(b, r)` over every factorization of `base.num_hashes`.
pub fn sweep_band_rows(corpus: &Corpus, base: &LshConfig, eval_ids: &[String]) -> Result<Vec<SweepRow>> {
    let configs = factor_pairs(base.num_hashes)
        .into_iter()
        .map(|(bands, rows)| LshConfig {
            bands,
            rows,
            ..base.clone()
        });
    run_sweep(corpus, SweepAxis::BandsRows, configs, eval_ids)
}

/// Rows per band for a hash count: 5 when it divides `H`, else 1.
pub fn rows_for_hash_count(num_hashes: usize) -> usize {
    if num_hashes % 5 == 0 {
        5
    } else {
        1
    }
}

fn run_sweep(
    corpus: &Corpus,
    axis: SweepAxis,
    configs: impl Iterator<Item = LshConfig>,
    eval_ids: &[String],
) -> Result<Vec<SweepRow>> {
    let span = info_span!("sweep", axis = ?axis, queries = eval_ids.len());
    let _guard = span.enter();

    let mut rows = Vec::new();
    for config in configs {
        if config.bands == 0 || config.bands * config.rows != config.num_hashes {
            debug!(bands = config.bands, rows = config.rows, num_hashes = config.num_hashes, "skipping inconsistent banding");
            continue;
        }
        let result = evaluate(corpus, &config, eval_ids)?;
        rows.push(SweepRow::new(axis, &result));
    }
    Ok(rows)
}
