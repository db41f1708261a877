//! Retrieval-quality evaluation.
//!
//! Provides metrics, synthetic corpora, and a sweep driver for measuring
//! how well LSH candidates approximate a ground-truth relevance set:
//!
//! - **Accuracy**: precision@k, recall@k, AP@k, MAP@k
//! - **Speed**: build time, per-query latency, QPS
//! - **Tuning**: sweeps over shingle size `K`, hash count `H`, and `(b, r)`

pub mod datasets;
pub mod evaluation;
pub mod metrics;

pub use datasets::{generate_clustered_corpus, ClusterSpec};
pub use evaluation::{
    evaluate, rows_for_hash_count, select_eval_ids, sweep_band_rows, sweep_num_hashes,
    sweep_shingle_sizes, EvalResult, EvalSetStats, SweepAxis, SweepRow,
};
pub use metrics::{
    average_precision_at_k, mean_average_precision_at_k, mean_precision_at_k, precision_at_k,
    recall_at_k,
};
