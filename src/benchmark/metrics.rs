//! Evaluation metrics for retrieval quality.
//!
//! Standard metrics comparing a ranked prediction list against a
//! ground-truth relevance set:
//! - Precision@k: hits in the first k predictions, over k
//! - Recall@k: hits in the first k predictions, over |truth|
//! - Average precision@k and its mean over queries (MAP@k)

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

/// Compute precision@k: fraction of the first `k` predictions that are relevant.
///
/// precision@k = |predicted[..k] ∩ truth| / k
///
/// The denominator is `k` even when fewer than `k` predictions were made,
/// so short lists are penalized.
///
/// # Returns
///
/// Precision value in [0.0, 1.0]; 0 when `k == 0`.
pub fn precision_at_k<T: Eq + Hash>(predicted: &[T], truth: &HashSet<T>, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let hits = predicted.iter().take(k).filter(|id| truth.contains(*id)).count();
    hits as f64 / k as f64
}

/// Compute recall@k: fraction of the relevant items found in the first `k`.
///
/// recall@k = |predicted[..k] ∩ truth| / |truth|
pub fn recall_at_k<T: Eq + Hash>(predicted: &[T], truth: &HashSet<T>, k: usize) -> f64 {
    if k == 0 || truth.is_empty() {
        return 0.0;
    }
    let found: HashSet<&T> = predicted.iter().take(k).filter(|id| truth.contains(*id)).collect();
    found.len() as f64 / truth.len() as f64
}

/// Average precision over the first `k` predictions.
///
/// At every 1-indexed position `i` holding a relevant prediction, add
/// `hits_so_far / i`; divide the sum by `min(|truth|, k)`.
pub fn average_precision_at_k<T: Eq + Hash>(predicted: &[T], truth: &HashSet<T>, k: usize) -> f64 {
    if truth.is_empty() || k == 0 {
        return 0.0;
    }

    let mut hits = 0usize;
    let mut sum = 0.0;
    for (i, id) in predicted.iter().take(k).enumerate() {
        if truth.contains(id) {
            hits += 1;
            sum += hits as f64 / (i + 1) as f64;
        }
    }
    sum / truth.len().min(k) as f64
}

/// Mean of [`average_precision_at_k`] over every query in `predictions`.
///
/// A query without an entry in `truths` contributes an AP of 0.
pub fn mean_average_precision_at_k<Q, T>(
    predictions: &BTreeMap<Q, Vec<T>>,
    truths: &HashMap<Q, HashSet<T>>,
    k: usize,
) -> f64
where
    Q: Ord + Eq + Hash,
    T: Eq + Hash,
{
    if predictions.is_empty() {
        return 0.0;
    }

    let total: f64 = predictions
        .iter()
        .map(|(query, predicted)| {
            truths
                .get(query)
                .map_or(0.0, |truth| average_precision_at_k(predicted, truth, k))
        })
        .sum();
    total / predictions.len() as f64
}

/// Mean precision@k over every query in `predictions`.
pub fn mean_precision_at_k<Q, T>(
    predictions: &BTreeMap<Q, Vec<T>>,
    truths: &HashMap<Q, HashSet<T>>,
    k: usize,
) -> f64
where
    Q: Ord + Eq + Hash,
    T: Eq + Hash,
{
    if predictions.is_empty() {
        return 0.0;
    }

    let total: f64 = predictions
        .iter()
        .map(|(query, predicted)| {
            truths
                .get(query)
                .map_or(0.0, |truth| precision_at_k(predicted, truth, k))
        })
        .sum();
    total / predictions.len() as f64
}
