//! Ranking of LSH candidates by estimated Jaccard similarity.

use std::cmp::Ordering;

use serde::Serialize;

use crate::error::ConfigError;
use crate::hash::{estimate_similarity, MinHashSignature};

/// A candidate id with its estimated similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredItem {
    pub id: String,
    pub score: f64,
}

/// Score candidates against `query`, best first, and keep `top_k`.
///
/// Equal scores are ordered by ascending id so that output never depends on
/// the iteration order of the candidate set.
pub fn rank<'a, S, I>(query: &MinHashSignature, candidates: I, top_k: usize) -> Result<Vec<ScoredItem>, ConfigError>
where
    S: Into<String>,
    I: IntoIterator<Item = (S, &'a MinHashSignature)>,
{
    let mut scored = candidates
        .into_iter()
        .map(|(id, sig)| {
            Ok(ScoredItem {
                id: id.into(),
                score: estimate_similarity(query, sig)?,
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    scored.sort_unstable_by(compare);
    scored.truncate(top_k);
    Ok(scored)
}

fn compare(a: &ScoredItem, b: &ScoredItem) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id))
}
