//! Synthetic near-duplicate corpora for tests and benchmarks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::corpus::{Corpus, Item};

/// Shape of a generated corpus.
#[derive(Debug, Clone)]
pub struct ClusterSpec {
    /// Number of distinct base items.
    pub n_clusters: usize,
    /// Variants generated per base item (including the base itself).
    pub per_cluster: usize,
    /// Words in each base title.
    pub title_words: usize,
    /// Words in each base description.
    pub description_words: usize,
    /// Probability that a word is replaced in a variant.
    pub mutation_rate: f64,
    /// Distinct words to draw from.
    pub vocabulary: usize,
}

impl Default for ClusterSpec {
    fn default() -> Self {
        Self {
            n_clusters: 50,
            per_cluster: 4,
            title_words: 8,
            description_words: 30,
            mutation_rate: 0.1,
            vocabulary: 2_000,
        }
    }
}

/// Create a corpus of clustered near-duplicates.
///
/// Every item's `related` list names the other members of its cluster, so
/// the corpus carries its own ground truth. Ids are `c{cluster}-v{variant}`,
/// zero-padded so id order follows cluster order.
///
/// # Arguments
///
/// * `shape` - Corpus shape
/// * `seed` - Random seed for reproducibility
pub fn generate_clustered_corpus(shape: &ClusterSpec, seed: u64) -> Corpus {
    let mut rng = StdRng::seed_from_u64(seed);
    let vocabulary: Vec<String> = (0..shape.vocabulary.max(1))
        .map(|_| random_word(&mut rng))
        .collect();

    let mut corpus = Corpus::new();
    for c in 0..shape.n_clusters {
        let title = random_words(&mut rng, &vocabulary, shape.title_words);
        let description = random_words(&mut rng, &vocabulary, shape.description_words);
        let ids: Vec<String> = (0..shape.per_cluster).map(|v| item_id(c, v)).collect();

        for (v, id) in ids.iter().enumerate() {
            let (t, d) = if v == 0 {
                (title.clone(), description.clone())
            } else {
                (
                    mutate(&mut rng, &vocabulary, &title, shape.mutation_rate),
                    mutate(&mut rng, &vocabulary, &description, shape.mutation_rate),
                )
            };
            let related = ids.iter().filter(|other| *other != id).cloned().collect();
            corpus.insert(Item::new(id.clone(), t.join(" "), d.join(" "), related));
        }
    }
    corpus
}

/// Id of variant `v` in cluster `c`.
pub fn item_id(c: usize, v: usize) -> String {
    format!("c{c:05}-v{v:03}")
}

fn random_word(rng: &mut StdRng) -> String {
    let len = rng.random_range(3..10);
    (0..len)
        .map(|_| char::from(b'a' + rng.random_range(0..26u8)))
        .collect()
}

fn random_words(rng: &mut StdRng, vocabulary: &[String], n: usize) -> Vec<String> {
    (0..n)
        .map(|_| vocabulary[rng.random_range(0..vocabulary.len())].clone())
        .collect()
}

fn mutate(rng: &mut StdRng, vocabulary: &[String], words: &[String], rate: f64) -> Vec<String> {
    words
        .iter()
        .map(|w| {
            if rng.random::<f64>() < rate {
                vocabulary[rng.random_range(0..vocabulary.len())].clone()
            } else {
                w.clone()
            }
        })
        .collect()
}
