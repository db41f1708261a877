//! Character k-shingles.
//!
//! The text is wrapped in boundary markers before windowing so that a word
//! at the start or end of a string produces features distinct from the same
//! characters in the middle: `"ab"` with k=2 gives `{"^a", "ab", "b$"}`.

use std::collections::HashSet;

use crate::error::ConfigError;

/// Prepended to the text before shingling.
pub const START_MARKER: char = '^';
/// Appended to the text before shingling.
pub const END_MARKER: char = '$';

/// All distinct length-`k` character windows of `^text$`.
///
/// Empty text yields an empty set. If the marked text is shorter than `k`
/// the whole marked string is the only shingle.
pub fn shingles(text: &str, k: usize) -> Result<HashSet<String>, ConfigError> {
    if k == 0 {
        return Err(ConfigError::invalid("k", "shingle size must be at least 1"));
    }
    if text.is_empty() {
        return Ok(HashSet::new());
    }

    let marked: Vec<char> = std::iter::once(START_MARKER)
        .chain(text.chars())
        .chain(std::iter::once(END_MARKER))
        .collect();

    if marked.len() < k {
        let whole: String = marked.into_iter().collect();
        return Ok(HashSet::from([whole]));
    }

    Ok(marked.windows(k).map(|w| w.iter().collect()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_text_has_no_shingles() {
        assert!(shingles("", 3).unwrap().is_empty());
    }

    #[test]
    fn short_text_is_one_shingle() {
        assert_eq!(shingles("ab", 5).unwrap(), set(&["^ab$"]));
    }

    #[test]
    fn exact_length_is_one_window() {
        assert_eq!(shingles("ab", 4).unwrap(), set(&["^ab$"]));
    }

    #[test]
    fn boundary_markers_are_features() {
        assert_eq!(shingles("ab", 2).unwrap(), set(&["^a", "ab", "b$"]));
    }

    #[test]
    fn duplicates_collapse() {
        // ^aaaa$ -> ^a, aa, aa, aa, a$
        assert_eq!(shingles("aaaa", 2).unwrap(), set(&["^a", "aa", "a$"]));
    }

    #[test]
    fn windows_are_over_chars_not_bytes() {
        let s = shingles("héllo", 3).unwrap();
        assert!(s.contains("hél"));
        assert!(s.iter().all(|sh| sh.chars().count() == 3));
    }

    #[test]
    fn zero_k_is_rejected() {
        assert!(matches!(
            shingles("abc", 0),
            Err(ConfigError::InvalidParameter { name: "k", .. })
        ));
    }
}
