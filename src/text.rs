//! Text normalization ahead of shingling.
//!
//! Product titles and descriptions arrive with HTML fragments, entities and
//! mixed punctuation. Normalized text is lowercase ASCII alphanumerics
//! separated by single spaces, which keeps `^` and `$` free for the shingle
//! boundary markers.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

static TAG_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn tag_re() -> Option<&'static Regex> {
    TAG_RE
        .get_or_init(|| match Regex::new(r"<[^>]+>") {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(error = %e, "Failed to compile markup tag regex");
                None
            }
        })
        .as_ref()
}

/// Replace tags with spaces and decode HTML entities.
///
/// Decoding covers the full HTML5 named-entity table, numeric references,
/// and the legacy names that may omit their trailing `;` (`&amp`, `&reg`).
pub fn strip_markup(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let untagged = match tag_re() {
        Some(re) => re.replace_all(raw, " "),
        None => Cow::Borrowed(raw),
    };
    htmlize::unescape(untagged).into_owned()
}

/// Lowercase, strip markup, and collapse everything outside `[a-z0-9]` to
/// single spaces.
pub fn normalize_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let lowered = strip_markup(raw).to_lowercase();
    lowered
        .split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_entities() {
        assert_eq!(strip_markup("<b>Dryer</b>&nbsp;Vent &amp; Kit"), " Dryer \u{a0}Vent & Kit");
        assert_eq!(strip_markup("5&#39;&#x22;"), "5'\"");
    }

    #[test]
    fn decodes_full_named_entity_table() {
        assert_eq!(strip_markup("Whirlpool&reg; Filter"), "Whirlpool\u{ae} Filter");
        assert_eq!(strip_markup("Caf&eacute;"), "Caf\u{e9}");
        assert_eq!(strip_markup("Men&rsquo;s"), "Men\u{2019}s");
        assert_eq!(strip_markup("Kit&trade;"), "Kit\u{2122}");
    }

    #[test]
    fn decodes_legacy_entities_without_semicolon() {
        assert_eq!(strip_markup("Salt &amp Pepper"), "Salt & Pepper");
        assert_eq!(strip_markup("&lt;3"), "<3");
    }

    #[test]
    fn unknown_entities_are_kept() {
        assert_eq!(strip_markup("a &bogus; b"), "a &bogus; b");
    }

    #[test]
    fn entities_never_become_words() {
        assert_eq!(normalize_text("Whirlpool&reg; Filter"), "whirlpool filter");
        assert_eq!(normalize_text("Caf&eacute;"), "caf");
        assert_eq!(normalize_text("Men&rsquo;s Vent"), "men s vent");
        assert_eq!(normalize_text("Salt &amp Pepper"), "salt pepper");
        assert_eq!(normalize_text("Salt &amp; Pepper"), "salt pepper");
    }

    #[test]
    fn normalizes_to_lowercase_words() {
        assert_eq!(
            normalize_text("<p>Whirlpool W10295370A Refrigerator Water Filter, 1-Pack!</p>"),
            "whirlpool w10295370a refrigerator water filter 1 pack"
        );
    }

    #[test]
    fn empty_and_blank_inputs() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("  <br/> -- "), "");
    }

    #[test]
    fn non_ascii_letters_are_separators() {
        assert_eq!(normalize_text("Café Crème"), "caf cr me");
    }
}
