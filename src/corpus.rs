//! Corpus items and the text each one contributes to shingling.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::text::normalize_text;

/// Which normalized text of an item is shingled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    /// Title only.
    Title,
    /// Description only.
    Description,
    /// Title twice, then description: titles are short and more
    /// discriminative, so they are weighted up.
    #[default]
    TitleDescription,
}

/// One corpus entry.
///
/// `title` and `description` hold normalized text; use [`Item::from_raw`]
/// when starting from source markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Ground-truth ids considered similar to this one.
    #[serde(default)]
    pub related: Vec<String>,
}

impl Item {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        related: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            related,
        }
    }

    /// Build an item from raw (markup-bearing) title and description.
    pub fn from_raw(id: impl Into<String>, raw_title: &str, raw_description: &str, related: Vec<String>) -> Self {
        Self::new(id, normalize_text(raw_title), normalize_text(raw_description), related)
    }

    /// The text shingled for `field`.
    pub fn text(&self, field: TextField) -> String {
        match field {
            TextField::Title => self.title.clone(),
            TextField::Description => self.description.clone(),
            TextField::TitleDescription => {
                format!("{0} {0} {1}", self.title, self.description).trim().to_string()
            }
        }
    }

    pub fn related_set(&self) -> HashSet<String> {
        self.related.iter().cloned().collect()
    }
}

/// Items keyed by id, iterated in id order.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    items: BTreeMap<String, Item>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item, returning the one it replaced if the id was taken.
    pub fn insert(&mut self, item: Item) -> Option<Item> {
        self.items.insert(item.id.clone(), item)
    }

    /// Look up an item by id.
    pub fn get(&self, id: &str) -> Result<&Item> {
        self.items.get(id).ok_or_else(|| Error::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Ground-truth set for `id`.
    pub fn truth_set(&self, id: &str) -> Result<HashSet<String>> {
        Ok(self.get(id)?.related_set())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Item> for Corpus {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        let mut corpus = Self::new();
        for item in iter {
            corpus.insert(item);
        }
        corpus
    }
}
