use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tags attached to a content item. Stored as given, matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet {
    inner: BTreeSet<String>,
}

impl TagSet {
    pub fn new() -> Self {
        TagSet {
            inner: BTreeSet::new(),
        }
    }

    pub fn insert(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        let tag = tag.trim();
        if !tag.is_empty() {
            self.inner.insert(tag.to_string());
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.inner.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn matches_any<S: AsRef<str>>(&self, wanted: &[S]) -> bool {
        wanted.iter().any(|w| self.contains(w.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.inner.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = TagSet::new();
        for tag in iter {
            tags.insert(tag);
        }
        tags
    }
}
