//! Duplicate groups and the canonical mapping handed to consumers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Names judged to be the same dish, with their chosen representative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Raw names in claim order; the first one seeded the group.
    pub members: Vec<String>,
    /// The member chosen to represent the group.
    pub canonical: String,
}

impl DuplicateGroup {
    /// The name that seeded the group; `None` for an empty group, which
    /// only a hand-built or deserialized report can contain.
    pub fn seed(&self) -> Option<&str> {
        self.members.first().map(String::as_str)
    }

    /// Members that will be replaced by the canonical name.
    pub fn duplicates(&self) -> impl Iterator<Item = &str> {
        self.members
            .iter()
            .map(String::as_str)
            .filter(move |member| *member != self.canonical)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Old name -> canonical name, for every name that changes.
///
/// Names that keep their identity are not stored; [`canonical_for`]
/// answers for them too, which makes the mapping total over the batch.
///
/// [`canonical_for`]: CanonicalMapping::canonical_for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalMapping {
    entries: BTreeMap<String, String>,
}

impl CanonicalMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the mapping from groups, skipping each canonical member.
    pub fn from_groups(groups: &[DuplicateGroup]) -> Self {
        let mut mapping = Self::new();
        for group in groups {
            for duplicate in group.duplicates() {
                mapping.insert(duplicate, &group.canonical);
            }
        }
        mapping
    }

    /// Records a replacement. Self-maps are ignored.
    pub fn insert(&mut self, old: impl Into<String>, canonical: impl Into<String>) {
        let old = old.into();
        let canonical = canonical.into();
        if old != canonical {
            self.entries.insert(old, canonical);
        }
    }

    /// The canonical name for `name`; `name` itself if it has no duplicates.
    pub fn canonical_for<'a>(&'a self, name: &'a str) -> &'a str {
        self.entries.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(old, canonical)| (old.as_str(), canonical.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of one deduplication run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DedupReport {
    /// Distinct names examined.
    pub total_names: usize,
    /// Groups with at least two members, in seed order.
    pub groups: Vec<DuplicateGroup>,
    /// Replacement for every non-canonical member.
    pub mapping: CanonicalMapping,
}

impl DedupReport {
    pub fn new(total_names: usize, groups: Vec<DuplicateGroup>) -> Self {
        let mapping = CanonicalMapping::from_groups(&groups);
        Self {
            total_names,
            groups,
            mapping,
        }
    }

    /// Number of names that disappear when the mapping is applied.
    pub fn merge_count(&self) -> usize {
        self.groups
            .iter()
            .map(|group| group.len().saturating_sub(1))
            .sum()
    }

    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }
}
