//! In-memory note filter.
//!
//! # Invariants
//! - All criteria are combined with AND.
//! - Empty criteria match everything.
//! - Results keep collection order.

use crate::model::note::{Note, NoteKind};
use std::collections::BTreeSet;

/// Filter criteria for the note list view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    /// Case-insensitive substring over title, content, category and tags.
    pub query: String,
    /// Note category must be one of these.
    pub categories: Vec<String>,
    /// Note must carry every one of these tags.
    pub tags: Vec<String>,
    pub kind: Option<NoteKind>,
}

impl NoteFilter {
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty()
            && self.categories.is_empty()
            && self.tags.is_empty()
            && self.kind.is_none()
    }

    /// Returns whether one note passes every criterion.
    pub fn matches(&self, note: &Note) -> bool {
        self.matches_query(note)
            && (self.categories.is_empty() || self.categories.contains(&note.category))
            && self.tags.iter().all(|tag| note.has_tag(tag))
            && self.kind.map_or(true, |kind| note.kind == kind)
    }

    /// Applies the filter, preserving input order.
    pub fn apply<'a>(&self, notes: &'a [Note]) -> Vec<&'a Note> {
        notes.iter().filter(|note| self.matches(note)).collect()
    }

    fn matches_query(&self, note: &Note) -> bool {
        let query = self.query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        let haystack = [
            note.title.as_str(),
            note.content.as_str(),
            note.category.as_str(),
            note.tags.join(" ").as_str(),
        ]
        .join(" ")
        .to_lowercase();
        haystack.contains(&query)
    }
}

/// Sorted distinct categories present in `notes`.
pub fn categories(notes: &[Note]) -> Vec<String> {
    notes
        .iter()
        .map(|note| note.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted distinct tags present in `notes`.
pub fn tags(notes: &[Note]) -> Vec<String> {
    notes
        .iter()
        .flat_map(|note| note.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
