//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical tip record shared by cache, remote and proxy.
//! - Build new notes from user drafts with input normalization.
//!
//! # Invariants
//! - `id` and `created_at` never change after creation.
//! - Wire field names match the remote document (`type`, `createdAt`).
//! - `kind` affects presentation only, never storage shape.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Category used when a draft leaves the category blank.
pub const DEFAULT_CATEGORY: &str = "General";

static CHECKLIST_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[-*+]|\d+[.)])?\s*(?:\[( |x|X)\])?\s*").expect("valid checklist regex")
});

/// Opaque note identifier.
///
/// Generated ids are UUID v4 text, but imported or remote records may carry
/// any string, so the type stays a plain `String`.
pub type NoteId = String;

/// Presentation kind of one note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    /// Free-form text.
    #[default]
    Note,
    /// Code snippet, rendered monospace and copyable.
    Code,
    /// Line-delimited checklist items.
    Checklist,
}

impl NoteKind {
    /// Stable lowercase name used on the wire and in CLI arguments.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Code => "code",
            Self::Checklist => "checklist",
        }
    }

    /// Parses a case-insensitive kind name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "note" => Some(Self::Note),
            "code" => Some(Self::Code),
            "checklist" => Some(Self::Checklist),
            _ => None,
        }
    }
}

impl Display for NoteKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user-authored tip.
///
/// `category`, `tags` and `type` may be missing in hand-edited documents;
/// they decode as `General`, no tags and `note`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Serialized as `type` to match the remote document.
    #[serde(rename = "type", default)]
    pub kind: NoteKind,
    /// Unix epoch milliseconds.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

/// Unvalidated user input for a new or edited note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub category: String,
    /// Comma-separated tag text as typed by the user.
    pub tags: String,
    pub kind: NoteKind,
}

/// Validation failures for note drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyTitle,
    EmptyContent,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title cannot be empty"),
            Self::EmptyContent => write!(f, "note content cannot be empty"),
        }
    }
}

impl Error for NoteValidationError {}

/// One parsed line of a checklist note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub text: String,
    pub checked: bool,
}

impl Note {
    /// Creates a note from a draft with a fresh id and `created_at`.
    ///
    /// # Errors
    /// - `EmptyTitle` / `EmptyContent` when the trimmed value is empty.
    pub fn from_draft(draft: NoteDraft, created_at: i64) -> Result<Self, NoteValidationError> {
        Self::from_draft_with_id(Uuid::new_v4().to_string(), draft, created_at)
    }

    /// Creates a note from a draft keeping a caller-provided identity.
    ///
    /// Used by edit paths, where `id` and `created_at` come from the record
    /// being replaced.
    pub fn from_draft_with_id(
        id: NoteId,
        draft: NoteDraft,
        created_at: i64,
    ) -> Result<Self, NoteValidationError> {
        Self::build(
            id,
            &draft.title,
            &draft.content,
            &draft.category,
            parse_tag_list(&draft.tags),
            draft.kind,
            created_at,
        )
    }

    /// Applies draft normalization to an already-built record.
    ///
    /// `id`, `kind` and `created_at` pass through; title, content, category
    /// and tags get the same trimming and checks as [`Note::from_draft`].
    pub fn normalized(self) -> Result<Self, NoteValidationError> {
        let tags = normalize_tags(self.tags.iter().map(String::as_str));
        Self::build(
            self.id,
            &self.title,
            &self.content,
            &self.category,
            tags,
            self.kind,
            self.created_at,
        )
    }

    fn build(
        id: NoteId,
        title: &str,
        content: &str,
        category: &str,
        tags: Vec<String>,
        kind: NoteKind,
        created_at: i64,
    ) -> Result<Self, NoteValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(NoteValidationError::EmptyTitle);
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(NoteValidationError::EmptyContent);
        }
        let category = match category.trim() {
            "" => DEFAULT_CATEGORY,
            value => value,
        };

        Ok(Self {
            id,
            title: title.to_string(),
            content: content.to_string(),
            category: category.to_string(),
            tags,
            kind,
            created_at,
        })
    }

    /// Returns checklist items parsed from `content`, one per non-blank line.
    ///
    /// Works for any kind; callers usually only ask for `Checklist` notes.
    pub fn checklist_items(&self) -> Vec<ChecklistItem> {
        self.content
            .lines()
            .filter_map(|line| {
                let captures = CHECKLIST_MARKER_RE.captures(line)?;
                let marker_len = captures.get(0).map_or(0, |m| m.end());
                let text = line[marker_len..].trim();
                if text.is_empty() {
                    return None;
                }
                let checked = captures
                    .get(1)
                    .is_some_and(|m| m.as_str().eq_ignore_ascii_case("x"));
                Some(ChecklistItem {
                    text: text.to_string(),
                    checked,
                })
            })
            .collect()
    }

    /// Returns whether this note carries `tag` (exact match).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|value| value == tag)
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Splits comma-separated tag text into a trimmed, deduplicated list.
///
/// First-seen order is kept; empty entries are dropped.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    normalize_tags(raw.split(','))
}

/// Trims tags, drops empty entries and duplicates, keeping first-seen order.
pub fn normalize_tags<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.into_iter().map(str::trim).filter(|tag| !tag.is_empty()) {
        if !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}
