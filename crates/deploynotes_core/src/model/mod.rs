//! Domain model for deploy notes.
//!
//! # Responsibility
//! - Define the note record and draft shapes used by every layer.
//! - Own the one JSON codec shared by cache, remote and import paths.
//!
//! # Invariants
//! - A note is identified by an opaque, immutable `NoteId`.
//! - Deletion removes the record; there are no tombstones.

pub mod collection;
pub mod note;
