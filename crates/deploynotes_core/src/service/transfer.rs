//! File export helpers.
//!
//! Import parsing shares [`crate::model::collection::decode_collection`]
//! with the cache and remote paths; only export needs file handling.

use crate::model::collection::encode_collection_pretty;
use crate::model::note::Note;
use chrono::NaiveDate;
use std::io;
use std::path::{Path, PathBuf};

/// Export file name for `date`, e.g. `deploy-notes-2026-10-19.json`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("deploy-notes-{}.json", date.format("%Y-%m-%d"))
}

/// Writes the pretty-printed collection into `dir` and returns the path.
pub fn write_export(dir: &Path, notes: &[Note], date: NaiveDate) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(date));
    std::fs::write(&path, encode_collection_pretty(notes))?;
    Ok(path)
}
