//! Plain-text rendering of notes for the terminal.

use chrono::{DateTime, Local, TimeZone};
use deploynotes_core::{Note, NoteKind};

/// One-line summary used by `list`.
pub fn summary_line(note: &Note) -> String {
    let mut line = format!(
        "{}  [{}] {}  ({})",
        note.id, note.kind, note.title, note.category
    );
    if !note.tags.is_empty() {
        let tags: Vec<String> = note.tags.iter().map(|tag| format!("#{tag}")).collect();
        line.push_str("  ");
        line.push_str(&tags.join(" "));
    }
    line
}

/// Full multi-line view used by `show`.
pub fn detail(note: &Note) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", note.title));
    out.push_str(&format!(
        "id: {}  type: {}  category: {}\n",
        note.id, note.kind, note.category
    ));
    if !note.tags.is_empty() {
        out.push_str(&format!("tags: {}\n", note.tags.join(", ")));
    }
    out.push_str(&format!("created: {}\n\n", format_millis(note.created_at)));

    match note.kind {
        NoteKind::Checklist => {
            for item in note.checklist_items() {
                let mark = if item.checked { "x" } else { " " };
                out.push_str(&format!("[{mark}] {}\n", item.text));
            }
        }
        NoteKind::Code | NoteKind::Note => {
            out.push_str(&note.content);
            out.push('\n');
        }
    }
    out
}

/// Local time for an epoch-millisecond timestamp.
pub fn format_millis(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
        None => millis.to_string(),
    }
}

pub fn format_last_sync(at: Option<DateTime<chrono::Utc>>) -> String {
    at.map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string())
}
