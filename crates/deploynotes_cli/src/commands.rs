//! Subcommand execution against a loaded note store.

use crate::cli::{Command, EditFields, NoteFields};
use crate::render;
use anyhow::Context;
use chrono::Local;
use deploynotes_core::service::transfer::write_export;
use deploynotes_core::{LocalCache, Note, NoteDraft, NoteFilter, NoteStore, StoreConfig};

/// Runs one subcommand. Returns `false` when the command failed in a way
/// already reported through notices.
///
/// Add, edit and delete are refused when the store failed to load, since
/// their push would overwrite the remote with a partial collection.
pub async fn run<C: LocalCache>(
    store: &mut NoteStore<C>,
    config: &StoreConfig,
    command: Command,
) -> anyhow::Result<bool> {
    if command.mutates_notes() && !store.is_loaded() {
        eprintln!("notes are not loaded; run `deploynotes refresh` or `deploynotes import` first");
        return Ok(false);
    }

    match command {
        Command::List {
            query,
            category,
            tag,
            kind,
        } => {
            let filter = NoteFilter {
                query,
                categories: category,
                tags: tag,
                kind: kind.map(Into::into),
            };
            let notes = store.filtered(&filter);
            if notes.is_empty() {
                println!("No notes match these filters.");
            }
            for note in &notes {
                println!("{}", render::summary_line(note));
            }
            println!("{} of {} notes", notes.len(), store.notes().len());
            Ok(true)
        }
        Command::Show { id } => match store.get(&id) {
            Some(note) => {
                print!("{}", render::detail(note));
                Ok(true)
            }
            None => {
                eprintln!("note not found: {id}");
                Ok(false)
            }
        },
        Command::Add(fields) => Ok(match store.add(new_draft(fields)) {
            Ok(note) => {
                println!("{}", note.id);
                true
            }
            Err(_) => false,
        }),
        Command::Edit { id, fields } => {
            let Some(existing) = store.get(&id) else {
                eprintln!("note not found: {id}");
                return Ok(false);
            };
            let draft = merge_draft(existing, fields);
            Ok(store.edit_with_draft(&id, draft).is_ok())
        }
        Command::Delete { id } => Ok(store.delete(&id)),
        Command::Refresh => Ok(store.refresh_from_remote().await.is_ok()),
        Command::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            Ok(store.import_json(&text).is_ok())
        }
        Command::Export { dir } => {
            let path = write_export(&dir, store.notes(), Local::now().date_naive())
                .with_context(|| format!("failed to write export into {}", dir.display()))?;
            println!("{}", path.display());
            Ok(true)
        }
        Command::Categories => {
            for category in store.categories() {
                println!("{category}");
            }
            Ok(true)
        }
        Command::Tags => {
            for tag in store.tags() {
                println!("{tag}");
            }
            Ok(true)
        }
        Command::Status => {
            println!("notes: {}", store.notes().len());
            println!("last refresh: {}", render::format_last_sync(store.last_sync()));
            println!("storage key: {}", config.storage_key);
            println!(
                "remote: {}",
                config.remote_url.as_deref().unwrap_or("not configured")
            );
            println!(
                "sync proxy: {}",
                config.sync_url.as_deref().unwrap_or("not configured")
            );
            println!("sync mode: {}", config.sync_mode.as_str());
            println!("version: {}", deploynotes_core::core_version());
            Ok(true)
        }
    }
}

fn new_draft(fields: NoteFields) -> NoteDraft {
    NoteDraft {
        title: fields.title,
        content: fields.content,
        category: fields.category,
        tags: fields.tags,
        kind: fields.kind.into(),
    }
}

/// Builds a full replacement draft: given fields win, the rest is copied
/// from `existing`.
fn merge_draft(existing: &Note, fields: EditFields) -> NoteDraft {
    NoteDraft {
        title: fields.title.unwrap_or_else(|| existing.title.clone()),
        content: fields.content.unwrap_or_else(|| existing.content.clone()),
        category: fields.category.unwrap_or_else(|| existing.category.clone()),
        tags: fields.tags.unwrap_or_else(|| existing.tags.join(", ")),
        kind: fields.kind.map_or(existing.kind, Into::into),
    }
}
