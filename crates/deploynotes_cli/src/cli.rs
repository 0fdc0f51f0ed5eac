use clap::{Args, Parser, Subcommand, ValueEnum};
use deploynotes_core::NoteKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deploynotes")]
#[command(about = "Quick notes for commands, checklists and deploy snippets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Local cache database file
    #[arg(long, env = "DEPLOYNOTES_DB", default_value = "deploynotes.sqlite3")]
    pub db: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DEPLOYNOTES_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Absolute directory for rolling log files; stderr when omitted
    #[arg(long, env = "DEPLOYNOTES_LOG_DIR")]
    pub log_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List notes, optionally filtered
    List {
        /// Case-insensitive text search over title, content, category and tags
        #[arg(short, long, default_value = "")]
        query: String,

        /// Keep notes in any of these categories (repeatable)
        #[arg(short, long)]
        category: Vec<String>,

        /// Keep notes carrying all of these tags (repeatable)
        #[arg(short, long)]
        tag: Vec<String>,

        /// Keep notes of this type
        #[arg(long = "type", value_enum)]
        kind: Option<KindArg>,
    },

    /// Show one note in full
    Show { id: String },

    /// Add a new note
    Add(NoteFields),

    /// Replace fields of an existing note
    Edit {
        id: String,

        #[command(flatten)]
        fields: EditFields,
    },

    /// Delete a note by id
    Delete { id: String },

    /// Replace local notes with the remote snapshot
    Refresh,

    /// Replace local notes with a JSON export file
    Import { file: PathBuf },

    /// Write all notes to deploy-notes-<date>.json
    Export {
        /// Target directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// List distinct categories
    Categories,

    /// List distinct tags
    Tags,

    /// Show note count, last refresh and configuration
    Status,
}

impl Command {
    /// Commands that change the collection and push it to the remote.
    pub fn mutates_notes(&self) -> bool {
        matches!(self, Self::Add(_) | Self::Edit { .. } | Self::Delete { .. })
    }
}

#[derive(Args)]
pub struct NoteFields {
    #[arg(long)]
    pub title: String,

    /// Note body; checklist items go one per line
    #[arg(long)]
    pub content: String,

    /// Defaults to "General" when blank
    #[arg(long, default_value = "")]
    pub category: String,

    /// Comma-separated tags
    #[arg(long, default_value = "")]
    pub tags: String,

    #[arg(long = "type", value_enum, default_value = "note")]
    pub kind: KindArg,
}

#[derive(Args)]
pub struct EditFields {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub content: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    /// Comma-separated tags; replaces the whole tag set
    #[arg(long)]
    pub tags: Option<String>,

    #[arg(long = "type", value_enum)]
    pub kind: Option<KindArg>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Note,
    Code,
    Checklist,
}

impl From<KindArg> for NoteKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Note => NoteKind::Note,
            KindArg::Code => NoteKind::Code,
            KindArg::Checklist => NoteKind::Checklist,
        }
    }
}
