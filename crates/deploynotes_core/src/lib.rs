//! Core client logic for deploy notes.
//! This crate owns the note model and the local-first sync policy.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notice;
pub mod remote;
pub mod repo;
pub mod search;
pub mod service;
pub mod sync;

pub use config::{ConfigError, StoreConfig, DEFAULT_STORAGE_KEY, LAST_SYNC_KEY};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::collection::{decode_collection, encode_collection_pretty, FormatError};
pub use model::note::{
    normalize_tags, parse_tag_list, ChecklistItem, Note, NoteDraft, NoteId, NoteKind,
    NoteValidationError, DEFAULT_CATEGORY,
};
pub use notice::{drain_notices, Notice, NoticeLevel, Notifier};
pub use remote::{FetchError, HttpSnapshotSource, RemoteSnapshot};
pub use repo::cache_repo::{CacheError, CacheResult, LocalCache, SqliteLocalCache};
pub use search::filter::NoteFilter;
pub use service::note_store::{LoadError, LoadSource, NoteStore, StoreError};
pub use sync::{ProxySyncClient, SyncDispatcher, SyncError, SyncMode, SyncTransport};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
