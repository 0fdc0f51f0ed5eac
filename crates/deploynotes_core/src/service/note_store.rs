//! Local-first note store.
//!
//! # Responsibility
//! - Own the in-memory note collection for one process.
//! - Mirror every mutation to the local cache synchronously.
//! - Submit every mutation to the remote store through the sync dispatcher.
//!
//! # Invariants
//! - Startup order is cache first, remote only when the cache is empty or
//!   unreadable.
//! - Local cache writes never fail observably; failures are logged.
//! - Remote failures never roll back in-memory or cached state.
//! - Refresh is remote-wins: no merge with local edits.
//! - Refresh and in-flight pushes are not mutually exclusive.
//! - After a failed load, add/edit/delete are refused until a refresh or
//!   import succeeds, so an empty collection never overwrites the remote.

use crate::config::StoreConfig;
use crate::model::collection::{
    decode_collection, encode_collection, encode_collection_pretty, FormatError,
};
use crate::model::note::{Note, NoteDraft, NoteValidationError};
use crate::notice::Notifier;
use crate::remote::{FetchError, HttpSnapshotSource, RemoteSnapshot};
use crate::repo::cache_repo::LocalCache;
use crate::search::filter::{self, NoteFilter};
use crate::sync::{ProxySyncClient, SyncDispatcher};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Startup failed with no usable cache and no usable remote snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    Remote(FetchError),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(err) => write!(f, "failed to load notes: {err}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Remote(err) => Some(err),
        }
    }
}

/// Mutation failures on the in-memory collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Validation(NoteValidationError),
    NoteNotFound(String),
    /// The last load failed; the collection does not reflect the remote.
    NotLoaded,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::NotLoaded => write!(f, "notes are not loaded; refresh or import first"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NoteNotFound(_) | Self::NotLoaded => None,
        }
    }
}

impl From<NoteValidationError> for StoreError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Where `load` took the initial collection from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Cache,
    Remote,
}

/// Store facade over a local cache, a remote snapshot and a sync path.
pub struct NoteStore<C: LocalCache> {
    cache: C,
    remote: Arc<dyn RemoteSnapshot>,
    sync: SyncDispatcher,
    notifier: Notifier,
    storage_key: String,
    last_sync_key: String,
    notes: Vec<Note>,
    load_failed: bool,
}

impl<C: LocalCache> NoteStore<C> {
    /// Creates an empty store; call [`NoteStore::load`] before use.
    pub fn new(
        cache: C,
        remote: Arc<dyn RemoteSnapshot>,
        sync: SyncDispatcher,
        notifier: Notifier,
        config: &StoreConfig,
    ) -> Self {
        Self {
            cache,
            remote,
            sync,
            notifier,
            storage_key: config.storage_key.clone(),
            last_sync_key: config.last_sync_key.clone(),
            notes: Vec::new(),
            load_failed: false,
        }
    }

    /// Creates a store wired to the HTTP snapshot source and proxy client
    /// named by `config`.
    pub fn from_config(cache: C, config: &StoreConfig, notifier: Notifier) -> Self {
        let remote = Arc::new(HttpSnapshotSource::new(config.remote_url.clone()));
        let transport = Arc::new(ProxySyncClient::new(config.sync_url.clone()));
        let sync = SyncDispatcher::new(config.sync_mode, transport, notifier.clone());
        Self::new(cache, remote, sync, notifier, config)
    }

    /// Initializes the collection: cached copy if present, else remote.
    ///
    /// # Errors
    /// - `LoadError::Remote` when no cache entry exists and the remote
    ///   fetch fails or returns a non-array payload. The collection stays
    ///   empty, an error notice is emitted and mutations are refused until
    ///   a refresh or import succeeds.
    pub async fn load(&mut self) -> Result<LoadSource, LoadError> {
        self.load_failed = false;
        if let Some(notes) = self.read_cached_collection() {
            info!(
                "event=store_load module=store status=ok source=cache notes={}",
                notes.len()
            );
            self.notes = notes;
            return Ok(LoadSource::Cache);
        }

        match self.remote.fetch().await {
            Ok(notes) => {
                info!(
                    "event=store_load module=store status=ok source=remote notes={}",
                    notes.len()
                );
                self.notes = notes;
                self.persist_local(&self.notes);
                Ok(LoadSource::Remote)
            }
            Err(err) => {
                error!("event=store_load module=store status=error source=remote error={err}");
                self.notifier.error(format!("Could not load notes: {err}"));
                self.load_failed = true;
                Err(LoadError::Remote(err))
            }
        }
    }

    /// Current in-memory collection, newest first by convention.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Whether the collection came from a successful load, refresh or
    /// import.
    pub fn is_loaded(&self) -> bool {
        !self.load_failed
    }

    /// Looks up one note by id.
    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// Replaces the whole in-memory collection and persists it locally.
    pub fn replace(&mut self, notes: Vec<Note>) {
        self.notes = notes;
        self.load_failed = false;
        self.persist_local(&self.notes);
    }

    /// Writes the full collection to the cache slot. Never fails; errors
    /// are logged and dropped.
    pub fn persist_local(&self, notes: &[Note]) {
        let encoded = encode_collection(notes);
        if let Err(err) = self.cache.write(&self.storage_key, &encoded) {
            warn!(
                "event=cache_write module=store status=error notes={} error={}",
                notes.len(),
                err
            );
        }
    }

    /// Submits a push of `notes` to the remote store without waiting.
    pub fn sync_remote(&mut self, notes: Vec<Note>) {
        self.sync.submit(notes);
    }

    /// Re-fetches the remote snapshot and overwrites local state with it.
    ///
    /// On failure the collection and cache are left untouched.
    pub async fn refresh_from_remote(&mut self) -> Result<usize, FetchError> {
        self.notifier.info("Refreshing from remote...");
        match self.remote.fetch().await {
            Ok(notes) => {
                let count = notes.len();
                self.replace(notes);
                self.record_last_sync(Utc::now());
                info!("event=store_refresh module=store status=ok notes={count}");
                self.notifier
                    .success(format!("Loaded {count} notes from remote"));
                Ok(count)
            }
            Err(err) => {
                warn!("event=store_refresh module=store status=error error={err}");
                self.notifier
                    .error(format!("Could not refresh from remote: {err}"));
                Err(err)
            }
        }
    }

    /// Creates a note from `draft` and prepends it.
    pub fn add(&mut self, draft: NoteDraft) -> Result<Note, StoreError> {
        self.ensure_loaded("Note not added")?;
        let note = match Note::from_draft(draft, Utc::now().timestamp_millis()) {
            Ok(note) => note,
            Err(err) => {
                self.notifier.error(format!("Note not added: {err}"));
                return Err(err.into());
            }
        };

        let mut next = Vec::with_capacity(self.notes.len() + 1);
        next.push(note.clone());
        next.extend(self.notes.iter().cloned());
        self.commit(next);
        info!("event=note_add module=store status=ok id={}", note.id);
        self.notifier.success("Note added");
        Ok(note)
    }

    /// Replaces the record with the same id as `note`.
    ///
    /// The replacement is normalized like a new draft; `created_at` is kept
    /// from the existing record.
    pub fn edit(&mut self, note: Note) -> Result<Note, StoreError> {
        self.ensure_loaded("Note not updated")?;
        let mut note = match note.normalized() {
            Ok(note) => note,
            Err(err) => {
                self.notifier.error(format!("Note not updated: {err}"));
                return Err(err.into());
            }
        };
        let Some(position) = self.notes.iter().position(|n| n.id == note.id) else {
            self.notifier
                .error(format!("Note not updated: unknown id {}", note.id));
            return Err(StoreError::NoteNotFound(note.id));
        };

        note.created_at = self.notes[position].created_at;
        let mut next = self.notes.clone();
        next[position] = note.clone();
        self.commit(next);
        info!("event=note_edit module=store status=ok id={}", note.id);
        self.notifier.success("Note updated");
        Ok(note)
    }

    /// Rebuilds the note `id` from `draft`, keeping its identity.
    pub fn edit_with_draft(&mut self, id: &str, draft: NoteDraft) -> Result<Note, StoreError> {
        self.ensure_loaded("Note not updated")?;
        let existing = self
            .get(id)
            .ok_or_else(|| StoreError::NoteNotFound(id.to_string()))?;
        match Note::from_draft_with_id(existing.id.clone(), draft, existing.created_at) {
            Ok(replacement) => self.edit(replacement),
            Err(err) => {
                self.notifier.error(format!("Note not updated: {err}"));
                Err(err.into())
            }
        }
    }

    /// Removes the note `id`. Returns `false`, without syncing, when no such
    /// note exists or the last load failed.
    pub fn delete(&mut self, id: &str) -> bool {
        if self.ensure_loaded("Note not deleted").is_err() {
            return false;
        }
        if !self.notes.iter().any(|note| note.id == id) {
            self.notifier.error(format!("Note not deleted: unknown id {id}"));
            return false;
        }

        let next: Vec<Note> = self
            .notes
            .iter()
            .filter(|note| note.id != id)
            .cloned()
            .collect();
        self.commit(next);
        info!("event=note_delete module=store status=ok id={id}");
        self.notifier.success("Note deleted");
        true
    }

    /// Replaces the collection with an imported JSON array (no merge).
    ///
    /// # Errors
    /// - `FormatError` when `text` is not a JSON array of notes; state is
    ///   left unchanged.
    pub fn import_json(&mut self, text: &str) -> Result<usize, FormatError> {
        match decode_collection(text) {
            Ok(notes) => {
                let count = notes.len();
                self.commit(notes);
                info!("event=store_import module=store status=ok notes={count}");
                self.notifier.success(format!("Imported {count} notes"));
                Ok(count)
            }
            Err(err) => {
                warn!("event=store_import module=store status=error error={err}");
                self.notifier.error(format!("Could not import file: {err}"));
                Err(err)
            }
        }
    }

    /// Pretty-printed JSON of the current collection.
    pub fn export_json(&self) -> String {
        encode_collection_pretty(&self.notes)
    }

    /// Notes passing `filter`, in collection order.
    pub fn filtered(&self, filter: &NoteFilter) -> Vec<&Note> {
        filter.apply(&self.notes)
    }

    pub fn categories(&self) -> Vec<String> {
        filter::categories(&self.notes)
    }

    pub fn tags(&self) -> Vec<String> {
        filter::tags(&self.notes)
    }

    /// Time of the last successful refresh, if recorded.
    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        let raw = self.cache.read(&self.last_sync_key).ok().flatten()?;
        DateTime::parse_from_rfc3339(raw.trim())
            .ok()
            .map(|value| value.with_timezone(&Utc))
    }

    /// Number of pushes submitted but not yet completed.
    pub fn pending_syncs(&self) -> usize {
        self.sync.pending()
    }

    /// Waits for every submitted push to complete.
    pub async fn flush(&mut self) {
        self.sync.flush().await;
    }

    /// Returns the cache handle, mainly for tests.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    fn ensure_loaded(&self, action: &str) -> Result<(), StoreError> {
        if !self.load_failed {
            return Ok(());
        }
        warn!("event=store_mutation module=store status=rejected reason=not_loaded");
        self.notifier
            .error(format!("{action}: {}", StoreError::NotLoaded));
        Err(StoreError::NotLoaded)
    }

    fn commit(&mut self, next: Vec<Note>) {
        self.replace(next);
        self.sync_remote(self.notes.clone());
    }

    fn record_last_sync(&self, at: DateTime<Utc>) {
        if let Err(err) = self.cache.write(&self.last_sync_key, &at.to_rfc3339()) {
            warn!("event=cache_write module=store status=error key=last_sync error={err}");
        }
    }

    /// Reads the cached collection; corrupt entries are cleared and
    /// reported as absent.
    fn read_cached_collection(&self) -> Option<Vec<Note>> {
        let raw = match self.cache.read(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!("event=cache_read module=store status=error error={err}");
                return None;
            }
        };

        match decode_collection(&raw) {
            Ok(notes) => Some(notes),
            Err(err) => {
                warn!("event=cache_read module=store status=error action=clear error={err}");
                if let Err(err) = self.cache.remove(&self.storage_key) {
                    warn!("event=cache_clear module=store status=error error={err}");
                }
                None
            }
        }
    }
}
