use async_trait::async_trait;
use deploynotes_core::db::{open_db, open_db_in_memory};
use deploynotes_core::{
    drain_notices, FetchError, FormatError, LoadError, LoadSource, LocalCache, Note, NoteDraft,
    NoteFilter, NoteKind, NoteStore, Notice, NoticeLevel, Notifier, RemoteSnapshot,
    SqliteLocalCache, StoreConfig, StoreError, SyncDispatcher, SyncError, SyncMode,
    SyncTransport, DEFAULT_STORAGE_KEY, LAST_SYNC_KEY,
};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedReceiver;

struct FixedRemote {
    result: Result<Vec<Note>, FetchError>,
    calls: Mutex<usize>,
}

impl FixedRemote {
    fn serving(notes: Vec<Note>) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(notes),
            calls: Mutex::new(0),
        })
    }

    fn offline() -> Arc<Self> {
        Arc::new(Self {
            result: Err(FetchError::Transport("network disabled".to_string())),
            calls: Mutex::new(0),
        })
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl RemoteSnapshot for FixedRemote {
    async fn fetch(&self) -> Result<Vec<Note>, FetchError> {
        *self.calls.lock().unwrap() += 1;
        self.result.clone()
    }
}

#[derive(Default)]
struct RecordingTransport {
    pushes: Mutex<Vec<Vec<Note>>>,
    fail: bool,
}

impl RecordingTransport {
    fn failing() -> Self {
        Self {
            pushes: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn pushes(&self) -> Vec<Vec<Note>> {
        self.pushes.lock().unwrap().clone()
    }
}

#[async_trait]
impl SyncTransport for RecordingTransport {
    async fn push(&self, notes: &[Note]) -> Result<(), SyncError> {
        self.pushes.lock().unwrap().push(notes.to_vec());
        if self.fail {
            return Err(SyncError::Transport("proxy unreachable".to_string()));
        }
        Ok(())
    }
}

struct Harness {
    store: NoteStore<SqliteLocalCache>,
    transport: Arc<RecordingTransport>,
    notices: UnboundedReceiver<Notice>,
}

fn harness(
    cache: SqliteLocalCache,
    remote: Arc<FixedRemote>,
    transport: RecordingTransport,
) -> Harness {
    let (notifier, notices) = Notifier::channel();
    let transport = Arc::new(transport);
    let sync = SyncDispatcher::new(SyncMode::Ordered, transport.clone(), notifier.clone());
    let store = NoteStore::new(cache, remote, sync, notifier, &StoreConfig::default());
    Harness {
        store,
        transport,
        notices,
    }
}

fn memory_cache() -> SqliteLocalCache {
    SqliteLocalCache::new(open_db_in_memory().unwrap())
}

fn file_cache(path: &Path) -> SqliteLocalCache {
    SqliteLocalCache::new(open_db(path).unwrap())
}

fn note(id: &str, title: &str) -> Note {
    Note {
        id: id.to_string(),
        title: title.to_string(),
        content: "kubectl rollout status deploy/api".to_string(),
        category: "Kubernetes".to_string(),
        tags: vec!["k8s".to_string()],
        kind: NoteKind::Code,
        created_at: 1_700_000_000_000,
    }
}

fn draft(title: &str) -> NoteDraft {
    NoteDraft {
        title: title.to_string(),
        content: "  git push --force-with-lease  ".to_string(),
        category: "   ".to_string(),
        tags: "git, push,,git".to_string(),
        kind: NoteKind::Code,
    }
}

fn levels(notices: &[Notice]) -> Vec<NoticeLevel> {
    notices.iter().map(|notice| notice.level).collect()
}

#[tokio::test]
async fn persisted_collection_loads_back_without_network() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.sqlite3");
    let collection = vec![note("a", "first"), note("b", "second")];

    {
        let h = harness(
            file_cache(&path),
            FixedRemote::offline(),
            RecordingTransport::default(),
        );
        h.store.persist_local(&collection);
    }

    let remote = FixedRemote::offline();
    let mut h = harness(file_cache(&path), remote.clone(), RecordingTransport::default());
    let source = h.store.load().await.unwrap();

    assert_eq!(source, LoadSource::Cache);
    assert_eq!(h.store.notes(), collection.as_slice());
    assert_eq!(remote.calls(), 0);
}

#[tokio::test]
async fn empty_collection_round_trips_through_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.sqlite3");

    {
        let mut h = harness(
            file_cache(&path),
            FixedRemote::offline(),
            RecordingTransport::default(),
        );
        h.store.replace(Vec::new());
    }

    let mut h = harness(
        file_cache(&path),
        FixedRemote::serving(vec![note("remote", "ignored")]),
        RecordingTransport::default(),
    );
    assert_eq!(h.store.load().await.unwrap(), LoadSource::Cache);
    assert!(h.store.notes().is_empty());
}

#[tokio::test]
async fn replace_keeps_exact_order_and_persists() {
    let mut h = harness(
        memory_cache(),
        FixedRemote::offline(),
        RecordingTransport::default(),
    );
    let collection = vec![note("3", "c"), note("1", "a"), note("2", "b")];

    h.store.replace(collection.clone());

    assert_eq!(h.store.notes(), collection.as_slice());
    let cached = h.store.cache().read(DEFAULT_STORAGE_KEY).unwrap().unwrap();
    assert_eq!(
        deploynotes_core::decode_collection(&cached).unwrap(),
        collection
    );
    assert!(h.transport.pushes().is_empty());
}

#[tokio::test]
async fn cache_takes_priority_at_startup_and_refresh_is_remote_wins() {
    let cache = memory_cache();
    cache
        .write(
            DEFAULT_STORAGE_KEY,
            &serde_json::to_string(&vec![note("1", "cached")]).unwrap(),
        )
        .unwrap();
    let remote = FixedRemote::serving(vec![note("2", "remote")]);
    let mut h = harness(cache, remote.clone(), RecordingTransport::default());

    assert_eq!(h.store.load().await.unwrap(), LoadSource::Cache);
    assert_eq!(h.store.notes()[0].id, "1");
    assert_eq!(remote.calls(), 0);
    assert!(h.store.last_sync().is_none());

    let count = h.store.refresh_from_remote().await.unwrap();
    assert_eq!(count, 1);
    assert_eq!(h.store.notes().len(), 1);
    assert_eq!(h.store.notes()[0].id, "2");

    let cached = h.store.cache().read(DEFAULT_STORAGE_KEY).unwrap().unwrap();
    assert!(cached.contains("\"id\":\"2\""));
    assert!(h.store.cache().read(LAST_SYNC_KEY).unwrap().is_some());
    assert!(h.store.last_sync().is_some());
    // Refresh is a pull; nothing is pushed back.
    assert!(h.transport.pushes().is_empty());
}

#[tokio::test]
async fn empty_cache_falls_back_to_remote_and_populates_cache() {
    let mut h = harness(
        memory_cache(),
        FixedRemote::serving(vec![note("r1", "remote")]),
        RecordingTransport::default(),
    );

    assert_eq!(h.store.load().await.unwrap(), LoadSource::Remote);
    assert_eq!(h.store.notes()[0].id, "r1");
    let cached = h.store.cache().read(DEFAULT_STORAGE_KEY).unwrap();
    assert!(cached.unwrap().contains("r1"));
}

#[tokio::test]
async fn load_without_cache_and_failing_remote_reports_load_error() {
    let mut h = harness(
        memory_cache(),
        FixedRemote::offline(),
        RecordingTransport::default(),
    );

    let err = h.store.load().await.unwrap_err();
    assert!(matches!(err, LoadError::Remote(FetchError::Transport(_))));
    assert!(h.store.notes().is_empty());
    assert_eq!(levels(&drain_notices(&mut h.notices)), vec![NoticeLevel::Error]);
}

#[tokio::test]
async fn load_rejects_non_array_remote_payload() {
    let remote = Arc::new(FixedRemote {
        result: Err(FetchError::Format(FormatError::NotAnArray("object"))),
        calls: Mutex::new(0),
    });
    let mut h = harness(memory_cache(), remote, RecordingTransport::default());

    let err = h.store.load().await.unwrap_err();
    assert_eq!(
        err,
        LoadError::Remote(FetchError::Format(FormatError::NotAnArray("object")))
    );
}

#[tokio::test]
async fn corrupt_cache_is_cleared_and_remote_is_used() {
    let cache = memory_cache();
    cache.write(DEFAULT_STORAGE_KEY, "{not json").unwrap();
    let remote = FixedRemote::offline();
    let mut h = harness(cache, remote.clone(), RecordingTransport::default());

    assert!(h.store.load().await.is_err());
    assert_eq!(remote.calls(), 1);
    assert_eq!(h.store.cache().read(DEFAULT_STORAGE_KEY).unwrap(), None);
}

#[tokio::test]
async fn non_array_cache_entry_is_treated_as_absent() {
    let cache = memory_cache();
    cache.write(DEFAULT_STORAGE_KEY, r#"{"tips": []}"#).unwrap();
    let mut h = harness(
        cache,
        FixedRemote::serving(vec![note("r", "remote")]),
        RecordingTransport::default(),
    );

    assert_eq!(h.store.load().await.unwrap(), LoadSource::Remote);
    assert_eq!(h.store.notes()[0].id, "r");
}

#[tokio::test]
async fn failed_refresh_leaves_state_untouched() {
    let mut h = harness(
        memory_cache(),
        FixedRemote::offline(),
        RecordingTransport::default(),
    );
    h.store.replace(vec![note("keep", "local")]);
    drain_notices(&mut h.notices);

    let err = h.store.refresh_from_remote().await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
    assert_eq!(h.store.notes()[0].id, "keep");
    assert!(h.store.last_sync().is_none());
    assert_eq!(
        levels(&drain_notices(&mut h.notices)),
        vec![NoticeLevel::Info, NoticeLevel::Error]
    );
}

#[tokio::test]
async fn deleting_the_only_note_syncs_one_empty_collection() {
    let mut h = harness(
        memory_cache(),
        FixedRemote::offline(),
        RecordingTransport::default(),
    );
    h.store.replace(vec![note("X", "only")]);

    assert!(h.store.delete("X"));
    h.store.flush().await;

    assert!(h.store.notes().is_empty());
    assert_eq!(h.transport.pushes(), vec![Vec::<Note>::new()]);
}

#[tokio::test]
async fn deleting_unknown_id_does_not_sync() {
    let mut h = harness(
        memory_cache(),
        FixedRemote::offline(),
        RecordingTransport::default(),
    );
    h.store.replace(vec![note("X", "only")]);

    assert!(!h.store.delete("missing"));
    h.store.flush().await;

    assert_eq!(h.store.notes().len(), 1);
    assert!(h.transport.pushes().is_empty());
}

#[tokio::test]
async fn add_normalizes_draft_and_prepends() {
    let mut h = harness(
        memory_cache(),
        FixedRemote::offline(),
        RecordingTransport::default(),
    );
    h.store.replace(vec![note("old", "older")]);

    let added = h.store.add(draft("  Force push  ")).unwrap();
    h.store.flush().await;

    assert_eq!(added.title, "Force push");
    assert_eq!(added.content, "git push --force-with-lease");
    assert_eq!(added.category, "General");
    assert_eq!(added.tags, vec!["git".to_string(), "push".to_string()]);
    assert!(!added.id.is_empty());
    assert!(added.created_at > 0);

    let ids: Vec<&str> = h.store.notes().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec![added.id.as_str(), "old"]);
    let pushes = h.transport.pushes();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].len(), 2);
}

#[tokio::test]
async fn add_rejects_blank_title_without_mutation() {
    let mut h = harness(
        memory_cache(),
        FixedRemote::offline(),
        RecordingTransport::default(),
    );

    let err = h.store.add(draft("   ")).unwrap_err();
    h.store.flush().await;

    assert!(matches!(err, StoreError::Validation(_)));
    assert!(h.store.notes().is_empty());
    assert!(h.transport.pushes().is_empty());
}

#[tokio::test]
async fn edit_replaces_full_record_but_keeps_created_at() {
    let mut h = harness(
        memory_cache(),
        FixedRemote::offline(),
        RecordingTransport::default(),
    );
    h.store.replace(vec![note("a", "first"), note("b", "second")]);

    let mut replacement = note("b", "renamed");
    replacement.kind = NoteKind::Checklist;
    replacement.tags = vec![];
    replacement.created_at = 42;
    let edited = h.store.edit(replacement).unwrap();
    h.store.flush().await;

    assert_eq!(edited.created_at, 1_700_000_000_000);
    assert_eq!(h.store.notes()[1].title, "renamed");
    assert_eq!(h.store.notes()[1].kind, NoteKind::Checklist);
    assert!(h.store.notes()[1].tags.is_empty());
    assert_eq!(h.store.notes()[0].title, "first");
    assert_eq!(h.transport.pushes().len(), 1);
}

#[tokio::test]
async fn edit_with_draft_keeps_identity() {
    let mut h = harness(
        memory_cache(),
        FixedRemote::offline(),
        RecordingTransport::default(),
    );
    h.store.replace(vec![note("a", "first")]);

    let edited = h.store.edit_with_draft("a", draft("Second take")).unwrap();
    assert_eq!(edited.id, "a");
    assert_eq!(edited.created_at, 1_700_000_000_000);
    assert_eq!(edited.title, "Second take");
}

#[tokio::test]
async fn edit_unknown_id_is_rejected_without_sync() {
    let mut h = harness(
        memory_cache(),
        FixedRemote::offline(),
        RecordingTransport::default(),
    );

    let err = h.store.edit(note("ghost", "nope")).unwrap_err();
    h.store.flush().await;

    assert_eq!(err, StoreError::NoteNotFound("ghost".to_string()));
    assert!(h.transport.pushes().is_empty());
}

#[tokio::test]
async fn failed_sync_does_not_roll_back_local_mutation() {
    let mut h = harness(
        memory_cache(),
        FixedRemote::offline(),
        RecordingTransport::failing(),
    );

    h.store.add(draft("Survives")).unwrap();
    h.store.flush().await;

    assert_eq!(h.store.notes().len(), 1);
    let cached = h.store.cache().read(DEFAULT_STORAGE_KEY).unwrap().unwrap();
    assert!(cached.contains("Survives"));
    assert_eq!(
        levels(&drain_notices(&mut h.notices)),
        vec![NoticeLevel::Success, NoticeLevel::Error]
    );
}

#[tokio::test]
async fn importing_non_array_leaves_collection_unchanged() {
    let mut h = harness(
        memory_cache(),
        FixedRemote::offline(),
        RecordingTransport::default(),
    );
    h.store.replace(vec![note("a", "first")]);
    drain_notices(&mut h.notices);

    let err = h.store.import_json(r#"{"tips": []}"#).unwrap_err();
    h.store.flush().await;

    assert_eq!(err, FormatError::NotAnArray("object"));
    assert_eq!(h.store.notes()[0].id, "a");
    assert!(h.transport.pushes().is_empty());
    assert_eq!(levels(&drain_notices(&mut h.notices)), vec![NoticeLevel::Error]);
}

#[tokio::test]
async fn export_then_import_is_idempotent() {
    let mut h = harness(
        memory_cache(),
        FixedRemote::offline(),
        RecordingTransport::default(),
    );
    let collection = vec![note("a", "first"), note("b", "second")];
    h.store.replace(collection.clone());

    let exported = h.store.export_json();
    let imported = h.store.import_json(&exported).unwrap();
    h.store.flush().await;

    assert_eq!(imported, 2);
    assert_eq!(h.store.notes(), collection.as_slice());
    assert_eq!(h.transport.pushes(), vec![collection]);
}

#[tokio::test]
async fn import_accepts_original_wire_shape() {
    let mut h = harness(
        memory_cache(),
        FixedRemote::offline(),
        RecordingTransport::default(),
    );
    let text = r#"[
      {
        "id": "1",
        "title": "Release",
        "content": "- [ ] tag\n- [x] build",
        "category": "Deploy",
        "tags": ["release"],
        "type": "checklist",
        "createdAt": 1730000000000
      }
    ]"#;

    assert_eq!(h.store.import_json(text).unwrap(), 1);
    let imported = &h.store.notes()[0];
    assert_eq!(imported.kind, NoteKind::Checklist);
    assert_eq!(imported.checklist_items().len(), 2);
    assert_eq!(
        h.store
            .filtered(&NoteFilter {
                tags: vec!["release".to_string()],
                ..NoteFilter::default()
            })
            .len(),
        1
    );
    assert_eq!(h.store.categories(), vec!["Deploy".to_string()]);
}

#[tokio::test]
async fn mutations_after_failed_load_never_reach_the_remote() {
    let mut h = harness(
        memory_cache(),
        FixedRemote::offline(),
        RecordingTransport::default(),
    );
    assert!(h.store.load().await.is_err());
    assert!(!h.store.is_loaded());

    assert_eq!(
        h.store.add(draft("Would clobber remote")).unwrap_err(),
        StoreError::NotLoaded
    );
    assert_eq!(
        h.store.edit(note("a", "renamed")).unwrap_err(),
        StoreError::NotLoaded
    );
    assert_eq!(
        h.store.edit_with_draft("a", draft("x")).unwrap_err(),
        StoreError::NotLoaded
    );
    assert!(!h.store.delete("a"));
    h.store.flush().await;

    assert!(h.transport.pushes().is_empty());
    assert!(h.store.notes().is_empty());
    assert_eq!(h.store.cache().read(DEFAULT_STORAGE_KEY).unwrap(), None);
    assert_eq!(
        levels(&drain_notices(&mut h.notices)),
        vec![NoticeLevel::Error; 5]
    );
}

#[tokio::test]
async fn successful_import_after_failed_load_allows_mutations_again() {
    let mut h = harness(
        memory_cache(),
        FixedRemote::offline(),
        RecordingTransport::default(),
    );
    assert!(h.store.load().await.is_err());

    let text = serde_json::to_string(&vec![note("a", "first")]).unwrap();
    h.store.import_json(&text).unwrap();
    assert!(h.store.is_loaded());
    h.store.add(draft("After import")).unwrap();
    h.store.flush().await;

    let pushes = h.transport.pushes();
    assert_eq!(pushes.len(), 2);
    assert_eq!(pushes[1].len(), 2);
}

#[tokio::test]
async fn edit_normalizes_replacement_record() {
    let mut h = harness(
        memory_cache(),
        FixedRemote::offline(),
        RecordingTransport::default(),
    );
    h.store.replace(vec![note("a", "first")]);

    let mut replacement = note("a", "  trimmed  ");
    replacement.category = "  ".to_string();
    replacement.tags = vec![" git ".to_string(), "git".to_string(), String::new()];
    let edited = h.store.edit(replacement).unwrap();

    assert_eq!(edited.title, "trimmed");
    assert_eq!(edited.category, "General");
    assert_eq!(edited.tags, vec!["git".to_string()]);
    assert_eq!(h.store.notes()[0], edited);
}

#[tokio::test]
async fn edit_with_blank_title_is_rejected_without_sync() {
    let mut h = harness(
        memory_cache(),
        FixedRemote::offline(),
        RecordingTransport::default(),
    );
    h.store.replace(vec![note("a", "first")]);

    let err = h.store.edit(note("a", "   ")).unwrap_err();
    h.store.flush().await;

    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(h.store.notes()[0].title, "first");
    assert!(h.transport.pushes().is_empty());
}
