//! Durable thread storage over an embedded sled database
//!
//! The store is the sole durable source of truth for conversation threads
//! and the active-thread pointer. Reads are total: missing or unparseable
//! data degrades to an empty state rather than an error, and a legacy
//! single-thread format left behind by earlier versions is migrated on
//! first load.

use crate::error::{ArenaError, Result};
use crate::session::types::{derive_title, ConversationThread, StoreState};
use directories::ProjectDirs;
use sled::Db;
use std::path::{Path, PathBuf};
use ulid::Ulid;

/// Key holding the serialized thread set
const THREADS_KEY: &[u8] = b"threads";

/// Key holding the active thread id
const ACTIVE_KEY: &[u8] = b"active_thread";

/// Legacy key holding a flat message list from the single-thread era
///
/// Read once for migration, then deleted.
const LEGACY_KEY: &[u8] = b"chat_messages";

/// Persistent store for conversation threads
///
/// Wraps a sled database with the load/persist/reconcile operations the
/// controller needs. Every mutation is written through unconditionally and
/// flushed; there is no batching.
pub struct SessionStore {
    db: Db,
}

impl SessionStore {
    /// Open the store in the user's data directory
    ///
    /// The database location can be overridden with the
    /// `ARENACHAT_THREADS_DB` environment variable or the `storage.path`
    /// config entry, which is useful for tests and alternate profiles.
    ///
    /// # Errors
    ///
    /// Returns `ArenaError::Storage` if the database cannot be opened
    pub fn open(path_override: Option<&Path>) -> Result<Self> {
        if let Ok(env_path) = std::env::var("ARENACHAT_THREADS_DB") {
            return Self::open_at(PathBuf::from(env_path));
        }

        if let Some(path) = path_override {
            return Self::open_at(path.to_path_buf());
        }

        let proj_dirs = ProjectDirs::from("io", "arenachat", "arenachat")
            .ok_or_else(|| ArenaError::Storage("Could not determine data directory".into()))?;
        Self::open_at(proj_dirs.data_dir().join("threads"))
    }

    /// Open or create the store at a specific path
    ///
    /// # Errors
    ///
    /// Returns `ArenaError::Storage` if the database cannot be opened
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path.as_ref())
            .map_err(|e| ArenaError::Storage(format!("Failed to open database: {}", e)))?;
        Ok(Self { db })
    }

    /// Read the persisted state
    ///
    /// Total by design: absent keys, unparseable values, and storage errors
    /// all degrade to an empty state with a `warn` diagnostic. When only
    /// the legacy flat message list is present it is wrapped into a single
    /// thread, the migrated form is persisted, and the legacy key removed.
    pub fn load(&self) -> StoreState {
        match self.db.get(THREADS_KEY) {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<ConversationThread>>(&bytes) {
                Ok(threads) => {
                    let active_thread_id = self.read_active_id();
                    return StoreState {
                        threads,
                        active_thread_id,
                    };
                }
                Err(e) => {
                    tracing::warn!("Discarding unparseable thread set: {}", e);
                    self.purge_legacy();
                    return StoreState::default();
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Failed to read thread set: {}", e);
                return StoreState::default();
            }
        }

        // No modern state; try the legacy single-thread format.
        match self.load_legacy() {
            Some(state) => state,
            None => StoreState::default(),
        }
    }

    /// Write the full state through to disk
    ///
    /// Failures are logged and swallowed: the UI layer never sees a
    /// persistence error, and in-memory state stays authoritative for the
    /// rest of the session. The thread set is written before the active-id
    /// pointer so a failed write cannot leave the pointer naming threads
    /// that were never stored.
    pub fn persist(&self, state: &StoreState) {
        let payload = match serde_json::to_vec(&state.threads) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to serialize thread set: {}", e);
                return;
            }
        };

        if let Err(e) = self.db.insert(THREADS_KEY, payload) {
            tracing::warn!("Failed to persist thread set: {}", e);
            return;
        }

        let active_result = match &state.active_thread_id {
            Some(id) => self.db.insert(ACTIVE_KEY, id.as_bytes()).map(|_| ()),
            None => self.db.remove(ACTIVE_KEY).map(|_| ()),
        };
        if let Err(e) = active_result {
            tracing::warn!("Failed to persist active thread id: {}", e);
        }

        if let Err(e) = self.db.flush() {
            tracing::warn!("Failed to flush thread store: {}", e);
        }
    }

    /// Repair the active-thread pointer against the current thread set
    ///
    /// If the pointer names a thread that no longer exists, the first
    /// thread in list order becomes active; with no threads left the
    /// pointer is cleared. An unset pointer with threads present also
    /// selects the first. Returns the reconciled id and persists when the
    /// pointer changed.
    pub fn reconcile_active_id(&self, state: &mut StoreState) -> Option<String> {
        let valid = state
            .active_thread_id
            .as_deref()
            .map(|id| state.thread(id).is_some())
            .unwrap_or(false);

        if !valid {
            let next = state.threads.first().map(|t| t.id.clone());
            if state.active_thread_id != next {
                state.active_thread_id = next;
                self.persist(state);
            }
        }

        state.active_thread_id.clone()
    }

    /// Create a new thread and make it active
    ///
    /// The thread gets a time-derived ULID id, the default title, and an
    /// empty message list, and is inserted at the front of the list so
    /// display order stays most-recent-first. Returns the new id.
    pub fn create_thread(&self, state: &mut StoreState) -> String {
        let id = new_thread_id();
        state.threads.insert(0, ConversationThread::new(id.clone()));
        state.active_thread_id = Some(id.clone());
        self.persist(state);
        id
    }

    /// Read the active-id pointer, if any
    fn read_active_id(&self) -> Option<String> {
        match self.db.get(ACTIVE_KEY) {
            Ok(Some(bytes)) => String::from_utf8(bytes.to_vec()).ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read active thread id: {}", e);
                None
            }
        }
    }

    /// Migrate the legacy flat message list into a single thread
    ///
    /// Returns `None` when no legacy value exists or it does not parse; in
    /// both cases the legacy key is purged so the migration is never
    /// attempted twice.
    fn load_legacy(&self) -> Option<StoreState> {
        let bytes = match self.db.get(LEGACY_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read legacy messages: {}", e);
                return None;
            }
        };

        let messages: Vec<crate::session::ChatMessage> = match serde_json::from_slice(&bytes) {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!("Discarding unparseable legacy messages: {}", e);
                self.purge_legacy();
                return None;
            }
        };

        let id = new_thread_id();
        let mut thread = ConversationThread::new(id.clone());
        if let Some(first) = messages.first() {
            thread.title = derive_title(&first.content);
        }
        thread.messages = messages;

        let state = StoreState {
            threads: vec![thread],
            active_thread_id: Some(id),
        };

        self.persist(&state);
        self.purge_legacy();
        tracing::info!("Migrated legacy single-thread history");
        Some(state)
    }

    /// Remove the legacy key, ignoring failures
    fn purge_legacy(&self) {
        if let Err(e) = self.db.remove(LEGACY_KEY) {
            tracing::warn!("Failed to remove legacy key: {}", e);
        }
        let _ = self.db.flush();
    }
}

/// Generate a new thread id
///
/// ULIDs are time-derived and lexicographically sortable, so ids double as
/// creation-order evidence when debugging a store dump.
pub fn new_thread_id() -> String {
    Ulid::new().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::types::{ChatMessage, DEFAULT_TITLE};

    /// Helper: store backed by a temp directory; the dir must outlive the
    /// store so the caller keeps ownership.
    fn create_test_store() -> (SessionStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let store = SessionStore::open_at(dir.path().join("threads")).expect("open store");
        (store, dir)
    }

    #[test]
    fn test_load_empty_store_returns_default_state() {
        let (store, _dir) = create_test_store();
        let state = store.load();
        assert!(state.threads.is_empty());
        assert!(state.active_thread_id.is_none());
    }

    #[test]
    fn test_persist_and_load_roundtrip() {
        let (store, _dir) = create_test_store();
        let mut state = StoreState::default();
        let id = store.create_thread(&mut state);
        state.thread_mut(&id).unwrap().messages.push(ChatMessage::user("hi"));
        store.persist(&state);

        let loaded = store.load();
        assert_eq!(loaded.threads.len(), 1);
        assert_eq!(loaded.active_thread_id.as_deref(), Some(id.as_str()));
        assert_eq!(loaded.threads[0].messages.len(), 1);
    }

    #[test]
    fn test_create_thread_inserts_at_front_and_activates() {
        let (store, _dir) = create_test_store();
        let mut state = StoreState::default();
        let first = store.create_thread(&mut state);
        let second = store.create_thread(&mut state);

        assert_eq!(state.threads[0].id, second);
        assert_eq!(state.threads[1].id, first);
        assert_eq!(state.active_thread_id.as_deref(), Some(second.as_str()));
        assert_eq!(state.threads[0].title, DEFAULT_TITLE);
    }

    #[test]
    fn test_thread_ids_are_unique() {
        let (store, _dir) = create_test_store();
        let mut state = StoreState::default();
        let a = store.create_thread(&mut state);
        let b = store.create_thread(&mut state);
        assert_ne!(a, b);
    }

    #[test]
    fn test_reconcile_selects_first_when_active_missing() {
        let (store, _dir) = create_test_store();
        let mut state = StoreState::default();
        store.create_thread(&mut state);
        let kept = store.create_thread(&mut state);

        state.active_thread_id = Some("no-such-thread".to_string());
        let active = store.reconcile_active_id(&mut state);
        assert_eq!(active.as_deref(), Some(kept.as_str()));
    }

    #[test]
    fn test_reconcile_clears_active_when_no_threads_remain() {
        let (store, _dir) = create_test_store();
        let mut state = StoreState {
            threads: Vec::new(),
            active_thread_id: Some("gone".to_string()),
        };
        assert!(store.reconcile_active_id(&mut state).is_none());
        assert!(state.active_thread_id.is_none());
    }

    #[test]
    fn test_reconcile_selects_first_when_unset() {
        let (store, _dir) = create_test_store();
        let mut state = StoreState::default();
        let id = store.create_thread(&mut state);
        state.active_thread_id = None;

        let active = store.reconcile_active_id(&mut state);
        assert_eq!(active.as_deref(), Some(id.as_str()));
    }

    #[test]
    fn test_reconcile_after_deleting_active_thread() {
        let (store, _dir) = create_test_store();
        let mut state = StoreState::default();
        let survivor = store.create_thread(&mut state);
        let doomed = store.create_thread(&mut state);
        assert_eq!(state.active_thread_id.as_deref(), Some(doomed.as_str()));

        state.threads.retain(|t| t.id != doomed);
        let active = store.reconcile_active_id(&mut state);
        assert_eq!(active.as_deref(), Some(survivor.as_str()));
    }

    #[test]
    fn test_legacy_migration_wraps_messages_into_one_thread() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("threads");

        // Seed only the legacy key, as an old client would have left it.
        let legacy = vec![
            ChatMessage::user("Explain quantum tunneling in simple terms"),
            ChatMessage::assistant("It is a wave phenomenon.", Some(1)),
        ];
        {
            let db = sled::open(&path).expect("open seed db");
            db.insert(LEGACY_KEY, serde_json::to_vec(&legacy).unwrap())
                .expect("seed legacy key");
            db.flush().expect("flush seed");
        }

        let store = SessionStore::open_at(&path).expect("open store");
        let state = store.load();
        assert_eq!(state.threads.len(), 1);
        assert_eq!(state.threads[0].messages.len(), 2);
        assert_eq!(
            state.threads[0].title,
            "Explain quantum tunneling in simple terms"
        );
        assert_eq!(
            state.active_thread_id.as_deref(),
            Some(state.threads[0].id.as_str())
        );

        // The migrated form is persisted and the legacy key is gone: a
        // second load sees the same single thread without re-migrating.
        let again = store.load();
        assert_eq!(again.threads.len(), 1);
        assert_eq!(again.threads[0].id, state.threads[0].id);
    }

    #[test]
    fn test_unparseable_legacy_value_is_purged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("threads");
        {
            let db = sled::open(&path).expect("open seed db");
            db.insert(LEGACY_KEY, &b"not json"[..]).expect("seed");
            db.flush().expect("flush");
        }

        let store = SessionStore::open_at(&path).expect("open store");
        let state = store.load();
        assert!(state.threads.is_empty());
        drop(store);

        // The bad value must not survive for a repeated migration attempt.
        let db = sled::open(&path).expect("reopen");
        assert!(db.get(LEGACY_KEY).expect("get").is_none());
    }

    #[test]
    fn test_unparseable_thread_set_degrades_to_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("threads");
        {
            let db = sled::open(&path).expect("open seed db");
            db.insert(THREADS_KEY, &b"{{{{"[..]).expect("seed");
            db.flush().expect("flush");
        }

        let store = SessionStore::open_at(&path).expect("open store");
        let state = store.load();
        assert!(state.threads.is_empty());
        assert!(state.active_thread_id.is_none());
    }

    #[test]
    fn test_new_thread_id_is_ulid_shaped() {
        let id = new_thread_id();
        assert_eq!(id.len(), 26);
    }
}
