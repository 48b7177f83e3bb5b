//! File-based store for persistent storage.

use crate::backend::DurableStore;
use crate::config::{StoreConfig, LOCK_FILE_NAME, STORE_FILE_NAME};
use crate::error::{StorageError, StorageResult};
use crate::model::{Person, PendingEdit, PersonId, SyncMeta};
use crate::state::{RosterState, StoreDocument};
use fs2::FileExt;
use parking_lot::RwLock;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A file-based store.
///
/// All four collections live in one JSON document inside a data directory.
/// Data survives process restarts.
///
/// # Durability
///
/// Every write serializes the next state to a temporary file, syncs it and
/// renames it over the document. The in-memory copy is only swapped after
/// the rename succeeds, so a failed write changes nothing.
///
/// # Locking
///
/// The data directory is guarded by an exclusive lock on `roster.lock` for
/// the lifetime of the store. A second open fails with
/// [`StorageError::Locked`].
///
/// # Example
///
/// ```no_run
/// use roster_storage::{DurableStore, FileStore, StoreConfig};
/// use std::path::Path;
///
/// let store = FileStore::open(Path::new("roster-data"), StoreConfig::default()).unwrap();
/// println!("{} people", store.people_count().unwrap());
/// ```
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    state: RwLock<RosterState>,
    seed: Vec<PersonId>,
    sync_on_write: bool,
    _lock: File,
}

impl FileStore {
    /// Opens or creates a store in `dir`.
    ///
    /// Seeds the allow-list if the document has never stored one.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is locked, the document cannot be
    /// read, or it was written by an unsupported format version.
    pub fn open(dir: &Path, config: StoreConfig) -> StorageResult<Self> {
        if config.create_if_missing {
            fs::create_dir_all(dir)?;
        }

        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE_NAME))?;
        lock.try_lock_exclusive().map_err(|_| StorageError::Locked)?;

        let path = dir.join(STORE_FILE_NAME);
        let existed = path.exists();
        let mut state = if existed {
            load(&path)?
        } else {
            RosterState::default()
        };
        let seeded = state.seed_allowed(&config.seed_allowed);

        let store = Self {
            dir: dir.to_path_buf(),
            state: RwLock::new(RosterState::default()),
            seed: config.seed_allowed,
            sync_on_write: config.sync_on_write,
            _lock: lock,
        };

        if seeded || !existed {
            store.persist(&state)?;
        }

        info!(
            path = %path.display(),
            people = state.people.len(),
            pending = state.pending.len(),
            "opened roster store"
        );
        *store.state.write() = state;
        Ok(store)
    }

    /// Returns the data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path to the store document.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(STORE_FILE_NAME)
    }

    fn persist(&self, state: &RosterState) -> StorageResult<()> {
        let path = self.path();
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec(&StoreDocument::from_state(state))?;

        {
            let mut file = File::create(&tmp)?;
            file.write_all(&bytes)?;
            if self.sync_on_write {
                file.sync_all()?;
            }
        }
        fs::rename(&tmp, &path)?;

        debug!(bytes = bytes.len(), "persisted roster store");
        Ok(())
    }

    fn update<F, R>(&self, f: F) -> StorageResult<R>
    where
        F: FnOnce(&mut RosterState) -> R,
    {
        let mut state = self.state.write();
        let mut next = state.clone();
        let out = f(&mut next);
        self.persist(&next)?;
        *state = next;
        Ok(out)
    }
}

fn load(path: &Path) -> StorageResult<RosterState> {
    let bytes = fs::read(path)?;
    let doc: StoreDocument =
        serde_json::from_slice(&bytes).map_err(|e| StorageError::corrupted(e.to_string()))?;
    doc.into_state()
}

impl DurableStore for FileStore {
    fn get_all_people(&self) -> StorageResult<Vec<Person>> {
        Ok(self.state.read().people.values().cloned().collect())
    }

    fn get_person(&self, id: PersonId) -> StorageResult<Option<Person>> {
        Ok(self.state.read().people.get(&id).cloned())
    }

    fn put_person(&self, person: Person) -> StorageResult<()> {
        self.update(|state| {
            state.people.insert(person.id, person);
        })
    }

    fn replace_all_people(&self, people: Vec<Person>) -> StorageResult<()> {
        self.update(|state| state.replace_people(people))
    }

    fn people_count(&self) -> StorageResult<usize> {
        Ok(self.state.read().people.len())
    }

    fn put_pending_edit(&self, edit: PendingEdit) -> StorageResult<()> {
        self.update(|state| state.put_pending_edit(edit))
    }

    fn get_all_pending_edits(&self) -> StorageResult<Vec<PendingEdit>> {
        Ok(self.state.read().pending.values().cloned().collect())
    }

    fn clear_pending_edits(&self) -> StorageResult<()> {
        self.update(|state| state.pending.clear())
    }

    fn remove_pending_edits(&self, uploaded: &[PendingEdit]) -> StorageResult<usize> {
        self.update(|state| state.remove_pending_edits(uploaded))
    }

    fn pending_edit_count(&self) -> StorageResult<usize> {
        Ok(self.state.read().pending.len())
    }

    fn get_sync_meta(&self) -> StorageResult<SyncMeta> {
        Ok(self.state.read().meta.clone())
    }

    fn put_sync_meta(&self, meta: SyncMeta) -> StorageResult<()> {
        self.update(|state| state.meta = meta)
    }

    fn get_logged_in(&self) -> StorageResult<Option<PersonId>> {
        Ok(self.state.read().auth.logged_in)
    }

    fn set_logged_in(&self, id: Option<PersonId>) -> StorageResult<()> {
        self.update(|state| state.auth.logged_in = id)
    }

    fn get_allowed(&self) -> StorageResult<Vec<PersonId>> {
        Ok(self.state.read().allowed_or(&self.seed))
    }

    fn set_allowed(&self, ids: Vec<PersonId>) -> StorageResult<()> {
        self.update(|state| state.auth.allowed = Some(ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EditableFields, SyncStatus};
    use chrono::Utc;
    use tempfile::tempdir;

    fn config() -> StoreConfig {
        StoreConfig::new().seed_allowed([30477380u64])
    }

    #[test]
    fn file_create_new_seeds_allow_list() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path(), config()).unwrap();

        assert!(store.path().exists());
        assert_eq!(store.get_allowed().unwrap(), vec![PersonId(30477380)]);
        assert_eq!(store.people_count().unwrap(), 0);
    }

    #[test]
    fn file_persistence() {
        let dir = tempdir().unwrap();

        {
            let store = FileStore::open(dir.path(), config()).unwrap();
            store
                .replace_all_people(vec![
                    Person::new(30477380u64, "Ali").with_seating("1", "C", "4"),
                    Person::new(30453355u64, "Zahra"),
                ])
                .unwrap();
            store
                .put_pending_edit(PendingEdit::new(
                    30453355u64,
                    EditableFields {
                        credential_level: "Hafiz".into(),
                        training: String::new(),
                        contact: "12345".into(),
                    },
                    Utc::now(),
                ))
                .unwrap();
            store
                .put_sync_meta(SyncMeta {
                    last_sync: Some(Utc::now()),
                    status: SyncStatus::Success,
                })
                .unwrap();
            store.set_logged_in(Some(PersonId(30477380))).unwrap();
        }

        let store = FileStore::open(dir.path(), config()).unwrap();
        assert_eq!(store.people_count().unwrap(), 2);
        assert_eq!(store.pending_edit_count().unwrap(), 1);
        assert_eq!(store.get_sync_meta().unwrap().status, SyncStatus::Success);
        assert_eq!(store.get_logged_in().unwrap(), Some(PersonId(30477380)));

        let person = store.get_person(PersonId(30453355)).unwrap().unwrap();
        assert_eq!(person.fields.contact, "12345");
        assert!(person.updated);
    }

    #[test]
    fn stored_allow_list_is_not_reseeded() {
        let dir = tempdir().unwrap();

        {
            let store = FileStore::open(dir.path(), config()).unwrap();
            store.set_allowed(vec![PersonId(1), PersonId(2)]).unwrap();
        }

        let store = FileStore::open(dir.path(), config()).unwrap();
        assert_eq!(store.get_allowed().unwrap(), vec![PersonId(1), PersonId(2)]);
    }

    #[test]
    fn removing_uploaded_edits_persists_the_rest() {
        let dir = tempdir().unwrap();
        let fields = |contact: &str| EditableFields {
            credential_level: "Hafiz".into(),
            training: String::new(),
            contact: contact.into(),
        };
        let uploaded = PendingEdit::new(1u64, fields("111"), Utc::now());

        {
            let store = FileStore::open(dir.path(), config()).unwrap();
            store.put_pending_edit(uploaded.clone()).unwrap();
            store
                .put_pending_edit(PendingEdit::new(2u64, fields("222"), Utc::now()))
                .unwrap();
            assert_eq!(store.remove_pending_edits(&[uploaded]).unwrap(), 1);
        }

        let store = FileStore::open(dir.path(), config()).unwrap();
        let pending = store.get_all_pending_edits().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, PersonId(2));
    }

    #[test]
    fn second_open_is_locked() {
        let dir = tempdir().unwrap();
        let _store = FileStore::open(dir.path(), config()).unwrap();

        let result = FileStore::open(dir.path(), config());
        assert!(matches!(result, Err(StorageError::Locked)));
    }

    #[test]
    fn corrupted_document_fails_open() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(STORE_FILE_NAME), b"{not json").unwrap();

        let result = FileStore::open(dir.path(), config());
        assert!(matches!(result, Err(StorageError::Corrupted(_))));
    }

    #[test]
    fn create_nested_dirs() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested").join("data");

        let store = FileStore::open(&nested, config()).unwrap();
        assert_eq!(store.dir(), nested);
        assert!(nested.join(STORE_FILE_NAME).exists());
    }

    #[test]
    fn missing_dir_without_create_fails() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent");

        let result = FileStore::open(&missing, config().create_if_missing(false));
        assert!(matches!(result, Err(StorageError::Io(_))));
    }
}
