//! In-memory store for testing.

use crate::backend::DurableStore;
use crate::config::StoreConfig;
use crate::error::StorageResult;
use crate::model::{Person, PendingEdit, PersonId, SyncMeta};
use crate::state::RosterState;
use parking_lot::RwLock;

/// An in-memory store.
///
/// This store keeps all collections in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral sessions that don't need persistence
///
/// # Example
///
/// ```rust
/// use roster_storage::{DurableStore, MemoryStore, Person, StoreConfig};
///
/// let store = MemoryStore::new(StoreConfig::new().seed_allowed([30477380u64]));
/// store.replace_all_people(vec![Person::new(30477380u64, "Ali")]).unwrap();
/// assert_eq!(store.people_count().unwrap(), 1);
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<RosterState>,
    seed: Vec<PersonId>,
}

impl MemoryStore {
    /// Creates a new empty store, seeding the allow-list.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        let mut state = RosterState::default();
        state.seed_allowed(&config.seed_allowed);
        Self {
            state: RwLock::new(state),
            seed: config.seed_allowed,
        }
    }

    /// Creates a store already holding `people`.
    #[must_use]
    pub fn with_people(config: StoreConfig, people: Vec<Person>) -> Self {
        let store = Self::new(config);
        store.state.write().replace_people(people);
        store
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl DurableStore for MemoryStore {
    fn get_all_people(&self) -> StorageResult<Vec<Person>> {
        Ok(self.state.read().people.values().cloned().collect())
    }

    fn get_person(&self, id: PersonId) -> StorageResult<Option<Person>> {
        Ok(self.state.read().people.get(&id).cloned())
    }

    fn put_person(&self, person: Person) -> StorageResult<()> {
        self.state.write().people.insert(person.id, person);
        Ok(())
    }

    fn replace_all_people(&self, people: Vec<Person>) -> StorageResult<()> {
        self.state.write().replace_people(people);
        Ok(())
    }

    fn people_count(&self) -> StorageResult<usize> {
        Ok(self.state.read().people.len())
    }

    fn put_pending_edit(&self, edit: PendingEdit) -> StorageResult<()> {
        self.state.write().put_pending_edit(edit);
        Ok(())
    }

    fn get_all_pending_edits(&self) -> StorageResult<Vec<PendingEdit>> {
        Ok(self.state.read().pending.values().cloned().collect())
    }

    fn clear_pending_edits(&self) -> StorageResult<()> {
        self.state.write().pending.clear();
        Ok(())
    }

    fn remove_pending_edits(&self, uploaded: &[PendingEdit]) -> StorageResult<usize> {
        Ok(self.state.write().remove_pending_edits(uploaded))
    }

    fn pending_edit_count(&self) -> StorageResult<usize> {
        Ok(self.state.read().pending.len())
    }

    fn get_sync_meta(&self) -> StorageResult<SyncMeta> {
        Ok(self.state.read().meta.clone())
    }

    fn put_sync_meta(&self, meta: SyncMeta) -> StorageResult<()> {
        self.state.write().meta = meta;
        Ok(())
    }

    fn get_logged_in(&self) -> StorageResult<Option<PersonId>> {
        Ok(self.state.read().auth.logged_in)
    }

    fn set_logged_in(&self, id: Option<PersonId>) -> StorageResult<()> {
        self.state.write().auth.logged_in = id;
        Ok(())
    }

    fn get_allowed(&self) -> StorageResult<Vec<PersonId>> {
        Ok(self.state.read().allowed_or(&self.seed))
    }

    fn set_allowed(&self, ids: Vec<PersonId>) -> StorageResult<()> {
        self.state.write().auth.allowed = Some(ids);
        Ok(())
    }
}
