//! The editing path.

use crate::clock::Clock;
use crate::edit;
use crate::error::CoreResult;
use crate::search::{SearchCache, SearchConfig};
use roster_storage::{DurableStore, EditableFields, PendingEdit, Person, PersonId};
use std::sync::Arc;
use tracing::debug;

/// Local roster: the durable store, its search cache and the clock.
///
/// Every write of person data made through this type invalidates the cache,
/// so searches never lag a local save by more than the next read.
pub struct Roster<S: DurableStore> {
    store: Arc<S>,
    cache: SearchCache<S>,
    clock: Arc<dyn Clock>,
}

impl<S: DurableStore> Roster<S> {
    /// Creates a roster over `store`.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, search: SearchConfig) -> Self {
        let cache = SearchCache::new(Arc::clone(&store), Arc::clone(&clock), search);
        Self {
            store,
            cache,
            clock,
        }
    }

    /// Returns the durable store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the search cache.
    pub fn cache(&self) -> &SearchCache<S> {
        &self.cache
    }

    /// Returns the clock.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Validates and queues an edit, applying it to the local snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft is invalid (nothing is written) or the
    /// store fails.
    pub fn save_edit(&self, id: PersonId, draft: EditableFields) -> CoreResult<PendingEdit> {
        let fields = edit::normalize(draft)?;
        let pending = PendingEdit::new(id, fields, self.clock.now());

        self.store.put_pending_edit(pending.clone())?;
        self.cache.invalidate();

        debug!(%id, "queued pending edit");
        Ok(pending)
    }

    /// Searches the cached snapshot.
    ///
    /// # Errors
    ///
    /// Propagates store failures from a cache refetch.
    pub fn search(&self, query: &str) -> CoreResult<Vec<Person>> {
        Ok(self.cache.search(query)?)
    }

    /// Reads one person straight from the store.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn person(&self, id: PersonId) -> CoreResult<Option<Person>> {
        Ok(self.store.get_person(id)?)
    }

    /// Number of edits waiting for upload.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn pending_change_count(&self) -> CoreResult<usize> {
        Ok(self.store.pending_edit_count()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::error::CoreError;
    use roster_storage::{MemoryStore, StoreConfig};

    fn roster() -> Roster<MemoryStore> {
        let store = Arc::new(MemoryStore::with_people(
            StoreConfig::default(),
            vec![Person::new(30477380u64, "Ali").with_seating("1", "C", "14")],
        ));
        Roster::new(store, Arc::new(SystemClock), SearchConfig::default())
    }

    #[test]
    fn save_edit_is_visible_to_search_immediately() {
        let roster = roster();
        let before = roster.search("ali").unwrap();
        assert!(!before[0].updated);

        roster
            .save_edit(
                PersonId(30477380),
                EditableFields {
                    credential_level: "Juz Amma".into(),
                    training: "No".into(),
                    contact: "12345".into(),
                },
            )
            .unwrap();

        let after = roster.search("ali").unwrap();
        assert!(after[0].updated);
        assert_eq!(after[0].fields.credential_level, "Juz Amma");
        assert_eq!(after[0].fields.training, "");
        assert_eq!(roster.pending_change_count().unwrap(), 1);
    }

    #[test]
    fn invalid_edit_writes_nothing() {
        let roster = roster();
        let result = roster.save_edit(PersonId(30477380), EditableFields::default());

        assert!(matches!(result, Err(CoreError::InvalidEdit { .. })));
        assert_eq!(roster.pending_change_count().unwrap(), 0);
        assert!(!roster.person(PersonId(30477380)).unwrap().unwrap().updated);
    }
}
