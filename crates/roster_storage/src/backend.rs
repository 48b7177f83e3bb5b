//! Durable store trait definition.

use crate::error::StorageResult;
use crate::model::{Person, PendingEdit, PersonId, SyncMeta};

/// The durable store for the roster.
///
/// A store holds four logical collections: the person snapshot, the queue of
/// pending edits keyed by identity, the sync metadata singleton and the auth
/// singleton. It is the only owner of their persisted form; every other
/// component reads and writes through this trait.
///
/// # Invariants
///
/// - `replace_all_people` is atomic: readers see either the old snapshot or
///   the new one, never a mix
/// - `put_pending_edit` upserts the edit and applies it onto the matching
///   person as one logical operation
/// - Iteration order of people and pending edits is ascending identity
/// - A failed write leaves the store as it was
///
/// # Implementors
///
/// - [`super::MemoryStore`] - For testing and ephemeral use
/// - [`super::FileStore`] - For persistent storage
pub trait DurableStore: Send + Sync {
    /// Returns every person in the snapshot.
    fn get_all_people(&self) -> StorageResult<Vec<Person>>;

    /// Returns one person, if present.
    fn get_person(&self, id: PersonId) -> StorageResult<Option<Person>>;

    /// Inserts or overwrites one person.
    fn put_person(&self, person: Person) -> StorageResult<()>;

    /// Clears the person collection and writes `people` as one unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the new snapshot cannot be persisted; the old
    /// snapshot stays visible in that case.
    fn replace_all_people(&self, people: Vec<Person>) -> StorageResult<()>;

    /// Returns the number of people in the snapshot.
    fn people_count(&self) -> StorageResult<usize>;

    /// Upserts a pending edit and applies it onto the matching person.
    ///
    /// If no person with the edit's identity exists, the edit is stored
    /// without visible effect.
    fn put_pending_edit(&self, edit: PendingEdit) -> StorageResult<()>;

    /// Returns the whole pending-edit queue.
    fn get_all_pending_edits(&self) -> StorageResult<Vec<PendingEdit>>;

    /// Removes every pending edit.
    fn clear_pending_edits(&self) -> StorageResult<()>;

    /// Removes the queued edits that still equal an entry of `uploaded`, as
    /// one write. Edits re-saved or added since are kept.
    ///
    /// Returns the number of edits removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write cannot be persisted; the queue is left
    /// untouched in that case.
    fn remove_pending_edits(&self, uploaded: &[PendingEdit]) -> StorageResult<usize>;

    /// Returns the number of pending edits.
    fn pending_edit_count(&self) -> StorageResult<usize>;

    /// Returns the sync metadata, or the default if none was stored.
    fn get_sync_meta(&self) -> StorageResult<SyncMeta>;

    /// Overwrites the sync metadata.
    fn put_sync_meta(&self, meta: SyncMeta) -> StorageResult<()>;

    /// Returns the logged-in identity.
    fn get_logged_in(&self) -> StorageResult<Option<PersonId>>;

    /// Sets or clears the logged-in identity.
    fn set_logged_in(&self, id: Option<PersonId>) -> StorageResult<()>;

    /// Returns the allow-list, falling back to the seed list.
    fn get_allowed(&self) -> StorageResult<Vec<PersonId>>;

    /// Replaces the allow-list.
    fn set_allowed(&self, ids: Vec<PersonId>) -> StorageResult<()>;

    /// Returns true if `id` is on the allow-list.
    fn is_allowed(&self, id: PersonId) -> StorageResult<bool> {
        Ok(self.get_allowed()?.contains(&id))
    }
}
