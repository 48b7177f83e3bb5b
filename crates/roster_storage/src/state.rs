//! In-memory form of the store and its on-disk document.

use crate::error::{StorageError, StorageResult};
use crate::model::{AuthState, Person, PendingEdit, PersonId, SyncMeta};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Document format version written by this build.
pub const FORMAT_VERSION: u32 = 1;

/// The four collections, keyed for lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RosterState {
    pub people: BTreeMap<PersonId, Person>,
    pub pending: BTreeMap<PersonId, PendingEdit>,
    pub meta: SyncMeta,
    pub auth: AuthState,
}

impl RosterState {
    /// Seeds the allow-list if none was ever stored. Returns true if it did.
    pub fn seed_allowed(&mut self, seed: &[PersonId]) -> bool {
        if self.auth.allowed.is_some() {
            return false;
        }
        self.auth.allowed = Some(seed.to_vec());
        true
    }

    pub fn allowed_or(&self, seed: &[PersonId]) -> Vec<PersonId> {
        self.auth
            .allowed
            .clone()
            .unwrap_or_else(|| seed.to_vec())
    }

    pub fn replace_people(&mut self, people: Vec<Person>) {
        self.people = people.into_iter().map(|p| (p.id, p)).collect();
    }

    pub fn put_pending_edit(&mut self, edit: PendingEdit) {
        if let Some(person) = self.people.get_mut(&edit.id) {
            person.apply(&edit);
        }
        self.pending.insert(edit.id, edit);
    }

    /// Drops queued edits still equal to one in `uploaded`. Returns how many.
    pub fn remove_pending_edits(&mut self, uploaded: &[PendingEdit]) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, edit| !uploaded.contains(edit));
        before - self.pending.len()
    }
}

/// Serialized form of [`RosterState`].
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StoreDocument {
    pub format_version: u32,
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub pending_edits: Vec<PendingEdit>,
    #[serde(default)]
    pub meta: SyncMeta,
    #[serde(default)]
    pub auth: AuthState,
}

impl StoreDocument {
    pub fn from_state(state: &RosterState) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            people: state.people.values().cloned().collect(),
            pending_edits: state.pending.values().cloned().collect(),
            meta: state.meta.clone(),
            auth: state.auth.clone(),
        }
    }

    pub fn into_state(self) -> StorageResult<RosterState> {
        if self.format_version != FORMAT_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: self.format_version,
                expected: FORMAT_VERSION,
            });
        }

        let mut state = RosterState {
            meta: self.meta,
            auth: self.auth,
            ..RosterState::default()
        };
        for person in self.people {
            if state.people.insert(person.id, person).is_some() {
                return Err(StorageError::corrupted("duplicate person identity"));
            }
        }
        for edit in self.pending_edits {
            state.pending.insert(edit.id, edit);
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EditableFields;
    use chrono::Utc;

    #[test]
    fn seed_only_once() {
        let mut state = RosterState::default();
        assert!(state.seed_allowed(&[PersonId(1)]));
        assert!(!state.seed_allowed(&[PersonId(2)]));
        assert_eq!(state.allowed_or(&[]), vec![PersonId(1)]);
    }

    #[test]
    fn pending_edit_without_person_is_kept() {
        let mut state = RosterState::default();
        state.put_pending_edit(PendingEdit::new(9u64, EditableFields::default(), Utc::now()));
        assert!(state.people.is_empty());
        assert_eq!(state.pending.len(), 1);
    }

    #[test]
    fn remove_keeps_edits_changed_since_upload() {
        let mut state = RosterState::default();
        let fields = |contact: &str| EditableFields {
            contact: contact.into(),
            ..EditableFields::default()
        };
        let sent = PendingEdit::new(1u64, fields("111"), Utc::now());
        let resaved = PendingEdit::new(2u64, fields("222"), Utc::now());
        state.put_pending_edit(sent.clone());
        state.put_pending_edit(resaved.clone());
        state.put_pending_edit(PendingEdit::new(2u64, fields("333"), Utc::now()));
        state.put_pending_edit(PendingEdit::new(3u64, fields("444"), Utc::now()));

        assert_eq!(state.remove_pending_edits(&[sent, resaved]), 1);
        let left: Vec<&str> = state.pending.values().map(|e| e.fields.contact.as_str()).collect();
        assert_eq!(left, vec!["333", "444"]);
    }

    #[test]
    fn document_round_trip_preserves_state() {
        let mut state = RosterState::default();
        state.replace_people(vec![Person::new(2u64, "B"), Person::new(1u64, "A")]);
        state.seed_allowed(&[PersonId(1)]);

        let doc = StoreDocument::from_state(&state);
        assert_eq!(doc.people[0].id, PersonId(1));

        let restored = doc.into_state().unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn document_rejects_unknown_version() {
        let doc = StoreDocument {
            format_version: 99,
            people: Vec::new(),
            pending_edits: Vec::new(),
            meta: SyncMeta::default(),
            auth: AuthState::default(),
        };
        assert!(matches!(
            doc.into_state(),
            Err(StorageError::UnsupportedVersion { found: 99, .. })
        ));
    }
}
