//! Records held by the durable store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Externally assigned identity of a person record.
///
/// Identities are never generated locally; they arrive with the remote
/// dataset or from the seed allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub u64);

impl PersonId {
    /// Returns the raw numeric identity.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PersonId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// The three fields a user may edit on a person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditableFields {
    /// Categorical credential level.
    pub credential_level: String,
    /// Training flag, only meaningful for the "no credential" level.
    pub training: String,
    /// Contact string.
    pub contact: String,
}

/// A person record in the local snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Identity.
    pub id: PersonId,
    /// Display name.
    pub name: String,
    /// Seating floor.
    pub floor: String,
    /// Seating row.
    pub row: String,
    /// Seating seat.
    pub seat: String,
    /// Editable fields.
    #[serde(flatten)]
    pub fields: EditableFields,
    /// Set once any editable field was saved through this system.
    pub updated: bool,
}

impl Person {
    /// Creates a person with empty editable fields.
    pub fn new(id: impl Into<PersonId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            floor: String::new(),
            row: String::new(),
            seat: String::new(),
            fields: EditableFields::default(),
            updated: false,
        }
    }

    /// Sets the seating metadata.
    #[must_use]
    pub fn with_seating(
        mut self,
        floor: impl Into<String>,
        row: impl Into<String>,
        seat: impl Into<String>,
    ) -> Self {
        self.floor = floor.into();
        self.row = row.into();
        self.seat = seat.into();
        self
    }

    /// Sets the editable fields as they arrived from the remote.
    #[must_use]
    pub fn with_fields(mut self, fields: EditableFields, updated: bool) -> Self {
        self.fields = fields;
        self.updated = updated;
        self
    }

    /// Applies a pending edit onto this record.
    pub fn apply(&mut self, edit: &PendingEdit) {
        self.fields = edit.fields.clone();
        self.updated = edit.updated;
    }
}

/// A locally queued, not yet confirmed change to a person's editable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingEdit {
    /// Identity of the edited person.
    pub id: PersonId,
    /// New field values.
    #[serde(flatten)]
    pub fields: EditableFields,
    /// Always true once an edit exists.
    pub updated: bool,
    /// When the edit was saved.
    pub created_at: DateTime<Utc>,
}

impl PendingEdit {
    /// Creates a pending edit stamped with `created_at`.
    pub fn new(id: impl Into<PersonId>, fields: EditableFields, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            fields,
            updated: true,
            created_at,
        }
    }
}

/// Status of the most recent sync attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// No attempt has been made.
    #[default]
    Idle,
    /// An attempt is in flight.
    Syncing,
    /// The last attempt completed.
    Success,
    /// The last attempt failed.
    Failed,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncStatus::Idle => "idle",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Success => "success",
            SyncStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Sync bookkeeping singleton.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMeta {
    /// Time of the last successful sync.
    pub last_sync: Option<DateTime<Utc>>,
    /// Status of the last attempt.
    pub status: SyncStatus,
}

/// Login state singleton.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    /// Identity currently logged in.
    pub logged_in: Option<PersonId>,
    /// Identities allowed to log in; `None` until first stored.
    pub allowed: Option<Vec<PersonId>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_edit_sets_fields_and_marker() {
        let mut person = Person::new(30477380u64, "Ali").with_seating("1", "B", "12");
        let edit = PendingEdit::new(
            30477380,
            EditableFields {
                credential_level: "Hafiz".into(),
                training: String::new(),
                contact: "555".into(),
            },
            Utc::now(),
        );

        person.apply(&edit);
        assert_eq!(person.fields.credential_level, "Hafiz");
        assert_eq!(person.fields.contact, "555");
        assert!(person.updated);
        assert_eq!(person.seat, "12");
    }

    #[test]
    fn person_id_display() {
        assert_eq!(PersonId(30477380).to_string(), "30477380");
    }

    #[test]
    fn sync_status_serializes_lowercase() {
        let json = serde_json::to_string(&SyncStatus::Syncing).unwrap();
        assert_eq!(json, "\"syncing\"");
    }
}
