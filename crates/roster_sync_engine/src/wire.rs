//! Wire shapes exchanged with the remote sync endpoint.
//!
//! Field names here are the endpoint's, not ours. Decoding of person
//! records is lenient because the remote side is a spreadsheet export:
//! identities may arrive as numeric strings, text columns as numbers or
//! nulls, and the updated marker as a string.

use crate::error::{SyncError, SyncResult};
use roster_storage::{EditableFields, PendingEdit, Person, PersonId};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A person record as served by the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WirePerson {
    /// Identity.
    #[serde(rename = "EjamaatID", deserialize_with = "de_id")]
    pub id: u64,
    /// Display name.
    #[serde(rename = "Full_Name", default, deserialize_with = "de_text")]
    pub full_name: String,
    /// Seating floor.
    #[serde(rename = "FLOOR", default, deserialize_with = "de_text")]
    pub floor: String,
    /// Seating row.
    #[serde(rename = "ROW", default, deserialize_with = "de_text")]
    pub row: String,
    /// Seating seat.
    #[serde(rename = "SEAT", default, deserialize_with = "de_text")]
    pub seat: String,
    /// Credential level.
    #[serde(rename = "Quran_Sanad", default, deserialize_with = "de_text")]
    pub credential_level: String,
    /// Training flag.
    #[serde(rename = "Talim", default, deserialize_with = "de_text")]
    pub training: String,
    /// Contact string.
    #[serde(rename = "Contact_No", default, deserialize_with = "de_text")]
    pub contact: String,
    /// Updated marker.
    #[serde(rename = "Is_Updated", default, deserialize_with = "de_flag")]
    pub is_updated: bool,
}

impl From<WirePerson> for Person {
    fn from(wire: WirePerson) -> Self {
        Person::new(wire.id, wire.full_name)
            .with_seating(wire.floor, wire.row, wire.seat)
            .with_fields(
                EditableFields {
                    credential_level: wire.credential_level,
                    training: wire.training,
                    contact: wire.contact,
                },
                wire.is_updated,
            )
    }
}

impl From<&Person> for WirePerson {
    fn from(person: &Person) -> Self {
        Self {
            id: person.id.get(),
            full_name: person.name.clone(),
            floor: person.floor.clone(),
            row: person.row.clone(),
            seat: person.seat.clone(),
            credential_level: person.fields.credential_level.clone(),
            training: person.fields.training.clone(),
            contact: person.fields.contact.clone(),
            is_updated: person.updated,
        }
    }
}

/// Body of a full dataset fetch: either wrapped or a bare list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DatasetResponse {
    Wrapped { people: Vec<WirePerson> },
    Bare(Vec<WirePerson>),
}

/// Decodes a full dataset response body.
///
/// # Errors
///
/// Returns [`SyncError::Protocol`] if the body is neither a list of people
/// nor an object with a `people` list.
pub fn decode_dataset(body: &[u8]) -> SyncResult<Vec<Person>> {
    let response: DatasetResponse = serde_json::from_slice(body)
        .map_err(|e| SyncError::Protocol(format!("unexpected dataset body: {e}")))?;
    let people = match response {
        DatasetResponse::Wrapped { people } | DatasetResponse::Bare(people) => people,
    };
    Ok(people.into_iter().map(Person::from).collect())
}

/// One queued edit in upload shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireUpdate {
    /// Identity.
    #[serde(rename = "EjamaatID")]
    pub id: u64,
    /// Credential level.
    #[serde(rename = "Quran_Sanad")]
    pub credential_level: String,
    /// Training flag.
    #[serde(rename = "Talim")]
    pub training: String,
    /// Contact string.
    #[serde(rename = "Contact_No")]
    pub contact: String,
    /// Updated marker.
    #[serde(rename = "Is_Updated")]
    pub is_updated: bool,
}

impl From<&PendingEdit> for WireUpdate {
    fn from(edit: &PendingEdit) -> Self {
        Self {
            id: edit.id.get(),
            credential_level: edit.fields.credential_level.clone(),
            training: edit.fields.training.clone(),
            contact: edit.fields.contact.clone(),
            is_updated: edit.updated,
        }
    }
}

/// Body of an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRequest {
    /// Identity of the logged-in editor.
    #[serde(rename = "itsNumber")]
    pub its_number: u64,
    /// The queued edits.
    pub updates: Vec<WireUpdate>,
}

impl UploadRequest {
    /// Builds an upload of `edits` on behalf of `editor`.
    pub fn new(editor: PersonId, edits: &[PendingEdit]) -> Self {
        Self {
            its_number: editor.get(),
            updates: edits.iter().map(WireUpdate::from).collect(),
        }
    }
}

/// Response to an upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Explicit success flag; absent means the body is malformed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl UploadResponse {
    /// A response carrying `success`.
    pub fn new(success: bool) -> Self {
        Self {
            success: Some(success),
        }
    }

    /// Returns the success flag.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Protocol`] if the flag is missing.
    pub fn accepted(&self) -> SyncResult<bool> {
        self.success
            .ok_or_else(|| SyncError::Protocol("upload response missing success flag".into()))
    }
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .ok_or_else(|| de::Error::custom(format!("invalid identity {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid identity '{s}'"))),
        other => Err(de::Error::custom(format!("invalid identity {other}"))),
    }
}

fn de_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(de::Error::custom(format!("expected text, got {other}"))),
    }
}

fn de_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => Ok(matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "1"
        )),
        other => Err(de::Error::custom(format!("expected flag, got {other}"))),
    }
}
