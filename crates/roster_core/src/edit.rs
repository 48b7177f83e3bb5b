//! Validation of edits before they enter the pending queue.

use crate::error::{CoreError, CoreResult};
use roster_storage::EditableFields;

/// Credential level meaning "no credential held". Training is only recorded
/// for this level.
pub const NO_CREDENTIAL: &str = "No Sanad";

/// Catalogue of credential levels a local edit may select.
pub const CREDENTIAL_LEVELS: [&str; 15] = [
    NO_CREDENTIAL,
    "Hafiz",
    "Surah al-Balad",
    "Surah al-Inshiqaq",
    "Juz Amma",
    "Marhala Ula",
    "Marhala Sania",
    "Marhala Salesa",
    "Marhala Rabea",
    "Marhala Khamesa",
    "Marhala Sadesa",
    "Marhala Sabea",
    "Sanah Ula",
    "Sanah Saniyah",
    "Sanah Salesah",
];

/// Allowed training values.
pub const TRAINING_OPTIONS: [&str; 2] = ["Yes", "No"];

/// Validates a draft and returns the fields as they will be stored.
///
/// The contact is trimmed, and training is cleared unless the credential
/// level is [`NO_CREDENTIAL`].
///
/// # Errors
///
/// Returns [`CoreError::InvalidEdit`] if the credential level is missing or
/// unknown, the contact is blank, or the training value is unknown.
pub fn normalize(draft: EditableFields) -> CoreResult<EditableFields> {
    let credential_level = draft.credential_level.trim().to_string();
    if credential_level.is_empty() {
        return Err(CoreError::invalid_edit("credential level is required"));
    }
    if !CREDENTIAL_LEVELS.contains(&credential_level.as_str()) {
        return Err(CoreError::invalid_edit(format!(
            "unknown credential level '{credential_level}'"
        )));
    }

    let contact = draft.contact.trim().to_string();
    if contact.is_empty() {
        return Err(CoreError::invalid_edit("contact is required"));
    }

    let training = if credential_level == NO_CREDENTIAL {
        let training = draft.training.trim().to_string();
        if !training.is_empty() && !TRAINING_OPTIONS.contains(&training.as_str()) {
            return Err(CoreError::invalid_edit(format!(
                "unknown training value '{training}'"
            )));
        }
        training
    } else {
        String::new()
    };

    Ok(EditableFields {
        credential_level,
        training,
        contact,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(level: &str, training: &str, contact: &str) -> EditableFields {
        EditableFields {
            credential_level: level.into(),
            training: training.into(),
            contact: contact.into(),
        }
    }

    #[test]
    fn training_cleared_for_credentialed_level() {
        let fields = normalize(draft("Hafiz", "Yes", " 12345 ")).unwrap();
        assert_eq!(fields.training, "");
        assert_eq!(fields.contact, "12345");
    }

    #[test]
    fn training_kept_for_no_credential() {
        let fields = normalize(draft(NO_CREDENTIAL, "Yes", "12345")).unwrap();
        assert_eq!(fields.training, "Yes");
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(matches!(
            normalize(draft("", "", "12345")),
            Err(CoreError::InvalidEdit { .. })
        ));
        assert!(matches!(
            normalize(draft("Hafiz", "", "   ")),
            Err(CoreError::InvalidEdit { .. })
        ));
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(normalize(draft("Grandmaster", "", "1")).is_err());
        assert!(normalize(draft(NO_CREDENTIAL, "Maybe", "1")).is_err());
    }
}
