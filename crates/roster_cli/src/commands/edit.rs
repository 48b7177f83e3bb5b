//! Edit command implementation.

use super::open_roster;
use roster_storage::{EditableFields, PersonId};
use std::path::Path;

/// Runs the edit command.
pub fn run(
    path: &Path,
    id: u64,
    credential_level: String,
    training: String,
    contact: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let roster = open_roster(path)?;
    let id = PersonId(id);

    let person = roster.person(id)?;
    if person.is_none() {
        tracing::warn!(%id, "identity not in local roster, edit will apply after next refresh");
    }

    let edit = roster.save_edit(
        id,
        EditableFields {
            credential_level,
            training,
            contact,
        },
    )?;

    println!("Queued edit for {id}:");
    println!("  Credential: {}", edit.fields.credential_level);
    if !edit.fields.training.is_empty() {
        println!("  Training:   {}", edit.fields.training);
    }
    println!("  Contact:    {}", edit.fields.contact);
    println!();
    println!("{} edit(s) pending", roster.pending_change_count()?);

    Ok(())
}
