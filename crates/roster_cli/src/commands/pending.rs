//! Pending command implementation.

use super::open_roster;
use roster_storage::DurableStore;
use std::path::Path;

/// Runs the pending command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let roster = open_roster(path)?;
    let edits = roster.store().get_all_pending_edits()?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&edits)?);
        }
        _ => {
            if edits.is_empty() {
                println!("No pending edits");
            }
            for edit in &edits {
                println!(
                    "{:>10}  {} | {} | {}  (saved {})",
                    edit.id,
                    edit.fields.credential_level,
                    edit.fields.training,
                    edit.fields.contact,
                    edit.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                );
            }
        }
    }

    Ok(())
}
