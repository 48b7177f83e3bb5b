//! Inspect command implementation.

use roster_storage::{DurableStore, FileStore, StoreConfig, SyncStatus, STORE_FILE_NAME};
use serde::Serialize;
use std::path::Path;

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Data directory.
    pub path: String,
    /// Store document size in bytes.
    pub document_size: u64,
    /// Number of people in the local snapshot.
    pub people: usize,
    /// Number of people carrying the updated marker.
    pub updated: usize,
    /// Number of edits waiting for upload.
    pub pending_edits: usize,
    /// Status of the last sync attempt.
    pub sync_status: SyncStatus,
    /// Time of the last successful sync.
    pub last_sync: Option<String>,
    /// Stored login.
    pub logged_in: Option<u64>,
    /// Number of identities allowed to log in.
    pub allowed: usize,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !path.join(STORE_FILE_NAME).exists() {
        return Err(format!("No roster found at {:?}", path).into());
    }

    let store = FileStore::open(path, StoreConfig::default())?;
    let result = collect(&store)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Gathers the inspection figures from an open store.
pub fn collect(store: &FileStore) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let people = store.get_all_people()?;
    let meta = store.get_sync_meta()?;

    Ok(InspectResult {
        path: store.dir().display().to_string(),
        document_size: std::fs::metadata(store.path())?.len(),
        people: people.len(),
        updated: people.iter().filter(|p| p.updated).count(),
        pending_edits: store.pending_edit_count()?,
        sync_status: meta.status,
        last_sync: meta.last_sync.map(|t| t.to_rfc3339()),
        logged_in: store.get_logged_in()?.map(|id| id.get()),
        allowed: store.get_allowed()?.len(),
    })
}

fn print_text_output(result: &InspectResult) {
    println!("Roster Inspection");
    println!("=================");
    println!();
    println!("Path: {}", result.path);
    println!("Document size: {} bytes", result.document_size);
    println!();
    println!("Roster:");
    println!("  People:        {}", result.people);
    println!("  Updated:       {}", result.updated);
    println!("  Pending edits: {}", result.pending_edits);
    println!();
    println!("Sync:");
    println!("  Status:    {}", result.sync_status);
    println!(
        "  Last sync: {}",
        result.last_sync.as_deref().unwrap_or("never")
    );
    println!();
    println!("Auth:");
    match result.logged_in {
        Some(id) => println!("  Logged in: {id}"),
        None => println!("  Logged in: -"),
    }
    println!("  Allowed:   {}", result.allowed);
}
