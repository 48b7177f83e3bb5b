//! Login and logout command implementations.

use super::open_session;
use roster_storage::{DurableStore, FileStore, PersonId, StoreConfig};
use std::path::Path;

/// Logs in and persists the identity for later `sync` and `watch` runs.
pub async fn login(path: &Path, endpoint: &str, id: u64) -> Result<(), Box<dyn std::error::Error>> {
    let session = open_session(path, endpoint)?;
    session.login(PersonId(id)).await?;
    session.scheduler().stop();

    println!("Logged in as {id}");
    if endpoint.trim().is_empty() {
        println!("No sync endpoint configured; working offline");
    }
    println!(
        "{} people in local roster, {} edit(s) pending",
        session.engine().roster().store().people_count()?,
        session.pending_change_count()?
    );
    Ok(())
}

/// Clears the stored login.
pub fn logout(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::open(path, StoreConfig::default())?;
    match store.get_logged_in()? {
        Some(id) => {
            store.set_logged_in(None)?;
            println!("Logged out {id}");
        }
        None => println!("Not logged in"),
    }
    Ok(())
}
