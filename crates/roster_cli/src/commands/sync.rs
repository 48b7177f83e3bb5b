//! Sync command implementation.

use super::open_session;
use std::path::Path;

/// Runs one manual sync attempt for the stored login.
pub async fn run(path: &Path, endpoint: &str) -> Result<(), Box<dyn std::error::Error>> {
    let session = open_session(path, endpoint)?;
    let identity = session
        .current_identity()?
        .ok_or("Not logged in; run `roster login <id>` first")?;

    let result = session.engine().sync_now(identity).await;
    if !result.success {
        return Err(format!("Sync failed: {}", result.message).into());
    }

    println!("{}", result.message);
    println!("  Uploaded:   {} edit(s)", result.uploaded);
    println!("  Downloaded: {} record(s)", result.downloaded);
    println!("  Pending:    {} edit(s)", session.pending_change_count()?);
    println!("  Took:       {:?}", result.duration);
    Ok(())
}
