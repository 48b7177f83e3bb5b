//! Watch command implementation.

use super::open_session;
use std::path::Path;

/// Runs scheduled syncs for the stored login until Ctrl-C.
pub async fn run(path: &Path, endpoint: &str) -> Result<(), Box<dyn std::error::Error>> {
    let session = open_session(path, endpoint)?;
    let mut subscription = session.engine().events().subscribe();

    let identity = session
        .resume()?
        .ok_or("Not logged in; run `roster login <id>` first")?;
    println!(
        "Watching as {identity}, checking every {:?} (Ctrl-C to stop)",
        session.engine().config().check_interval
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = subscription.receiver.recv() => {
                let Some(event) = event else { break };
                if event.message.is_empty() {
                    println!("[{}]", event.status);
                } else {
                    println!("[{}] {}", event.status, event.message);
                }
                println!("  {} edit(s) pending", session.pending_change_count()?);
            }
        }
    }

    session.scheduler().stop();
    session.engine().events().unsubscribe(subscription.id);
    Ok(())
}
