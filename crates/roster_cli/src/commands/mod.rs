//! CLI command implementations.

pub mod edit;
pub mod inspect;
pub mod pending;
pub mod search;
pub mod session;
pub mod sync;
pub mod watch;

use roster_core::{Roster, SearchConfig, SystemClock};
use roster_storage::{FileStore, Person, StoreConfig};
use roster_sync_engine::{HttpTransport, Session, SyncConfig, SyncEngine};
use std::path::Path;
use std::sync::Arc;

/// Opens the roster stored in `path`.
pub fn open_roster(path: &Path) -> Result<Arc<Roster<FileStore>>, Box<dyn std::error::Error>> {
    let store = FileStore::open(path, StoreConfig::default())?;
    Ok(Arc::new(Roster::new(
        Arc::new(store),
        Arc::new(SystemClock),
        SearchConfig::default(),
    )))
}

/// Opens a session syncing the roster in `path` against `endpoint`.
pub fn open_session(
    path: &Path,
    endpoint: &str,
) -> Result<Session<HttpTransport, FileStore>, Box<dyn std::error::Error>> {
    let config = SyncConfig::new(endpoint);
    let transport = Arc::new(HttpTransport::new(&config)?);
    let engine = Arc::new(SyncEngine::new(config, transport, open_roster(path)?));
    Ok(Session::new(engine, StoreConfig::default().seed_allowed))
}

/// Prints people one per line.
pub fn print_people(people: &[Person]) {
    for person in people {
        let marker = if person.updated { "*" } else { " " };
        println!(
            "{marker} {:>10}  {:<32} floor {:<3} row {:<3} seat {:<4} {} | {} | {}",
            person.id,
            person.name,
            person.floor,
            person.row,
            person.seat,
            person.fields.credential_level,
            person.fields.training,
            person.fields.contact,
        );
    }
}
