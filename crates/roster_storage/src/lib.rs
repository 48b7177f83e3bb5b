//! # Roster Storage
//!
//! Durable store contract and backends for the roster editor.
//!
//! The store owns the persisted form of four logical collections:
//!
//! - the person snapshot, replaced wholesale on every refresh
//! - the pending-edit queue, one edit per identity
//! - sync metadata (last successful sync, last status)
//! - auth state (logged-in identity, allow-list)
//!
//! ## Available Backends
//!
//! - [`MemoryStore`] - For testing and ephemeral sessions
//! - [`FileStore`] - Single JSON document with atomic replace-by-rename
//!
//! ## Example
//!
//! ```rust
//! use roster_storage::{DurableStore, MemoryStore, Person, PersonId, StoreConfig};
//!
//! let store = MemoryStore::new(StoreConfig::default());
//! store.replace_all_people(vec![Person::new(30477380u64, "Ali")]).unwrap();
//! assert!(store.get_person(PersonId(30477380)).unwrap().is_some());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod config;
mod error;
mod file;
mod memory;
mod model;
mod state;

pub use backend::DurableStore;
pub use config::{StoreConfig, DEFAULT_SEED_ALLOWED, LOCK_FILE_NAME, STORE_FILE_NAME};
pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use model::{AuthState, EditableFields, PendingEdit, Person, PersonId, SyncMeta, SyncStatus};
pub use state::FORMAT_VERSION;
