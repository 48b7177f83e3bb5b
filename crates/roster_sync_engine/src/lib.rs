//! # Roster Sync Engine
//!
//! Moves locally queued edits to the remote endpoint and pulls the
//! authoritative roster back.
//!
//! This crate provides:
//! - Sync attempt state machine (idle → syncing → success | failed)
//! - Admission gating by sync windows, retry spacing and connectivity
//! - A periodic [`Scheduler`]
//! - A status feed ([`SyncEvents`])
//! - HTTP transport over `reqwest`, plus a mock for tests
//! - The login [`Session`]
//!
//! ## Architecture
//!
//! The engine implements an **upload-then-refresh** model:
//! 1. Upload the whole pending queue tagged with the logged-in identity
//! 2. Clear the queue only if the endpoint accepted it
//! 3. Fetch the full dataset, accepted or not
//! 4. Replace the local snapshot and allow-list wholesale
//!
//! ## Key Invariants
//!
//! - The endpoint is authoritative; a refresh overwrites local edits
//! - A rejected or failed upload never loses queued edits
//! - Attempts never overlap
//! - Failures are reported, never raised, past [`SyncEngine::perform_sync`]

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod events;
mod http;
mod scheduler;
mod session;
mod transport;
mod window;
pub mod wire;

pub use config::SyncConfig;
pub use engine::{Admission, SyncCycleResult, SyncEngine, SyncStats};
pub use error::{SyncError, SyncResult};
pub use events::{Subscription, SubscriptionId, SyncEvent, SyncEvents};
pub use http::HttpTransport;
pub use scheduler::Scheduler;
pub use session::Session;
pub use transport::{MockTransport, RemoteTransport};
pub use window::{SyncWindow, SyncWindows};
