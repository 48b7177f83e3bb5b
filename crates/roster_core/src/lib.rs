//! # Roster Core
//!
//! Local-state side of the roster editor.
//!
//! This crate provides:
//! - [`SearchCache`], a time-bounded read-through copy of the person
//!   snapshot serving substring queries
//! - [`Roster`], the editing path: validated edits go into the pending
//!   queue, are applied to the snapshot, and invalidate the cache
//! - [`Clock`], the injectable time source used by everything
//!   time-dependent

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod clock;
pub mod edit;
mod error;
mod roster;
mod search;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, CoreResult};
pub use roster::Roster;
pub use search::{
    SearchCache, SearchCacheStats, SearchConfig, DEFAULT_FRESHNESS, DEFAULT_MAX_RESULTS,
};

/// Version of the roster core crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
