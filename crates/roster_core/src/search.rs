//! Search index cache.
//!
//! A time-bounded, read-through copy of the person snapshot that serves
//! substring queries without re-reading the durable store on every
//! keystroke.
//!
//! # Freshness
//!
//! A read serves the held copy while it is no older than the freshness
//! window; otherwise it refetches the whole collection and restamps the
//! capture time. Writers of person data call [`SearchCache::invalidate`],
//! which discards the copy so the next read refetches.
//!
//! The cache is never the source of truth. Dropping it loses nothing.

use crate::clock::Clock;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use roster_storage::{DurableStore, Person, StorageResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default freshness window.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(30);

/// Default cap on results per query.
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Configuration for the search cache.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum age at which the held copy is served.
    pub freshness: Duration,
    /// Maximum number of results per query.
    pub max_results: usize,
}

impl SearchConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the freshness window.
    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    /// Sets the result cap.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            freshness: DEFAULT_FRESHNESS,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchCacheStats {
    /// Reads served from the held copy.
    pub hits: u64,
    /// Reads that refetched from the store.
    pub refetches: u64,
    /// Calls to `invalidate`.
    pub invalidations: u64,
}

#[derive(Debug)]
struct Snapshot {
    people: Arc<Vec<Person>>,
    captured_at: DateTime<Utc>,
}

/// Time-bounded read-through cache over the person collection.
pub struct SearchCache<S: DurableStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: SearchConfig,
    snapshot: RwLock<Option<Snapshot>>,
    hits: AtomicU64,
    refetches: AtomicU64,
    invalidations: AtomicU64,
}

impl<S: DurableStore> SearchCache<S> {
    /// Creates an empty cache over `store`.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: SearchConfig) -> Self {
        Self {
            store,
            clock,
            config,
            snapshot: RwLock::new(None),
            hits: AtomicU64::new(0),
            refetches: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Returns the person collection, refetching if the copy is missing or stale.
    ///
    /// # Errors
    ///
    /// Propagates store failures from the refetch.
    pub fn people(&self) -> StorageResult<Arc<Vec<Person>>> {
        let now = self.clock.now();
        let freshness = TimeDelta::from_std(self.config.freshness).unwrap_or(TimeDelta::MAX);

        if let Some(snapshot) = self.snapshot.read().as_ref() {
            if now.signed_duration_since(snapshot.captured_at) <= freshness {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Arc::clone(&snapshot.people));
            }
        }

        let generation = self.invalidations.load(Ordering::Acquire);
        let people = Arc::new(self.store.get_all_people()?);
        self.refetches.fetch_add(1, Ordering::Relaxed);
        debug!(count = people.len(), "search cache refetched");

        // An invalidation during the refetch means the copy may predate a write.
        let mut slot = self.snapshot.write();
        if self.invalidations.load(Ordering::Acquire) == generation {
            *slot = Some(Snapshot {
                people: Arc::clone(&people),
                captured_at: now,
            });
        }
        Ok(people)
    }

    /// Discards the held copy; the next read refetches.
    pub fn invalidate(&self) {
        let mut slot = self.snapshot.write();
        *slot = None;
        self.invalidations.fetch_add(1, Ordering::Release);
    }

    /// Returns true if a copy is currently held.
    pub fn is_warm(&self) -> bool {
        self.snapshot.read().is_some()
    }

    /// Finds people matching a free-text query.
    ///
    /// Matching is a case-insensitive substring test against the identity,
    /// name, row and seat, in that order. Results keep the collection's
    /// iteration order and are capped at `max_results`. A blank query returns
    /// nothing without reading the cache.
    ///
    /// # Errors
    ///
    /// Propagates store failures from a refetch.
    pub fn search(&self, query: &str) -> StorageResult<Vec<Person>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let people = self.people()?;
        Ok(people
            .iter()
            .filter(|person| matches(person, &needle))
            .take(self.config.max_results)
            .cloned()
            .collect())
    }

    /// Returns the cache counters.
    pub fn stats(&self) -> SearchCacheStats {
        SearchCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            refetches: self.refetches.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}

fn matches(person: &Person, needle: &str) -> bool {
    person.id.to_string().contains(needle)
        || person.name.to_lowercase().contains(needle)
        || person.row.to_lowercase().contains(needle)
        || person.seat.to_lowercase().contains(needle)
}
