//! Sync engine: upload-then-refresh over one endpoint.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::events::{SyncEvent, SyncEvents};
use crate::transport::RemoteTransport;
use crate::wire::UploadRequest;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use roster_core::Roster;
use roster_storage::{DurableStore, PendingEdit, Person, PersonId, SyncMeta, SyncStatus};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Statistics about sync attempts.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Attempts that reached the protocol.
    pub attempts: u64,
    /// Attempts that completed.
    pub successes: u64,
    /// Attempts that failed or were rejected.
    pub failures: u64,
    /// Edits confirmed by the endpoint.
    pub edits_uploaded: u64,
    /// Records received in full fetches.
    pub records_downloaded: u64,
    /// Last error message.
    pub last_error: Option<String>,
}

/// Result of one sync attempt.
#[derive(Debug, Clone)]
pub struct SyncCycleResult {
    /// Whether the attempt completed.
    pub success: bool,
    /// Edits confirmed by the endpoint.
    pub uploaded: usize,
    /// Records in the fetched dataset.
    pub downloaded: usize,
    /// "Synced at ..." on success, the error otherwise.
    pub message: String,
    /// Duration of the attempt.
    pub duration: Duration,
}

impl SyncCycleResult {
    fn failed(message: String, duration: Duration) -> Self {
        Self {
            success: false,
            uploaded: 0,
            downloaded: 0,
            message,
            duration,
        }
    }
}

/// Whether a scheduled attempt may run now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// All gates passed.
    Admitted,
    /// The local time is outside every sync window.
    OutsideWindow,
    /// The previous attempt was too recent.
    RetrySpacing,
    /// No network.
    Offline,
}

impl Admission {
    /// Returns true if the attempt may run.
    pub fn is_admitted(self) -> bool {
        self == Admission::Admitted
    }
}

struct CycleOutcome {
    uploaded: usize,
    downloaded: usize,
    synced_at: String,
}

/// The sync engine moves queued edits up and the authoritative dataset down.
///
/// Attempts are serialized: an attempt started while another is in flight
/// waits for it and then runs in full.
pub struct SyncEngine<T: RemoteTransport, S: DurableStore> {
    config: SyncConfig,
    transport: Arc<T>,
    roster: Arc<Roster<S>>,
    events: SyncEvents,
    stats: RwLock<SyncStats>,
    in_flight: tokio::sync::Mutex<()>,
}

impl<T: RemoteTransport, S: DurableStore> SyncEngine<T, S> {
    /// Creates a new sync engine.
    pub fn new(config: SyncConfig, transport: Arc<T>, roster: Arc<Roster<S>>) -> Self {
        Self {
            config,
            transport,
            roster,
            events: SyncEvents::new(),
            stats: RwLock::new(SyncStats::default()),
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns the transport.
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Returns the local roster.
    pub fn roster(&self) -> &Arc<Roster<S>> {
        &self.roster
    }

    /// Returns the status feed.
    pub fn events(&self) -> &SyncEvents {
        &self.events
    }

    /// Gets the current stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    fn store(&self) -> &Arc<S> {
        self.roster.store()
    }

    /// Returns true if the local time of day is inside a sync window.
    pub fn is_in_sync_window(&self) -> bool {
        self.config.windows.contains(self.roster.clock().local_time())
    }

    /// Decides whether a scheduled attempt may run, given the previous one.
    ///
    /// Gates are checked in order: window, retry spacing, connectivity.
    pub fn admission(&self, last_attempt: Option<DateTime<Utc>>) -> Admission {
        if !self.is_in_sync_window() {
            return Admission::OutsideWindow;
        }
        if let Some(last) = last_attempt {
            let spacing = TimeDelta::from_std(self.config.retry_spacing).unwrap_or(TimeDelta::MAX);
            if self.roster.clock().now() - last < spacing {
                return Admission::RetrySpacing;
            }
        }
        if !self.transport.is_connected() {
            return Admission::Offline;
        }
        Admission::Admitted
    }

    /// Like [`admission`](Self::admission), but re-checks the endpoint when
    /// connectivity is the only gate refusing.
    pub async fn check_admission(&self, last_attempt: Option<DateTime<Utc>>) -> Admission {
        let admission = self.admission(last_attempt);
        if admission == Admission::Offline && self.transport.refresh_connectivity().await {
            debug!("endpoint reachable again");
            return self.admission(last_attempt);
        }
        admission
    }

    /// Uploads the whole pending queue on behalf of `identity`.
    ///
    /// Returns the endpoint's verdict. An empty queue is `true` without any
    /// network call. Nothing is cleared here.
    ///
    /// # Errors
    ///
    /// Returns an error if the store, the network, or the response fails.
    pub async fn upload_changes(&self, identity: PersonId) -> SyncResult<bool> {
        let edits = self.store().get_all_pending_edits()?;
        self.upload_edits(identity, &edits).await
    }

    async fn upload_edits(&self, identity: PersonId, edits: &[PendingEdit]) -> SyncResult<bool> {
        if edits.is_empty() {
            return Ok(true);
        }
        let request = UploadRequest::new(identity, edits);
        let response = self.transport.push_updates(&request).await?;
        let accepted = response.accepted()?;
        debug!(edits = edits.len(), accepted, "upload answered");
        Ok(accepted)
    }

    /// Fetches the authoritative dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the network or the response fails.
    pub async fn fetch_full_dataset(&self) -> SyncResult<Vec<Person>> {
        self.transport.fetch_people().await
    }

    /// Runs one attempt: upload, refresh, record.
    ///
    /// Never fails past this boundary. Failures set the stored status to
    /// `Failed`, keep the queue, emit a `Failed` event and come back as an
    /// unsuccessful result.
    pub async fn perform_sync(&self, identity: PersonId) -> SyncCycleResult {
        let _attempt = self.in_flight.lock().await;
        let start = Instant::now();

        if let Err(err) = self.config.validate() {
            return self.reject(err, start);
        }

        info!(%identity, "sync attempt started");
        self.stats.write().attempts += 1;

        match self.run_cycle(identity).await {
            Ok(outcome) => {
                {
                    let mut stats = self.stats.write();
                    stats.successes += 1;
                    stats.edits_uploaded += outcome.uploaded as u64;
                    stats.records_downloaded += outcome.downloaded as u64;
                    stats.last_error = None;
                }
                info!(
                    uploaded = outcome.uploaded,
                    downloaded = outcome.downloaded,
                    "sync attempt succeeded"
                );
                SyncCycleResult {
                    success: true,
                    uploaded: outcome.uploaded,
                    downloaded: outcome.downloaded,
                    message: outcome.synced_at,
                    duration: start.elapsed(),
                }
            }
            Err(err) => self.handle_error(&err, start),
        }
    }

    /// Runs an attempt on request, outside the window gate.
    ///
    /// Still requires a configured endpoint and connectivity.
    pub async fn sync_now(&self, identity: PersonId) -> SyncCycleResult {
        let start = Instant::now();
        if let Err(err) = self.config.validate() {
            return self.reject(err, start);
        }
        if !self.transport.is_connected() && !self.transport.refresh_connectivity().await {
            return self.reject(SyncError::NotConnected, start);
        }
        self.perform_sync(identity).await
    }

    async fn run_cycle(&self, identity: PersonId) -> SyncResult<CycleOutcome> {
        let store = self.store();

        let mut meta = store.get_sync_meta()?;
        meta.status = SyncStatus::Syncing;
        store.put_sync_meta(meta)?;
        self.events.emit(SyncEvent::new(SyncStatus::Syncing, ""));

        let edits = store.get_all_pending_edits()?;
        let accepted = self.upload_edits(identity, &edits).await?;
        let uploaded = if accepted {
            let removed = store.remove_pending_edits(&edits)?;
            debug!(removed, "cleared uploaded edits");
            edits.len()
        } else {
            warn!(pending = edits.len(), "upload rejected, keeping queue");
            0
        };

        let mut people = self.fetch_full_dataset().await?;
        let downloaded = people.len();
        if self.config.reapply_pending {
            let pending = store.get_all_pending_edits()?;
            let reapplied = reapply(&mut people, &pending);
            debug!(reapplied, "re-applied pending edits over fetched dataset");
        }
        let allowed: Vec<PersonId> = people.iter().map(|p| p.id).collect();
        store.replace_all_people(people)?;
        store.set_allowed(allowed)?;
        self.roster.cache().invalidate();

        let clock = self.roster.clock();
        store.put_sync_meta(SyncMeta {
            last_sync: Some(clock.now()),
            status: SyncStatus::Success,
        })?;
        let synced_at = format!("Synced at {}", clock.local_time().format("%H:%M:%S"));
        self.events
            .emit(SyncEvent::new(SyncStatus::Success, synced_at.clone()));

        Ok(CycleOutcome {
            uploaded,
            downloaded,
            synced_at,
        })
    }

    fn handle_error(&self, err: &SyncError, start: Instant) -> SyncCycleResult {
        warn!(error = %err, retryable = err.is_retryable(), "sync attempt failed");
        {
            let mut stats = self.stats.write();
            stats.failures += 1;
            stats.last_error = Some(err.to_string());
        }

        let store = self.store();
        let recorded = store.get_sync_meta().and_then(|mut meta| {
            meta.status = SyncStatus::Failed;
            store.put_sync_meta(meta)
        });
        if let Err(meta_err) = recorded {
            warn!(error = %meta_err, "could not record failed sync status");
        }

        self.events
            .emit(SyncEvent::new(SyncStatus::Failed, err.to_string()));
        SyncCycleResult::failed(err.to_string(), start.elapsed())
    }

    /// Fails an attempt before it touches the store.
    fn reject(&self, err: SyncError, start: Instant) -> SyncCycleResult {
        warn!(error = %err, "sync attempt rejected");
        {
            let mut stats = self.stats.write();
            stats.failures += 1;
            stats.last_error = Some(err.to_string());
        }
        self.events
            .emit(SyncEvent::new(SyncStatus::Failed, err.to_string()));
        SyncCycleResult::failed(err.to_string(), start.elapsed())
    }
}

/// Applies `pending` onto matching records. Returns how many matched.
fn reapply(people: &mut [Person], pending: &[PendingEdit]) -> usize {
    let by_id: HashMap<PersonId, &PendingEdit> = pending.iter().map(|e| (e.id, e)).collect();
    let mut matched = 0;
    for person in people.iter_mut() {
        if let Some(edit) = by_id.get(&person.id) {
            person.apply(edit);
            matched += 1;
        }
    }
    matched
}
