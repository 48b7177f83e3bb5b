//! Login session: the allow-list gate, first-login seeding, and the scheduler
//! lifetime.

use crate::engine::SyncEngine;
use crate::error::{SyncError, SyncResult};
use crate::scheduler::Scheduler;
use crate::transport::RemoteTransport;
use roster_storage::{DurableStore, PersonId};
use std::sync::Arc;
use tracing::{info, warn};

/// A logged-in editing session.
///
/// Owns the scheduler: logging in starts it, logging out stops it.
pub struct Session<T: RemoteTransport, S: DurableStore> {
    engine: Arc<SyncEngine<T, S>>,
    scheduler: Scheduler,
    seed: Vec<PersonId>,
}

impl<T, S> Session<T, S>
where
    T: RemoteTransport + 'static,
    S: DurableStore + 'static,
{
    /// Creates a session whose gate also admits the `seed` identities.
    pub fn new(engine: Arc<SyncEngine<T, S>>, seed: Vec<PersonId>) -> Self {
        Self {
            engine,
            scheduler: Scheduler::new(),
            seed,
        }
    }

    /// Returns the engine.
    pub fn engine(&self) -> &Arc<SyncEngine<T, S>> {
        &self.engine
    }

    /// Returns the scheduler.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Logs `identity` in and starts scheduled syncs for it, replacing any
    /// scheduler still running for a previous login.
    ///
    /// On an empty local roster the full dataset is fetched first. If that
    /// fetch fails the login proceeds on the existing allow-list, and if the
    /// sync configuration is unusable the login proceeds without scheduled
    /// syncs.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotAuthorized`] if the identity is neither on the
    /// stored allow-list nor the seed list, and
    /// [`SyncError::UnknownIdentity`] if a fresh dataset doesn't contain it.
    pub async fn login(&self, identity: PersonId) -> SyncResult<()> {
        let store = self.engine.roster().store();
        if !store.is_allowed(identity)? && !self.seed.contains(&identity) {
            return Err(SyncError::NotAuthorized(identity));
        }

        if store.people_count()? == 0 {
            match self.engine.fetch_full_dataset().await {
                Ok(people) => {
                    let ids: Vec<PersonId> = people.iter().map(|p| p.id).collect();
                    let count = people.len();
                    store.replace_all_people(people)?;
                    store.set_allowed(ids.clone())?;
                    self.engine.roster().cache().invalidate();
                    info!(records = count, "seeded roster on first login");
                    if !ids.contains(&identity) {
                        return Err(SyncError::UnknownIdentity(identity));
                    }
                }
                Err(err) => {
                    warn!(error = %err, "initial dataset fetch failed, continuing offline");
                }
            }
        }

        store.set_logged_in(Some(identity))?;
        self.scheduler.stop();
        if let Err(err) = self.scheduler.start(Arc::clone(&self.engine), identity) {
            warn!(error = %err, "scheduled sync not started");
        }
        info!(%identity, "logged in");
        Ok(())
    }

    /// Restarts scheduled syncs for a stored login.
    ///
    /// # Errors
    ///
    /// Propagates store failures and an unusable sync configuration.
    pub fn resume(&self) -> SyncResult<Option<PersonId>> {
        let identity = self.engine.roster().store().get_logged_in()?;
        if let Some(identity) = identity {
            self.scheduler.stop();
            self.scheduler.start(Arc::clone(&self.engine), identity)?;
            info!(%identity, "resumed session");
        }
        Ok(identity)
    }

    /// Clears the stored login and stops scheduled syncs.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn logout(&self) -> SyncResult<()> {
        self.engine.roster().store().set_logged_in(None)?;
        self.scheduler.stop();
        info!("logged out");
        Ok(())
    }

    /// Returns the stored login.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn current_identity(&self) -> SyncResult<Option<PersonId>> {
        Ok(self.engine.roster().store().get_logged_in()?)
    }

    /// Number of edits waiting for upload.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn pending_change_count(&self) -> SyncResult<usize> {
        Ok(self.engine.roster().store().pending_edit_count()?)
    }
}
