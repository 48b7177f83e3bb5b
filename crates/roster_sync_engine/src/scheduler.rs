//! Periodic sync scheduler.
//!
//! Every check interval the scheduler asks the engine for admission (sync
//! window, retry spacing since the last attempt, connectivity) and runs an
//! attempt when all gates pass. The attempt time is stamped before the
//! attempt starts, so a failing endpoint is retried no sooner than the retry
//! spacing.

use crate::engine::{SyncCycleResult, SyncEngine};
use crate::error::SyncResult;
use crate::transport::RemoteTransport;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use roster_storage::{DurableStore, PersonId};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

struct Running {
    identity: PersonId,
    task: JoinHandle<()>,
    stop: oneshot::Sender<()>,
}

/// Drives scheduled sync attempts for one logged-in identity.
#[derive(Default)]
pub struct Scheduler {
    running: Mutex<Option<Running>>,
    last_attempt: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl Scheduler {
    /// Creates a stopped scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the periodic task. Returns false if it was already running.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Configuration`] if the engine's configuration
    /// is invalid; nothing is spawned in that case.
    pub fn start<T, S>(
        &self,
        engine: Arc<SyncEngine<T, S>>,
        identity: PersonId,
    ) -> SyncResult<bool>
    where
        T: RemoteTransport + 'static,
        S: DurableStore + 'static,
    {
        engine.config().validate()?;
        let mut running = self.running.lock();
        if running.as_ref().is_some_and(|r| !r.task.is_finished()) {
            return Ok(false);
        }

        let period = engine.config().check_interval;
        let last_attempt = Arc::clone(&self.last_attempt);
        let (stop, mut stopped) = oneshot::channel();

        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stopped => break,
                    _ = ticker.tick() => {
                        run_tick(&engine, identity, &last_attempt).await;
                    }
                }
            }
            debug!(%identity, "scheduler task exited");
        });

        *running = Some(Running {
            identity,
            task,
            stop,
        });
        info!(%identity, interval = ?period, "scheduler started");
        Ok(true)
    }

    /// Stops future attempts. Returns whether it was running.
    ///
    /// An attempt already in flight runs to completion.
    pub fn stop(&self) -> bool {
        match self.running.lock().take() {
            Some(running) => {
                let was_running = !running.task.is_finished();
                let _ = running.stop.send(());
                info!("scheduler stopped");
                was_running
            }
            None => false,
        }
    }

    /// Returns true if the periodic task is alive.
    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .as_ref()
            .is_some_and(|r| !r.task.is_finished())
    }

    /// Identity the running task syncs for.
    pub fn identity(&self) -> Option<PersonId> {
        self.running
            .lock()
            .as_ref()
            .filter(|r| !r.task.is_finished())
            .map(|r| r.identity)
    }

    /// Time of the last attempt the scheduler started.
    pub fn last_attempt(&self) -> Option<DateTime<Utc>> {
        *self.last_attempt.lock()
    }

    /// Runs one scheduler check immediately, outside the timer.
    ///
    /// Returns the attempt's result, or `None` if admission was refused.
    pub async fn tick<T, S>(
        &self,
        engine: &SyncEngine<T, S>,
        identity: PersonId,
    ) -> Option<SyncCycleResult>
    where
        T: RemoteTransport,
        S: DurableStore,
    {
        run_tick(engine, identity, &self.last_attempt).await
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(running) = self.running.get_mut().take() {
            let _ = running.stop.send(());
        }
    }
}

async fn run_tick<T, S>(
    engine: &SyncEngine<T, S>,
    identity: PersonId,
    last_attempt: &Mutex<Option<DateTime<Utc>>>,
) -> Option<SyncCycleResult>
where
    T: RemoteTransport,
    S: DurableStore,
{
    let previous = *last_attempt.lock();
    let admission = engine.check_admission(previous).await;
    if !admission.is_admitted() {
        debug!(?admission, "scheduled sync skipped");
        return None;
    }
    *last_attempt.lock() = Some(engine.roster().clock().now());
    Some(engine.perform_sync(identity).await)
}
