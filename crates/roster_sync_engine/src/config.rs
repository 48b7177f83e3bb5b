//! Configuration for the sync engine.

use crate::error::{SyncError, SyncResult};
use crate::window::SyncWindows;
use std::time::Duration;

/// Configuration for sync operations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Remote sync endpoint. Empty means sync is not configured.
    pub endpoint: String,
    /// Windows in which the scheduler may start an attempt.
    pub windows: SyncWindows,
    /// How often the scheduler checks admission.
    pub check_interval: Duration,
    /// Minimum spacing between scheduled attempts, successful or not.
    pub retry_spacing: Duration,
    /// Request timeout.
    pub timeout: Duration,
    /// Re-apply still-pending edits over a freshly fetched snapshot.
    pub reapply_pending: bool,
}

impl SyncConfig {
    /// Creates a new sync configuration.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            windows: SyncWindows::default(),
            check_interval: Duration::from_secs(60),
            retry_spacing: Duration::from_secs(15 * 60),
            timeout: Duration::from_secs(30),
            reapply_pending: false,
        }
    }

    /// Sets the sync windows.
    pub fn with_windows(mut self, windows: SyncWindows) -> Self {
        self.windows = windows;
        self
    }

    /// Sets the scheduler check interval.
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// Sets the minimum spacing between scheduled attempts.
    pub fn with_retry_spacing(mut self, spacing: Duration) -> Self {
        self.retry_spacing = spacing;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables re-applying pending edits over a refreshed snapshot.
    pub fn with_reapply_pending(mut self, reapply: bool) -> Self {
        self.reapply_pending = reapply;
        self
    }

    /// Returns true if an endpoint is set.
    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty()
    }

    /// Checks the configuration before any attempt.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Configuration`] if the endpoint is unset or the
    /// check interval is zero.
    pub fn validate(&self) -> SyncResult<()> {
        if !self.is_configured() {
            return Err(SyncError::Configuration("sync endpoint not configured".into()));
        }
        if self.check_interval.is_zero() {
            return Err(SyncError::Configuration("check interval must be non-zero".into()));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new("")
    }
}
