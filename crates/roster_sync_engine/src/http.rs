//! HTTP transport implementation.
//!
//! One endpoint serves both directions: `GET` returns the full dataset and
//! `POST` accepts queued edits. Bodies are JSON in the shapes of
//! [`crate::wire`].

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::transport::RemoteTransport;
use crate::wire::{self, UploadRequest, UploadResponse};
use parking_lot::RwLock;
use roster_storage::Person;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// HTTP-based sync transport backed by `reqwest`.
pub struct HttpTransport {
    /// Sync endpoint URL.
    endpoint: String,
    /// Shared client with the configured timeout.
    client: reqwest::Client,
    /// Network reachability as last observed.
    online: AtomicBool,
    /// Last error message.
    last_error: RwLock<Option<String>>,
}

impl HttpTransport {
    /// Creates a transport for the configured endpoint.
    ///
    /// An unset endpoint is accepted here; every request then fails with
    /// [`SyncError::Configuration`].
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Configuration`] if the client cannot be built.
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SyncError::Configuration(e.to_string()))?;
        Ok(Self {
            endpoint: config.endpoint.trim().to_string(),
            client,
            online: AtomicBool::new(true),
            last_error: RwLock::new(None),
        })
    }

    /// Returns the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns true if an endpoint is set.
    pub fn is_configured(&self) -> bool {
        !self.endpoint.is_empty()
    }

    /// Overrides the observed reachability, e.g. on a host network change.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Returns the last error message.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    fn require_endpoint(&self) -> SyncResult<()> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(SyncError::Configuration("sync endpoint not configured".into()))
        }
    }

    /// Sends `request`, tracking reachability: any response marks the
    /// endpoint online, a connect or timeout failure marks it offline.
    async fn send(&self, request: reqwest::RequestBuilder) -> SyncResult<reqwest::Response> {
        match request.send().await {
            Ok(response) => {
                self.set_online(true);
                Ok(response)
            }
            Err(err) => {
                if (err.is_connect() || err.is_timeout())
                    && self.online.swap(false, Ordering::SeqCst)
                {
                    warn!(error = %err, "sync endpoint unreachable");
                }
                Err(err.into())
            }
        }
    }

    fn record<T>(&self, result: SyncResult<T>) -> SyncResult<T> {
        *self.last_error.write() = result.as_ref().err().map(ToString::to_string);
        result
    }

    async fn get_dataset(&self) -> SyncResult<Vec<Person>> {
        let response = self
            .send(self.client.get(&self.endpoint))
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;
        let people = wire::decode_dataset(&body)?;
        debug!(records = people.len(), "fetched dataset");
        Ok(people)
    }

    async fn post_updates(&self, request: &UploadRequest) -> SyncResult<UploadResponse> {
        let response = self
            .send(self.client.post(&self.endpoint).json(request))
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| SyncError::Protocol(format!("unexpected upload response: {e}")))
    }
}

impl RemoteTransport for HttpTransport {
    async fn fetch_people(&self) -> SyncResult<Vec<Person>> {
        self.require_endpoint()?;
        if !self.is_connected() {
            return Err(SyncError::NotConnected);
        }
        let result = self.get_dataset().await;
        self.record(result)
    }

    async fn push_updates(&self, request: &UploadRequest) -> SyncResult<UploadResponse> {
        self.require_endpoint()?;
        if !self.is_connected() {
            return Err(SyncError::NotConnected);
        }
        let result = self.post_updates(request).await;
        self.record(result)
    }

    fn is_connected(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    async fn refresh_connectivity(&self) -> bool {
        if self.is_configured() {
            let reached = self.send(self.client.head(&self.endpoint)).await.is_ok();
            debug!(reached, "checked sync endpoint");
        }
        self.is_connected()
    }
}
