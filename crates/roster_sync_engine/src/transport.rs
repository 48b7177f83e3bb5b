//! Transport layer abstraction for sync operations.

use crate::error::{SyncError, SyncResult};
use crate::wire::{UploadRequest, UploadResponse};
use parking_lot::Mutex;
use roster_storage::Person;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A remote transport talks to the single sync endpoint.
///
/// This trait abstracts the network layer so the engine can run against the
/// HTTP endpoint or an in-process mock.
pub trait RemoteTransport: Send + Sync {
    /// Fetches the authoritative dataset.
    fn fetch_people(&self) -> impl Future<Output = SyncResult<Vec<Person>>> + Send;

    /// Uploads queued edits.
    fn push_updates(
        &self,
        request: &UploadRequest,
    ) -> impl Future<Output = SyncResult<UploadResponse>> + Send;

    /// Checks if the network is reachable, as last observed.
    fn is_connected(&self) -> bool;

    /// Re-checks reachability and returns the refreshed [`is_connected`].
    ///
    /// [`is_connected`]: RemoteTransport::is_connected
    fn refresh_connectivity(&self) -> impl Future<Output = bool> + Send {
        std::future::ready(self.is_connected())
    }
}

/// A mock transport for testing.
#[derive(Debug)]
pub struct MockTransport {
    connected: AtomicBool,
    dataset: Mutex<Option<Vec<Person>>>,
    push_response: Mutex<Option<UploadResponse>>,
    fetch_failure: Mutex<Option<String>>,
    push_failure: Mutex<Option<String>>,
    uploads: Mutex<Vec<UploadRequest>>,
    fetches: AtomicUsize,
}

impl MockTransport {
    /// Creates a connected mock with no dataset and an accepting upload.
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            dataset: Mutex::new(None),
            push_response: Mutex::new(Some(UploadResponse::new(true))),
            fetch_failure: Mutex::new(None),
            push_failure: Mutex::new(None),
            uploads: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Sets the dataset returned by fetches.
    pub fn set_dataset(&self, people: Vec<Person>) {
        *self.dataset.lock() = Some(people);
    }

    /// Sets the upload response.
    pub fn set_push_response(&self, response: UploadResponse) {
        *self.push_response.lock() = Some(response);
    }

    /// Makes every fetch fail with a retryable network error.
    pub fn fail_fetch(&self, message: impl Into<String>) {
        *self.fetch_failure.lock() = Some(message.into());
    }

    /// Makes every upload fail with a retryable network error.
    pub fn fail_push(&self, message: impl Into<String>) {
        *self.push_failure.lock() = Some(message.into());
    }

    /// Clears injected failures.
    pub fn recover(&self) {
        *self.fetch_failure.lock() = None;
        *self.push_failure.lock() = None;
    }

    /// Sets the connected state.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Number of fetches served or failed so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Uploads received so far, oldest first.
    pub fn uploads(&self) -> Vec<UploadRequest> {
        self.uploads.lock().clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteTransport for MockTransport {
    async fn fetch_people(&self) -> SyncResult<Vec<Person>> {
        if !self.is_connected() {
            return Err(SyncError::NotConnected);
        }
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.fetch_failure.lock().clone() {
            return Err(SyncError::network_retryable(message));
        }
        self.dataset
            .lock()
            .clone()
            .ok_or_else(|| SyncError::Protocol("no mock dataset set".into()))
    }

    async fn push_updates(&self, request: &UploadRequest) -> SyncResult<UploadResponse> {
        if !self.is_connected() {
            return Err(SyncError::NotConnected);
        }
        self.uploads.lock().push(request.clone());
        if let Some(message) = self.push_failure.lock().clone() {
            return Err(SyncError::network_retryable(message));
        }
        let response = *self.push_response.lock();
        response.ok_or_else(|| SyncError::Protocol("no mock upload response set".into()))
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_storage::PersonId;

    #[test]
    fn mock_transport_connection() {
        let transport = MockTransport::new();
        assert!(transport.is_connected());

        transport.set_connected(false);
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn mock_transport_not_connected_error() {
        let transport = MockTransport::new();
        transport.set_connected(false);

        let result = transport.fetch_people().await;
        assert!(matches!(result, Err(SyncError::NotConnected)));
        assert_eq!(transport.fetch_count(), 0);
    }

    #[tokio::test]
    async fn mock_transport_records_uploads() {
        let transport = MockTransport::new();
        transport.set_push_response(UploadResponse::new(false));

        let request = UploadRequest::new(PersonId(30477380), &[]);
        let response = transport.push_updates(&request).await.unwrap();

        assert_eq!(response.success, Some(false));
        assert_eq!(transport.uploads(), vec![request]);
    }

    #[tokio::test]
    async fn mock_transport_injected_failure() {
        let transport = MockTransport::new();
        transport.set_dataset(vec![Person::new(1u64, "A")]);
        transport.fail_fetch("connection reset");

        let err = transport.fetch_people().await.unwrap_err();
        assert!(err.is_retryable());

        transport.recover();
        assert_eq!(transport.fetch_people().await.unwrap().len(), 1);
        assert_eq!(transport.fetch_count(), 2);
    }
}
