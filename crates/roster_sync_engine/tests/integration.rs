//! Integration tests for the sync engine against an in-memory sheet.

use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use roster_core::{ManualClock, Roster, SearchConfig};
use roster_storage::{
    DurableStore, EditableFields, FileStore, MemoryStore, Person, PersonId, StoreConfig,
    SyncStatus,
};
use roster_sync_engine::wire::{self, UploadRequest, UploadResponse, WirePerson};
use roster_sync_engine::{
    Admission, HttpTransport, RemoteTransport, Session, SyncConfig, SyncEngine, SyncEvent,
    SyncResult,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const EDITOR: PersonId = PersonId(30477380);
const MEMBER: PersonId = PersonId(30453355);

/// A transport backed by an in-memory sheet that speaks the wire format.
struct SheetTransport {
    rows: Mutex<Vec<WirePerson>>,
    accept: AtomicBool,
    delay: Duration,
    fetches: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl SheetTransport {
    fn new(rows: Vec<WirePerson>) -> Self {
        Self {
            rows: Mutex::new(rows),
            accept: AtomicBool::new(true),
            delay: Duration::ZERO,
            fetches: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn set_accept(&self, accept: bool) {
        self.accept.store(accept, Ordering::SeqCst);
    }

    fn row(&self, id: PersonId) -> Option<WirePerson> {
        self.rows.lock().iter().find(|r| r.id == id.get()).cloned()
    }

    async fn enter(&self) {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn exit(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RemoteTransport for SheetTransport {
    async fn fetch_people(&self) -> SyncResult<Vec<Person>> {
        self.enter().await;
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let body = {
            let rows = self.rows.lock();
            serde_json::to_vec(&serde_json::json!({ "people": *rows })).unwrap()
        };
        self.exit();
        wire::decode_dataset(&body)
    }

    async fn push_updates(&self, request: &UploadRequest) -> SyncResult<UploadResponse> {
        self.enter().await;
        let body = serde_json::to_vec(request).unwrap();
        let request: UploadRequest = serde_json::from_slice(&body).unwrap();
        let accepted = self.accept.load(Ordering::SeqCst);
        if accepted {
            let mut rows = self.rows.lock();
            for update in request.updates {
                if let Some(row) = rows.iter_mut().find(|r| r.id == update.id) {
                    row.credential_level = update.credential_level;
                    row.training = update.training;
                    row.contact = update.contact;
                    row.is_updated = update.is_updated;
                }
            }
        }
        self.exit();
        Ok(UploadResponse::new(accepted))
    }

    fn is_connected(&self) -> bool {
        true
    }
}

fn sheet_rows() -> Vec<WirePerson> {
    vec![
        WirePerson::from(&Person::new(EDITOR, "Ali Asgar").with_seating("1", "C", "14")),
        WirePerson::from(
            &Person::new(MEMBER, "Fatema").with_seating("2", "A", "3").with_fields(
                EditableFields {
                    credential_level: "Hafiz".into(),
                    training: String::new(),
                    contact: "555-0100".into(),
                },
                false,
            ),
        ),
    ]
}

fn draft(contact: &str) -> EditableFields {
    EditableFields {
        credential_level: "No Sanad".into(),
        training: "Yes".into(),
        contact: contact.into(),
    }
}

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 20, 15, 0).unwrap(),
    ))
}

fn engine<S: DurableStore>(
    store: Arc<S>,
    sheet: Arc<SheetTransport>,
) -> Arc<SyncEngine<SheetTransport, S>> {
    let roster = Arc::new(Roster::new(store, clock(), SearchConfig::default()));
    Arc::new(SyncEngine::new(
        SyncConfig::new("https://sheet.example.com/exec"),
        sheet,
        roster,
    ))
}

#[tokio::test]
async fn first_login_fetches_once_then_admits_dataset_members() {
    let sheet = Arc::new(SheetTransport::new(sheet_rows()));
    let store = Arc::new(MemoryStore::new(
        StoreConfig::default().seed_allowed([EDITOR.get()]),
    ));
    let session = Session::new(engine(store, Arc::clone(&sheet)), vec![EDITOR]);

    assert!(session.login(MEMBER).await.is_err());
    session.login(EDITOR).await.unwrap();
    assert_eq!(sheet.fetches.load(Ordering::SeqCst), 1);

    session.logout().unwrap();
    session.login(MEMBER).await.unwrap();
    assert_eq!(sheet.fetches.load(Ordering::SeqCst), 1);
    session.logout().unwrap();
}

#[tokio::test]
async fn rejected_upload_reverts_local_edit_and_keeps_queue() {
    let sheet = Arc::new(SheetTransport::new(sheet_rows()));
    let store = Arc::new(MemoryStore::new(StoreConfig::default()));
    let body = serde_json::to_vec(&sheet_rows()).unwrap();
    store
        .replace_all_people(wire::decode_dataset(&body).unwrap())
        .unwrap();
    let engine = engine(Arc::clone(&store), Arc::clone(&sheet));

    let queued = engine.roster().save_edit(MEMBER, draft("12345")).unwrap();
    assert_eq!(engine.roster().search("fatema").unwrap()[0].fields.contact, "12345");

    sheet.set_accept(false);
    let result = engine.perform_sync(EDITOR).await;

    assert!(result.success);
    let person = store.get_person(MEMBER).unwrap().unwrap();
    assert_eq!(person.fields.contact, "555-0100");
    assert!(!person.updated);
    assert_eq!(store.get_all_pending_edits().unwrap(), vec![queued]);
    assert_eq!(engine.roster().search("fatema").unwrap()[0].fields.contact, "555-0100");
}

#[tokio::test]
async fn accepted_upload_round_trips_through_sheet() {
    let sheet = Arc::new(SheetTransport::new(sheet_rows()));
    let store = Arc::new(MemoryStore::new(StoreConfig::default()));
    let engine = engine(Arc::clone(&store), Arc::clone(&sheet));
    let mut events = engine.events().subscribe();

    engine.perform_sync(EDITOR).await;
    engine.roster().save_edit(MEMBER, draft(" 12345 ")).unwrap();
    let result = engine.sync_now(EDITOR).await;

    assert!(result.success);
    assert_eq!(result.uploaded, 1);
    let row = sheet.row(MEMBER).unwrap();
    assert_eq!(row.contact, "12345");
    assert_eq!(row.credential_level, "No Sanad");
    assert_eq!(row.training, "Yes");
    assert!(row.is_updated);

    assert_eq!(store.pending_edit_count().unwrap(), 0);
    assert!(store.get_person(MEMBER).unwrap().unwrap().updated);

    let statuses: Vec<SyncStatus> = std::iter::from_fn(|| events.receiver.try_recv().ok())
        .map(|e: SyncEvent| e.status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            SyncStatus::Syncing,
            SyncStatus::Success,
            SyncStatus::Syncing,
            SyncStatus::Success
        ]
    );
    assert_eq!(
        engine.events().last_event().unwrap().message,
        "Synced at 20:15:00"
    );
}

#[tokio::test]
async fn search_reflects_sync_without_waiting_for_freshness() {
    let sheet = Arc::new(SheetTransport::new(sheet_rows()));
    let store = Arc::new(MemoryStore::new(StoreConfig::default()));
    let engine = engine(Arc::clone(&store), Arc::clone(&sheet));

    assert!(engine.roster().search("77380").unwrap().is_empty());
    engine.perform_sync(EDITOR).await;

    let hits = engine.roster().search("77380").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, EDITOR);
    assert_eq!(engine.roster().search("ROW c").unwrap().len(), 0);
    assert_eq!(engine.roster().search("c").unwrap()[0].id, EDITOR);
}

#[tokio::test(start_paused = true)]
async fn concurrent_attempts_are_serialized() {
    let sheet = Arc::new(SheetTransport::new(sheet_rows()).with_delay(Duration::from_secs(2)));
    let store = Arc::new(MemoryStore::new(StoreConfig::default()));
    let engine = engine(store, Arc::clone(&sheet));
    engine.roster().save_edit(MEMBER, draft("12345")).ok();

    let (scheduled, manual) = tokio::join!(engine.perform_sync(EDITOR), engine.sync_now(EDITOR));

    assert!(scheduled.success);
    assert!(manual.success);
    assert_eq!(sheet.max_active.load(Ordering::SeqCst), 1);
    assert_eq!(sheet.fetches.load(Ordering::SeqCst), 2);
    assert_eq!(engine.stats().attempts, 2);
}

#[tokio::test]
async fn file_store_keeps_synced_state_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = Arc::new(SheetTransport::new(sheet_rows()));

    {
        let store = Arc::new(FileStore::open(dir.path(), StoreConfig::default()).unwrap());
        let engine = engine(store, Arc::clone(&sheet));
        engine.perform_sync(EDITOR).await;
        engine.roster().save_edit(MEMBER, draft("777")).unwrap();
        sheet.set_accept(false);
        engine.perform_sync(EDITOR).await;
    }

    let store = FileStore::open(dir.path(), StoreConfig::default()).unwrap();
    assert_eq!(store.people_count().unwrap(), 2);
    assert_eq!(store.pending_edit_count().unwrap(), 1);
    assert_eq!(store.get_all_pending_edits().unwrap()[0].fields.contact, "777");
    let meta = store.get_sync_meta().unwrap();
    assert_eq!(meta.status, SyncStatus::Success);
    assert!(meta.last_sync.is_some());
    assert_eq!(store.get_allowed().unwrap(), vec![EDITOR, MEMBER]);
}

#[tokio::test]
async fn unreachable_endpoint_closes_connectivity_gate() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let config = SyncConfig::new(format!("http://127.0.0.1:{port}/exec"))
        .with_timeout(Duration::from_secs(5));
    let transport = Arc::new(HttpTransport::new(&config).unwrap());
    let store = Arc::new(MemoryStore::new(StoreConfig::default()));
    let roster = Arc::new(Roster::new(store, clock(), SearchConfig::default()));
    let engine = SyncEngine::new(config, transport, roster);
    assert_eq!(engine.admission(None), Admission::Admitted);

    let result = engine.perform_sync(EDITOR).await;

    assert!(!result.success);
    assert_eq!(engine.admission(None), Admission::Offline);
    assert_eq!(engine.check_admission(None).await, Admission::Offline);
    assert!(!engine.sync_now(EDITOR).await.success);
    assert_eq!(engine.stats().attempts, 1);
}
