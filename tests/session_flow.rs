use std::sync::Arc;

use chrono::{Duration, Utc};
use focusplus::{
    Database, FileStorage, KeyValueStorage, SessionSnapshot, SessionTimerStore, StaticIdentity,
    SNAPSHOT_KEY,
};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    storage: Arc<FileStorage>,
    database: Database,
    identity: Arc<StaticIdentity>,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path().join("storage")).unwrap());
        let database = Database::new(dir.path().join("focusplus.sqlite3")).unwrap();
        let identity = Arc::new(StaticIdentity::signed_in("user-1"));
        Self {
            _dir: dir,
            storage,
            database,
            identity,
        }
    }

    async fn store(&self) -> SessionTimerStore<FileStorage, StaticIdentity, Database> {
        SessionTimerStore::load(
            self.storage.clone(),
            self.identity.clone(),
            Arc::new(self.database.clone()),
        )
        .await
    }
}

#[tokio::test]
async fn full_lifecycle_writes_a_durable_row_and_clears_the_snapshot() {
    let fixture = Fixture::new();
    let store = fixture.store().await;

    store.start("Linear Algebra").await;
    store.pause().await;
    store.resume().await;
    assert!(fixture.storage.get(SNAPSHOT_KEY).unwrap().is_some());

    let record = store.end().await.unwrap().expect("session should save");
    assert_eq!(record.user_id, "user-1");
    assert_eq!(record.subject, "Linear Algebra");
    assert_eq!(record.duration_minutes, 1);

    let rows = fixture.database.list_sessions_for_user("user-1").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, record.id);

    assert!(!store.state().await.is_running);
    assert_eq!(fixture.storage.get(SNAPSHOT_KEY).unwrap(), None);
}

#[tokio::test]
async fn a_new_store_recovers_the_session_a_previous_one_persisted() {
    let fixture = Fixture::new();

    {
        let store = fixture.store().await;
        store.start("Biology").await;
        store.pause().await;
    }

    // Same storage, fresh store: simulates the page reload.
    let store = fixture.store().await;
    let state = store.state().await;
    assert!(state.is_running);
    assert!(state.is_paused);
    assert_eq!(state.subject, "Biology");
}

#[tokio::test]
async fn recovery_counts_the_wall_clock_gap_as_active_time() {
    let fixture = Fixture::new();

    let snapshot = SessionSnapshot {
        is_running: true,
        is_paused: false,
        subject: "History".to_string(),
        start_time: Utc::now() - Duration::seconds(125),
    };
    fixture
        .storage
        .set(SNAPSHOT_KEY, &serde_json::to_string(&snapshot).unwrap())
        .unwrap();

    let store = fixture.store().await;
    let state = store.state().await;
    assert!(state.is_running);
    assert!((124..=126).contains(&state.elapsed_seconds));
}

#[tokio::test]
async fn signed_out_end_leaves_no_rows_and_keeps_the_session() {
    let fixture = Fixture::new();
    let store = fixture.store().await;

    store.start("Chemistry").await;
    fixture.identity.sign_out();

    assert!(store.end().await.unwrap().is_none());
    assert!(store.state().await.is_running);
    assert!(fixture
        .database
        .list_sessions_for_user("user-1")
        .await
        .unwrap()
        .is_empty());

    // Signing back in makes the same end() succeed.
    fixture.identity.sign_in("user-1");
    let record = store.end().await.unwrap().unwrap();
    assert_eq!(record.subject, "Chemistry");
}
