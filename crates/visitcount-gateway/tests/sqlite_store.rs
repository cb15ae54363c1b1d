#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use serde_json::Value;

use visitcount_core::error::VisitCountError;
use visitcount_core::protocol::RequestDescriptor;
use visitcount_gateway::app_state::AppState;
use visitcount_gateway::config::{GatewayConfig, StoreBackend};
use visitcount_gateway::store::{self, AttrValue, KvStore, SqliteStore};

const TABLE: &str = "cv-visitor-counter";
const ID: &str = "cv.brtz1.com";

fn sqlite_config(path: &std::path::Path) -> GatewayConfig {
    let mut cfg = GatewayConfig::default();
    cfg.store.backend = StoreBackend::Sqlite;
    cfg.store.path = path.to_string_lossy().into_owned();
    cfg
}

async fn count_of(state: &AppState, method: &str) -> u64 {
    let resp = state
        .handle(&RequestDescriptor::with_transport_method(method))
        .await
        .unwrap();
    let v: Value = serde_json::from_str(&resp.body).unwrap();
    v["count"].as_u64().unwrap()
}

#[tokio::test]
async fn count_survives_rebuilding_state() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = sqlite_config(&dir.path().join("visits.db"));

    {
        let state = AppState::new(cfg.clone(), store::open(&cfg.store).unwrap()).unwrap();
        assert_eq!(count_of(&state, "POST").await, 1);
        assert_eq!(count_of(&state, "POST").await, 2);
        assert_eq!(count_of(&state, "POST").await, 3);
    }

    let state = AppState::new(cfg.clone(), store::open(&cfg.store).unwrap()).unwrap();
    assert_eq!(count_of(&state, "GET").await, 3);
    assert_eq!(count_of(&state, "POST").await, 4);
}

#[tokio::test]
async fn get_on_fresh_database_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("visits.db")).unwrap();
    let cfg = GatewayConfig::default();
    let state = AppState::new(cfg, Arc::new(store)).unwrap();

    assert_eq!(count_of(&state, "GET").await, 0);

    let store = SqliteStore::open(dir.path().join("visits.db")).unwrap();
    assert!(store.get(TABLE, ID).await.unwrap().is_none());
}

#[tokio::test]
async fn atomic_add_creates_record_with_key() {
    let store = SqliteStore::open_in_memory().unwrap();

    assert_eq!(store.atomic_add(TABLE, ID, "count", 1, 0).await.unwrap(), 1);
    assert_eq!(store.atomic_add(TABLE, ID, "count", 5, 0).await.unwrap(), 6);
    assert_eq!(store.atomic_add(TABLE, "other", "count", 1, 10).await.unwrap(), 11);

    let record = store.get(TABLE, ID).await.unwrap().unwrap();
    assert_eq!(record.get("id"), Some(&AttrValue::Str(ID.into())));
    assert_eq!(record.get("count"), Some(&AttrValue::Num(6)));
    assert_eq!(record.len(), 2);

    assert!(store.get("another-table", ID).await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_adds_are_not_lost() {
    const N: u64 = 100;
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn KvStore> =
        Arc::new(SqliteStore::open(dir.path().join("visits.db")).unwrap());

    let tasks: Vec<_> = (0..N)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store.atomic_add(TABLE, ID, "count", 1, 0).await.unwrap()
            })
        })
        .collect();

    let mut seen = Vec::with_capacity(N as usize);
    for t in tasks {
        seen.push(t.await.unwrap());
    }
    seen.sort_unstable();
    assert_eq!(seen, (1..=N).collect::<Vec<_>>());
}

#[tokio::test]
async fn two_handles_on_one_file_share_the_counter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("visits.db");
    let a = SqliteStore::open(&path).unwrap();
    let b = SqliteStore::open(&path).unwrap();

    for _ in 0..5 {
        a.atomic_add(TABLE, ID, "count", 1, 0).await.unwrap();
        b.atomic_add(TABLE, ID, "count", 1, 0).await.unwrap();
    }
    let record = a.get(TABLE, ID).await.unwrap().unwrap();
    assert_eq!(record.get("count"), Some(&AttrValue::Num(10)));
}

#[tokio::test]
async fn non_numeric_field_is_malformed() {
    let store = SqliteStore::open_in_memory().unwrap();

    store.atomic_add(TABLE, ID, "count", 1, 0).await.unwrap();

    // `id` was written as a string when the record was created.
    let err = store
        .atomic_add(TABLE, ID, "id", 1, 0)
        .await
        .expect_err("must fail");
    assert!(matches!(err, VisitCountError::MalformedRecord(_)));
}

#[tokio::test]
async fn overflow_is_an_error() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .atomic_add(TABLE, ID, "count", i64::MAX as u64, 0)
        .await
        .unwrap();
    let err = store
        .atomic_add(TABLE, ID, "count", 1, 0)
        .await
        .expect_err("must fail");
    assert!(matches!(err, VisitCountError::Store(_)));
    let record = store.get(TABLE, ID).await.unwrap().unwrap();
    assert_eq!(record.get("count"), Some(&AttrValue::Num(i64::MAX as u64)));
}
