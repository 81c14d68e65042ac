use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use axum::{http::StatusCode as HttpStatus, routing::get, Router};
use shared::domain::Participant;
use tokio::net::TcpListener;

struct StaticFetcher {
    roster: Option<Roster>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    fn ok(names: &[&str]) -> Self {
        Self {
            roster: Some(names.iter().map(|n| Participant::new(*n)).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            roster: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RosterFetcher for StaticFetcher {
    async fn fetch(&self) -> Result<Roster, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.roster
            .clone()
            .ok_or(FetchError::Status(StatusCode::SERVICE_UNAVAILABLE))
    }
}

struct BrokenStore;

#[async_trait]
impl SnapshotStore for BrokenStore {
    async fn read_snapshot(&self, _slot: &str) -> anyhow::Result<Option<String>> {
        Err(anyhow!("disk unavailable"))
    }

    async fn write_snapshot(&self, _slot: &str, _payload: &str) -> anyhow::Result<()> {
        Err(anyhow!("disk unavailable"))
    }

    async fn clear_snapshot(&self, _slot: &str) -> anyhow::Result<bool> {
        Err(anyhow!("disk unavailable"))
    }
}

async fn memory_store() -> Arc<Storage> {
    Arc::new(Storage::new("sqlite::memory:").await.expect("db"))
}

fn names(roster: &Roster) -> Vec<&str> {
    roster.iter().map(|p| p.name.as_str()).collect()
}

async fn spawn_roster_server(status: HttpStatus, body: &'static str) -> (String, Arc<AtomicUsize>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/members.json",
        get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (status, body)
            }
        }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}/members.json"), hits)
}

#[tokio::test]
async fn cold_start_fetches_and_caches_roster() {
    let store = memory_store().await;
    let fetcher = Arc::new(StaticFetcher::ok(&["Alice", "Bob", "Carol"]));
    let cache = RosterCache::new(store.clone(), fetcher.clone());

    let roster = cache.load().await;
    assert_eq!(names(&roster), vec!["Alice", "Bob", "Carol"]);
    assert_eq!(fetcher.calls(), 1);

    let payload = store
        .read_snapshot(ROSTER_SLOT)
        .await
        .expect("read")
        .expect("snapshot written");
    let cached: Roster = serde_json::from_str(&payload).expect("snapshot parses");
    assert_eq!(cached, roster);
}

#[tokio::test]
async fn warm_start_uses_snapshot_without_network() {
    let store = memory_store().await;
    store
        .write_snapshot(ROSTER_SLOT, r#"[{"name":"Dana"}]"#)
        .await
        .expect("seed");
    let fetcher = Arc::new(StaticFetcher::ok(&["Alice"]));
    let cache = RosterCache::new(store, fetcher.clone());

    let roster = cache.load().await;
    assert_eq!(names(&roster), vec!["Dana"]);
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn failing_fetch_with_empty_cache_yields_empty_roster() {
    let store = memory_store().await;
    let fetcher = Arc::new(StaticFetcher::failing());
    let cache = RosterCache::new(store.clone(), fetcher.clone());

    let roster = cache.load().await;
    assert!(roster.is_empty());
    assert_eq!(fetcher.calls(), 1);
    assert!(
        store.read_snapshot(ROSTER_SLOT).await.expect("read").is_none(),
        "failed fetch must not poison the cache"
    );
}

#[tokio::test]
async fn unreadable_snapshot_falls_back_to_fetch_and_is_replaced() {
    let store = memory_store().await;
    store
        .write_snapshot(ROSTER_SLOT, "{not json")
        .await
        .expect("seed");
    let fetcher = Arc::new(StaticFetcher::ok(&["Erin"]));
    let cache = RosterCache::new(store.clone(), fetcher.clone());

    let roster = cache.load().await;
    assert_eq!(names(&roster), vec!["Erin"]);
    assert_eq!(cache.cached().await.expect("replaced"), roster);
}

#[tokio::test]
async fn broken_store_still_returns_fetched_roster() {
    let fetcher = Arc::new(StaticFetcher::ok(&["Frank"]));
    let cache = RosterCache::new(Arc::new(BrokenStore), fetcher);

    let roster = cache.load().await;
    assert_eq!(names(&roster), vec!["Frank"]);
}

#[tokio::test]
async fn refresh_keeps_old_snapshot_when_fetch_fails() {
    let store = memory_store().await;
    store
        .write_snapshot(ROSTER_SLOT, r#"[{"name":"Gina"}]"#)
        .await
        .expect("seed");
    let cache = RosterCache::new(store, Arc::new(StaticFetcher::failing()));

    let err = cache.refresh().await.expect_err("must fail");
    assert!(matches!(err, PickerError::FetchFailure(_)));
    let cached = cache.cached().await.expect("snapshot kept");
    assert_eq!(names(&cached), vec!["Gina"]);
}

#[tokio::test]
async fn invalidate_forces_cold_start() {
    let store = memory_store().await;
    let fetcher = Arc::new(StaticFetcher::ok(&["Hal"]));
    let cache = RosterCache::new(store, fetcher.clone());

    cache.load().await;
    assert!(cache.invalidate().await.expect("invalidate"));
    assert!(!cache.invalidate().await.expect("second invalidate"));
    cache.load().await;
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn http_fetcher_decodes_roster_and_keeps_extra_fields() {
    let (endpoint, hits) = spawn_roster_server(
        HttpStatus::OK,
        r#"[{"name":"Alice","team":"infra"},{"name":"Bob"}]"#,
    )
    .await;
    let fetcher = HttpRosterFetcher::new(endpoint, Duration::from_secs(5)).expect("client");

    let roster = fetcher.fetch().await.expect("fetch");
    assert_eq!(names(&roster), vec!["Alice", "Bob"]);
    assert_eq!(
        roster[0].extra.get("team").and_then(|v| v.as_str()),
        Some("infra")
    );
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn http_fetcher_rejects_error_status() {
    let (endpoint, _hits) = spawn_roster_server(HttpStatus::INTERNAL_SERVER_ERROR, "oops").await;
    let fetcher = HttpRosterFetcher::new(endpoint, Duration::from_secs(5)).expect("client");

    let err = fetcher.fetch().await.expect_err("must fail");
    assert!(matches!(err, FetchError::Status(status) if status.as_u16() == 500));
}

#[tokio::test]
async fn http_fetcher_rejects_wrong_shape() {
    let (endpoint, _hits) = spawn_roster_server(HttpStatus::OK, r#"{"members":[]}"#).await;
    let fetcher = HttpRosterFetcher::new(endpoint, Duration::from_secs(5)).expect("client");
    let err = fetcher.fetch().await.expect_err("object is not a roster");
    assert!(matches!(err, FetchError::Decode(_)));

    let (endpoint, _hits) = spawn_roster_server(HttpStatus::OK, r#"[{"title":"x"}]"#).await;
    let fetcher = HttpRosterFetcher::new(endpoint, Duration::from_secs(5)).expect("client");
    let err = fetcher.fetch().await.expect_err("entries need a name");
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn unreachable_endpoint_degrades_to_empty_roster() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let fetcher =
        HttpRosterFetcher::new(format!("http://{addr}/members.json"), Duration::from_secs(2))
            .expect("client");
    let cache = RosterCache::new(memory_store().await, Arc::new(fetcher));

    assert!(cache.load().await.is_empty());
}
