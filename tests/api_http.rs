// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot, with a
// scripted upstream and snapshot files in a temp dir.
//
// Covered:
// - GET /health
// - GET /dummydata, /testdata (saved snapshots, byte for byte)
// - GET /data, /stocktwits (live fetch + snapshot write)
// - rate limit → 500, no snapshot
// - GET /aggregate, /random

use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use cashtag_trends::config::AppConfig;
use cashtag_trends::upstream::mock::{page_of, ScriptedSource};
use cashtag_trends::upstream::{Message, Page};
use cashtag_trends::{router, AppState};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

fn cfg_in(dir: &Path) -> AppConfig {
    AppConfig {
        data_snapshot: dir.join("test_data.json"),
        stocktwits_snapshot: dir.join("new_data.json"),
        static_data: dir.join("public/data/static.json"),
        test_data: dir.join("public/data/test_data.json"),
        ..AppConfig::default()
    }
}

fn app_with(source: Arc<ScriptedSource>, cfg: &AppConfig) -> Router {
    router(AppState::with_source(source, cfg))
}

fn seed(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn msg(ticker: &str, title: &str) -> Message {
    Message::with_symbols([(ticker, title)])
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

#[tokio::test]
async fn health_returns_ok() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app_with(Arc::new(ScriptedSource::new(vec![])), &cfg_in(tmp.path()));

    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), "ok");
}

#[tokio::test]
async fn static_route_returns_fixture_unmodified() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = cfg_in(tmp.path());
    let fixture = fs::read_to_string("tests/fixtures/static.json").expect("fixture");
    seed(&cfg.static_data, &fixture);

    let app = app_with(Arc::new(ScriptedSource::new(vec![])), &cfg);
    let (status, body) = get(app, "/dummydata").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), fixture);
}

#[tokio::test]
async fn testdata_routes_serve_the_same_file() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = cfg_in(tmp.path());
    seed(&cfg.test_data, r#"[{"id": 1}]"#);

    let source = Arc::new(ScriptedSource::new(vec![]));
    for uri in ["/testdata", "/stocktwits/testdata"] {
        let (status, body) = get(app_with(source.clone(), &cfg), uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        let v: Json = serde_json::from_slice(&body).unwrap();
        assert_eq!(v, serde_json::json!([{"id": 1}]), "{uri}");
    }
    assert_eq!(source.request_count(), 0, "saved routes never hit upstream");
}

#[tokio::test]
async fn missing_snapshot_is_a_500() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app_with(Arc::new(ScriptedSource::new(vec![])), &cfg_in(tmp.path()));

    let (status, _) = get(app, "/dummydata").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn live_route_concatenates_pages_and_writes_snapshot() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = cfg_in(tmp.path());
    let source = Arc::new(ScriptedSource::new(vec![
        page_of(vec![msg("AAPL", "Apple Inc.")], Some("c1")),
        page_of(vec![msg("TSLA", "Tesla Inc.")], Some("c2")),
        page_of(vec![msg("AAPL", "Apple Inc.")], Some("c3")),
        page_of(vec![msg("SPY", "SPDR S&P 500")], Some("c4")),
    ]));

    let (status, body) = get(app_with(source.clone(), &cfg), "/stocktwits").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(source.request_count(), 4);

    let got: Vec<Message> = serde_json::from_slice(&body).unwrap();
    let tickers: Vec<_> = got
        .iter()
        .map(|m| m.symbols.as_ref().unwrap()[0].symbol.clone().unwrap())
        .collect();
    assert_eq!(tickers, vec!["AAPL", "TSLA", "AAPL", "SPY"]);

    let saved: Vec<Message> =
        serde_json::from_str(&fs::read_to_string(&cfg.stocktwits_snapshot).unwrap()).unwrap();
    assert_eq!(saved, got);
    assert!(!cfg.data_snapshot.exists(), "/stocktwits only writes its own file");
}

#[tokio::test]
async fn rate_limited_fetch_is_500_and_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = cfg_in(tmp.path());
    let source = Arc::new(ScriptedSource::new(vec![
        page_of(vec![msg("AAPL", "Apple Inc.")], Some("c1")),
        Page::rate_limited(),
    ]));

    let (status, body) = get(app_with(source.clone(), &cfg), "/data").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let text = String::from_utf8(body).unwrap();
    assert!(text.starts_with("Rate limit exceeded"), "got {text}");
    assert_eq!(source.request_count(), 2);
    assert!(!cfg.data_snapshot.exists());
}

#[tokio::test]
async fn aggregate_saved_dataset_sorted_by_count() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = cfg_in(tmp.path());
    seed(
        &cfg.static_data,
        &fs::read_to_string("tests/fixtures/static.json").unwrap(),
    );

    let app = app_with(Arc::new(ScriptedSource::new(vec![])), &cfg);
    let (status, body) = get(app, "/aggregate?dataset=dummy&sort=count").await;
    assert_eq!(status, StatusCode::OK);

    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        v["records"],
        serde_json::json!([
            {"name": "AAPL", "count": 2, "title": "Apple Inc."},
            {"name": "TSLA", "count": 1, "title": "Tesla Motors, Inc."}
        ])
    );
    assert_eq!(v["stats"]["messageCount"], 3);
    assert_eq!(v["stats"]["minDate"], "2017-03-21T14:58:41Z");
    assert_eq!(v["stats"]["maxDate"], "2017-03-21T15:30:00Z");
}

#[tokio::test]
async fn aggregate_live_dataset_uses_fetcher() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = AppConfig {
        max_iterations: 1,
        ..cfg_in(tmp.path())
    };
    let source = Arc::new(ScriptedSource::new(vec![
        page_of(vec![msg("GME", "GameStop")], Some("c1")),
        page_of(vec![msg("GME", "GameStop")], Some("c2")),
    ]));

    let (status, body) = get(app_with(source.clone(), &cfg), "/aggregate?dataset=live").await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["records"][0]["count"], 2);
    assert_eq!(source.request_count(), 2);
    assert!(cfg.data_snapshot.exists());
}

#[tokio::test]
async fn random_route_shapes_records() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app_with(Arc::new(ScriptedSource::new(vec![])), &cfg_in(tmp.path()));

    let (status, body) = get(app, "/random").await;
    assert_eq!(status, StatusCode::OK);
    let arr: Vec<Json> = serde_json::from_slice(&body).unwrap();
    assert!(arr.len() >= 50);
    assert!(arr
        .iter()
        .all(|r| r["name"].is_string() && r["count"].is_u64() && r["title"].is_string()));
}

#[tokio::test]
async fn aggregate_skips_malformed_snapshot_entries() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = cfg_in(tmp.path());
    seed(
        &cfg.test_data,
        r#"[
            {"id": 1, "created_at": 1490110200, "symbols": [null, {"symbol": 42}, {"symbol": "AAPL", "title": "Apple Inc."}]},
            null,
            {"id": 2, "created_at": "2017-03-21T15:30:00Z", "symbols": [{"symbol": "AAPL", "title": "Apple Inc."}]}
        ]"#,
    );

    let app = app_with(Arc::new(ScriptedSource::new(vec![])), &cfg);
    let (status, body) = get(app, "/aggregate?dataset=test").await;
    assert_eq!(status, StatusCode::OK);

    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        v["records"],
        serde_json::json!([{"name": "AAPL", "count": 2, "title": "Apple Inc."}])
    );
    assert_eq!(v["stats"]["messageCount"], 2);
    assert_eq!(v["stats"]["minDate"], "2017-03-21T15:30:00Z");
}
