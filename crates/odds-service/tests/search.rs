//! Routing and status mapping for the search and listing endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{app, get};
use odds_lib::test_utils::{odds_record, FakeStore};
use odds_service_shared::StatusMode;

fn sample_store() -> FakeStore {
    FakeStore::new(vec![
        odds_record("evt1", "moneyline", &[("Lakers", "-150"), ("Celtics", "+130")]),
        odds_record("evt1", "totals", &[("Over", "1.91"), ("Under", "1.91")]),
        odds_record("evt2", "moneyline", &[("Nets", "2.40"), ("Knicks", "1.60")]),
        odds_record("evt3", "spreads", &[("Heat", "1.95")]),
    ])
}

#[tokio::test]
async fn search_without_parameters_is_bad_request() {
    let app = app(sample_store(), StatusMode::Time);
    let (status, _, body) = get(&app.router, "/jalcanta/search").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "400 Bad Request");
    assert_eq!(app.store.total_calls(), 0);
}

#[tokio::test]
async fn search_with_empty_parameters_is_bad_request() {
    let app = app(sample_store(), StatusMode::Time);
    let (status, _, body) = get(&app.router, "/jalcanta/search?id=&key=").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "400 Bad Request");
}

#[tokio::test]
async fn search_with_invalid_id_never_touches_store() {
    let app = app(sample_store(), StatusMode::Time);
    for uri in [
        "/jalcanta/search?id=evt-1",
        "/jalcanta/search?id=evt%201",
        "/jalcanta/search?id=evt1%27%3B",
    ] {
        let (status, _, body) = get(&app.router, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, "400 Bad Request");
    }
    assert_eq!(app.store.total_calls(), 0);
}

#[tokio::test]
async fn search_with_digit_in_key_is_bad_request() {
    let app = app(sample_store(), StatusMode::Time);
    let (status, _, _) = get(&app.router, "/jalcanta/search?key=h2h").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.total_calls(), 0);
}

#[tokio::test]
async fn search_with_repeated_parameter_is_bad_request() {
    let app = app(sample_store(), StatusMode::Time);
    let (status, _, body) = get(&app.router, "/jalcanta/search?id=evt1&id=evt2").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "400 Bad Request");
    assert_eq!(app.store.total_calls(), 0);
}

#[tokio::test]
async fn search_for_unknown_id_is_not_found() {
    let app = app(sample_store(), StatusMode::Time);
    let (status, _, body) = get(&app.router, "/jalcanta/search?id=abc123").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "404 Page Not Found");
    assert_eq!(app.store.query_calls(), 1);
    assert_eq!(app.store.scan_calls(), 0);
}

#[tokio::test]
async fn search_by_key_returns_matching_items() {
    let app = app(sample_store(), StatusMode::Time);
    let (status, content_type, body) = get(&app.router, "/jalcanta/search?key=moneyline").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));

    let items: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        items,
        json!([
            {
                "id": "evt1",
                "key": "moneyline",
                "outcomes": [
                    {"name": "Lakers", "price": "-150"},
                    {"name": "Celtics", "price": "+130"}
                ]
            },
            {
                "id": "evt2",
                "key": "moneyline",
                "outcomes": [
                    {"name": "Nets", "price": "2.40"},
                    {"name": "Knicks", "price": "1.60"}
                ]
            }
        ])
    );
    assert_eq!(app.store.scan_calls(), 1);
    assert_eq!(app.store.query_calls(), 0);
}

#[tokio::test]
async fn search_by_id_uses_indexed_query() {
    let app = app(sample_store(), StatusMode::Time);
    let (status, _, body) = get(&app.router, "/jalcanta/search?id=evt1").await;

    assert_eq!(status, StatusCode::OK);
    let items: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(app.store.query_calls(), 1);
    assert_eq!(app.store.scan_calls(), 0);
}

#[tokio::test]
async fn search_by_id_and_key_narrows_results() {
    let app = app(sample_store(), StatusMode::Time);
    let (status, _, body) = get(&app.router, "/jalcanta/search?id=evt1&key=totals").await;

    assert_eq!(status, StatusCode::OK);
    let items: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["key"], "totals");
    assert_eq!(app.store.scan_calls(), 0);
}

#[tokio::test]
async fn repeated_search_returns_identical_response() {
    let app = app(sample_store(), StatusMode::Time);
    let first = get(&app.router, "/jalcanta/search?key=moneyline").await;
    let second = get(&app.router, "/jalcanta/search?key=moneyline").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn search_store_failure_is_server_error() {
    let app = app(FakeStore::failing("ThrottlingException: rate exceeded"), StatusMode::Time);
    let (status, _, body) = get(&app.router, "/jalcanta/search?key=totals").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Scan failed: ThrottlingException: rate exceeded");
}

#[tokio::test]
async fn malformed_record_fails_entire_response() {
    let mut bad = odds_record("evt9", "moneyline", &[]);
    bad.remove("key");
    let store = FakeStore::new(vec![odds_record("evt9", "totals", &[]), bad]);
    let app = app(store, StatusMode::Time);

    let (status, _, body) = get(&app.router, "/jalcanta/search?id=evt9").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.starts_with("failed to decode record 1"));
    assert!(!body.contains("totals"));
}

#[tokio::test]
async fn all_returns_every_item() {
    let app = app(sample_store(), StatusMode::Time);
    let (status, content_type, body) = get(&app.router, "/jalcanta/all").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let items: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(items.len(), 4);
}

#[tokio::test]
async fn all_on_empty_table_is_empty_array() {
    let app = app(FakeStore::new(Vec::new()), StatusMode::Time);
    let (status, _, body) = get(&app.router, "/jalcanta/all").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn all_store_failure_returns_store_error_text() {
    let app = app(FakeStore::failing("AccessDeniedException"), StatusMode::Time);
    let (status, _, body) = get(&app.router, "/jalcanta/all").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Scan failed: AccessDeniedException");
}
