#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use odds_lib::test_utils::FakeStore;
use odds_service::build_router;
use odds_service_shared::test_utils::RecordingSink;
use odds_service_shared::{AppState, StatusMode};

pub const SINK_TIMEOUT: Duration = Duration::from_secs(1);

pub struct TestApp {
    pub router: Router,
    pub store: Arc<FakeStore>,
    pub sink: Arc<RecordingSink>,
}

pub fn app(store: FakeStore, mode: StatusMode) -> TestApp {
    let store = Arc::new(store);
    let sink = Arc::new(RecordingSink::new());
    let state = AppState::new(store.clone(), mode);
    TestApp {
        router: build_router(state, sink.clone(), SINK_TIMEOUT),
        store,
        sink,
    }
}

pub fn peer() -> SocketAddr {
    SocketAddr::from(([203, 0, 113, 7], 51234))
}

/// Send a GET request as if it arrived from [`peer`].
pub async fn get(router: &Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let mut request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    request.extensions_mut().insert(ConnectInfo(peer()));

    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (
        status,
        content_type,
        String::from_utf8(bytes.to_vec()).expect("utf-8 body"),
    )
}
