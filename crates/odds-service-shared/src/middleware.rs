//! Request logging and fault recovery for every route.
//!
//! This module provides:
//! - [`RequestId`]: Correlation ID taken from `X-Request-ID` or generated as UUID v7
//! - [`AccessLogLayer`]: Tower middleware emitting exactly one [`LogEntry`] per request
//! - [`instrument`]: Wraps a router with fault recovery and access logging
//!
//! # Exit paths
//!
//! The access entry is emitted when the inner service completes (any status),
//! when it returns an error (recorded as 500), and when the response future is
//! dropped before completing (recorded as 499). A panicking handler is turned
//! into a 500 by the inner `CatchPanicLayer`, so it is logged like any other
//! completed request.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request, Response};
use axum::Router;
use pin_project_lite::pin_project;
use tower::{Layer, Service};
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{info_span, Span};
use uuid::Uuid;

use crate::response::recover_fault;
use crate::sink::{dispatch, LogEntry, LogSink};

/// Status recorded when the client goes away before a response is produced.
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Source recorded when the peer address is unknown.
pub const UNKNOWN_SOURCE: &str = "-";

/// Newtype wrapper for request correlation IDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new UUID v7 request ID.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the `X-Request-ID` header, or generate a new ID when it is
/// missing, empty, or not valid UTF-8.
pub fn extract_or_generate_request_id(headers: &HeaderMap) -> RequestId {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| RequestId(s.to_string()))
        .unwrap_or_else(RequestId::generate)
}

fn status_bucket(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

/// Wrap `router` with fault recovery and access logging.
///
/// Panics are converted to 500 responses inside the logging layer, so the
/// logged status is the status the client received.
pub fn instrument(router: Router, sink: Arc<dyn LogSink>, sink_timeout: Duration) -> Router {
    router
        .layer(CatchPanicLayer::custom(recover_fault))
        .layer(AccessLogLayer::new(sink, sink_timeout))
}

/// Tower layer that sends one access-log entry per request to a [`LogSink`].
#[derive(Clone)]
pub struct AccessLogLayer {
    sink: Arc<dyn LogSink>,
    timeout: Duration,
}

impl AccessLogLayer {
    pub fn new(sink: Arc<dyn LogSink>, timeout: Duration) -> Self {
        Self { sink, timeout }
    }
}

impl<S> Layer<S> for AccessLogLayer {
    type Service = AccessLog<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AccessLog {
            inner,
            sink: self.sink.clone(),
            timeout: self.timeout,
        }
    }
}

/// Middleware service created by [`AccessLogLayer`].
#[derive(Clone)]
pub struct AccessLog<S> {
    inner: S,
    sink: Arc<dyn LogSink>,
    timeout: Duration,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for AccessLog<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = AccessLogFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let source_ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string())
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());
        let request_id = extract_or_generate_request_id(req.headers());

        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %method,
            path = %path,
            source = %source_ip,
        );
        let inner = {
            let _enter = span.enter();
            self.inner.call(req)
        };

        AccessLogFuture {
            inner,
            pending: Some(PendingEntry {
                method,
                source_ip,
                path,
                start: Instant::now(),
                sink: self.sink.clone(),
                timeout: self.timeout,
            }),
            span,
        }
    }
}

/// Request metadata held until the final status is known.
struct PendingEntry {
    method: String,
    source_ip: String,
    path: String,
    start: Instant,
    sink: Arc<dyn LogSink>,
    timeout: Duration,
}

impl PendingEntry {
    fn finish(self, status: u16) {
        let elapsed = self.start.elapsed();

        metrics::counter!(
            "http_requests_total",
            "method" => self.method.clone(),
            "path" => self.path.clone(),
            "status" => status_bucket(status)
        )
        .increment(1);
        metrics::histogram!(
            "http_request_duration_seconds",
            "method" => self.method.clone(),
            "path" => self.path.clone()
        )
        .record(elapsed.as_secs_f64());

        tracing::info!(
            status,
            latency_ms = elapsed.as_secs_f64() * 1000.0,
            "request completed"
        );

        dispatch(
            self.sink,
            LogEntry {
                method: self.method,
                source_ip: self.source_ip,
                path: self.path,
                status,
            },
            self.timeout,
        );
    }
}

pin_project! {
    /// Response future that emits the access entry exactly once.
    pub struct AccessLogFuture<F> {
        #[pin]
        inner: F,
        pending: Option<PendingEntry>,
        span: Span,
    }

    impl<F> PinnedDrop for AccessLogFuture<F> {
        fn drop(this: Pin<&mut Self>) {
            let this = this.project();
            if let Some(pending) = this.pending.take() {
                let _enter = this.span.enter();
                tracing::debug!("request cancelled before completion");
                pending.finish(CLIENT_CLOSED_REQUEST);
            }
        }
    }
}

impl<F, ResBody, E> Future for AccessLogFuture<F>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let _enter = this.span.enter();

        let result = match this.inner.poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(result) => result,
        };

        let status = match &result {
            Ok(response) => response.status().as_u16(),
            Err(_) => 500,
        };
        if let Some(pending) = this.pending.take() {
            pending.finish(status);
        }

        Poll::Ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingSink;
    use axum::http::{HeaderValue, StatusCode};
    use std::convert::Infallible;

    fn request(path: &str) -> Request<()> {
        Request::builder().uri(path).body(()).unwrap()
    }

    #[tokio::test]
    async fn test_completed_request_logs_final_status() {
        let sink = Arc::new(RecordingSink::new());
        let mut svc = AccessLogLayer::new(sink.clone(), Duration::from_secs(1)).layer(
            tower::service_fn(|_req: Request<()>| async {
                let mut response = Response::new(());
                *response.status_mut() = StatusCode::NOT_FOUND;
                Ok::<_, Infallible>(response)
            }),
        );

        let response = svc.call(request("/jalcanta/search")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let entries = sink.wait_for(1).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, 404);
        assert_eq!(entries[0].source_ip, UNKNOWN_SOURCE);
    }

    #[tokio::test]
    async fn test_inner_error_logged_as_500() {
        let sink = Arc::new(RecordingSink::new());
        let mut svc = AccessLogLayer::new(sink.clone(), Duration::from_secs(1)).layer(
            tower::service_fn(|_req: Request<()>| async { Err::<Response<()>, _>("broken") }),
        );

        assert!(svc.call(request("/jalcanta/all")).await.is_err());
        assert_eq!(sink.wait_for(1).await[0].status, 500);
    }

    #[tokio::test]
    async fn test_dropped_request_logs_client_closed() {
        let sink = Arc::new(RecordingSink::new());
        let mut svc = AccessLogLayer::new(sink.clone(), Duration::from_secs(1)).layer(
            tower::service_fn(|_req: Request<()>| {
                std::future::pending::<Result<Response<()>, Infallible>>()
            }),
        );

        let future = svc.call(request("/jalcanta/all"));
        drop(future);

        let entries = sink.wait_for(1).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, CLIENT_CLOSED_REQUEST);
        assert_eq!(entries[0].path, "/jalcanta/all");
    }

    #[test]
    fn test_request_id_generate_is_unique_uuid() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_extract_request_id_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Request-ID", HeaderValue::from_static("req-42"));
        assert_eq!(extract_or_generate_request_id(&headers).as_str(), "req-42");
    }

    #[test]
    fn test_extract_request_id_generates_when_empty() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static(""));
        assert_eq!(extract_or_generate_request_id(&headers).as_str().len(), 36);
        assert_eq!(
            extract_or_generate_request_id(&HeaderMap::new()).as_str().len(),
            36
        );
    }

    #[test]
    fn test_status_bucket() {
        assert_eq!(status_bucket(200), "2xx");
        assert_eq!(status_bucket(304), "3xx");
        assert_eq!(status_bucket(404), "4xx");
        assert_eq!(status_bucket(CLIENT_CLOSED_REQUEST), "4xx");
        assert_eq!(status_bucket(500), "5xx");
        assert_eq!(status_bucket(42), "other");
    }
}
