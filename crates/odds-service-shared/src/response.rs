//! Mapping of planner outcomes onto HTTP responses.
//!
//! | Outcome | Status | Body |
//! |---|---|---|
//! | invalid or missing search input | 400 | `400 Bad Request` |
//! | no matching records | 404 | `404 Page Not Found` |
//! | store or decode failure | 500 | error text |
//! | recovered panic | 500 | `500 Internal Server Error` |
//!
//! Successful responses are plain [`axum::Json`], which sets
//! `Content-Type: application/json`.

use std::any::Any;

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use odds_lib::Error as LibError;

pub const BAD_REQUEST_BODY: &str = "400 Bad Request";
pub const NOT_FOUND_BODY: &str = "404 Page Not Found";
pub const FAULT_BODY: &str = "500 Internal Server Error";

/// Error responses produced by the handlers and the fault-recovery layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest,
    NotFound,
    /// Server-side failure; the text is returned to the client.
    Internal(String),
    /// A handler panicked. Details stay in the process log.
    FaultRecovered,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) | ApiError::FaultRecovered => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> String {
        match self {
            ApiError::BadRequest => BAD_REQUEST_BODY.to_string(),
            ApiError::NotFound => NOT_FOUND_BODY.to_string(),
            ApiError::Internal(detail) => detail.clone(),
            ApiError::FaultRecovered => FAULT_BODY.to_string(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status(), self.body())
    }
}

impl std::error::Error for ApiError {}

impl From<LibError> for ApiError {
    fn from(err: LibError) -> Self {
        match err {
            LibError::Validation(e) => {
                tracing::debug!(error = %e, "rejected search input");
                ApiError::BadRequest
            }
            LibError::MissingSearchParameters => {
                tracing::debug!("search without parameters");
                ApiError::BadRequest
            }
            LibError::NotFound => ApiError::NotFound,
            LibError::Decode { .. } => ApiError::Internal(err.to_string()),
            LibError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<odds_lib::StoreError> for ApiError {
    fn from(err: odds_lib::StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), self.body()).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }
}

/// Panic handler for `tower_http::catch_panic::CatchPanicLayer`.
///
/// The panic payload is logged; the client only sees a generic 500.
pub fn recover_fault(payload: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "handler panicked, fault recovered");
    ApiError::FaultRecovered.into_response()
}
