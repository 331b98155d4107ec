//! The `/status` operation.
//!
//! One handler covers both behaviors; [`StatusMode`] picks which at startup.

use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use odds_lib::{table_status, TableStatus};
use serde::{Deserialize, Serialize};

use crate::config::StatusMode;
use crate::response::ApiError;
use crate::AppState;

/// Body of a successful status response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusBody {
    Time { system_time: String },
    Table(TableStatus),
}

impl StatusBody {
    /// Current UTC time in RFC 3339 with second precision.
    pub fn now() -> Self {
        StatusBody::Time {
            system_time: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Handle `GET /status` and `GET /jalcanta/status`.
pub async fn status_handler(State(state): State<AppState>) -> Result<Json<StatusBody>, ApiError> {
    match state.status_mode() {
        StatusMode::Time => Ok(Json(StatusBody::now())),
        StatusMode::Table => {
            let status = table_status(state.store()).await?;
            Ok(Json(StatusBody::Table(status)))
        }
    }
}
