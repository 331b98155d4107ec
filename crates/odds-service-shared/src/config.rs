//! Service configuration read from the environment at startup.
//!
//! # Environment Variables
//!
//! - `AWS_REGION`: Store region (required)
//! - `ODDS_TABLE_NAME`: Table name (default: `odds`)
//! - `DYNAMODB_ENDPOINT`: Endpoint override (optional)
//! - `SERVICE_PORT`: HTTP port (default: 8080)
//! - `STATUS_MODE`: `time` (default) or `table`
//! - `LOGGLY_TOKEN`: Enables the Loggly access-log sink (optional)
//! - `LOGGLY_TAG`: Loggly tag (default: `loggly-agent`)
//! - `LOG_SINK_TIMEOUT_MS`: Per-entry sink delivery bound (default: 5000)

use std::time::Duration;

use odds_lib::DynamoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TABLE_NAME: &str = "odds";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOGGLY_TAG: &str = "loggly-agent";
pub const DEFAULT_SINK_TIMEOUT_MS: u64 = 5000;

/// Behavior of the `/status` endpoints, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusMode {
    /// Echo the current system time.
    #[default]
    Time,
    /// Report the table name and record count.
    Table,
}

impl std::str::FromStr for StatusMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "time" => Ok(StatusMode::Time),
            "table" => Ok(StatusMode::Table),
            _ => Err(ConfigError::Invalid {
                name: "STATUS_MODE",
                value: s.to_string(),
            }),
        }
    }
}

/// Loggly delivery settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogglyConfig {
    pub token: String,
    pub tag: String,
}

/// Errors that make the process refuse to start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },
}

/// Complete service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub store: DynamoConfig,
    pub port: u16,
    pub status_mode: StatusMode,
    pub loggly: Option<LogglyConfig>,
    pub sink_timeout: Duration,
}

impl ServiceConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let region = get("AWS_REGION").ok_or(ConfigError::Missing("AWS_REGION"))?;
        let table_name = get("ODDS_TABLE_NAME").unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string());
        let endpoint_url = get("DYNAMODB_ENDPOINT");

        let port = match get("SERVICE_PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                name: "SERVICE_PORT",
                value: v,
            })?,
            None => DEFAULT_PORT,
        };

        let status_mode = match get("STATUS_MODE") {
            Some(v) => v.parse()?,
            None => StatusMode::default(),
        };

        let loggly = get("LOGGLY_TOKEN").map(|token| LogglyConfig {
            token,
            tag: get("LOGGLY_TAG").unwrap_or_else(|| DEFAULT_LOGGLY_TAG.to_string()),
        });

        let sink_timeout_ms = match get("LOG_SINK_TIMEOUT_MS") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                name: "LOG_SINK_TIMEOUT_MS",
                value: v,
            })?,
            None => DEFAULT_SINK_TIMEOUT_MS,
        };

        Ok(Self {
            store: DynamoConfig {
                region,
                table_name,
                endpoint_url,
            },
            port,
            status_mode,
            loggly,
            sink_timeout: Duration::from_millis(sink_timeout_ms),
        })
    }
}
