//! Sports-odds read API over DynamoDB.
//!
//! # Configuration
//!
//! - `AWS_REGION` - Store region (required)
//! - `ODDS_TABLE_NAME` - Table name (default: odds)
//! - `DYNAMODB_ENDPOINT` - Endpoint override (optional)
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `STATUS_MODE` - `time` (default) or `table`
//! - `LOGGLY_TOKEN` / `LOGGLY_TAG` - Access-log delivery to Loggly (optional)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text

use std::net::SocketAddr;

use tracing::{error, info};

use odds_service::build_router;
use odds_service_shared::{
    init_logging, init_metrics, sink_from_config, AppState, LoggingConfig, MetricsConfig,
    ServiceConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service("odds");
    init_logging(&logging_config);

    if let Err(e) = init_metrics(&MetricsConfig::from_env()) {
        tracing::warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let config = ServiceConfig::from_env().map_err(|e| {
        error!(error = %e, "invalid configuration");
        e
    })?;

    info!(
        region = %config.store.region,
        table = %config.store.table_name,
        port = config.port,
        status_mode = ?config.status_mode,
        loggly = config.loggly.is_some(),
        "starting odds service"
    );

    let state = AppState::from_config(&config);
    let sink = sink_from_config(config.loggly.as_ref());
    let app = build_router(state, sink, config.sink_timeout);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
