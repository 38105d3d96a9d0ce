//! Sales Floor API Server Entry Point
//!
//! Reads configuration from the environment, opens the store, and starts
//! the Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use salesfloor_api::telemetry::{init_tracing, TelemetryConfig};
use salesfloor_api::{
    create_api_router, resolve_bind_host, resolve_port, set_expose_details, ApiConfig, ApiError,
    ApiResult, AppState, DbClient, DbConfig, FloorConfig, SharedStore, StoreBackend,
    YahooChartSource,
};
use salesfloor_storage::InMemoryFloorStore;

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing(&TelemetryConfig::default())?;

    let api_config = ApiConfig::from_env();
    let floor_config = FloorConfig::from_env();
    set_expose_details(api_config.exposes_error_details());

    let store = open_store(api_config.store).await?;
    let quote_source = Arc::new(
        YahooChartSource::new(&floor_config.quote_base_url, floor_config.quote_timeout)
            .map_err(|e| ApiError::internal_error(e.to_string()))?,
    );

    let state = AppState::new(store, quote_source, &floor_config);
    let app = create_api_router(state, &api_config);

    let addr = resolve_bind_addr()?;
    tracing::info!(
        %addr,
        environment = ?api_config.environment,
        store = ?api_config.store,
        rollover = %floor_config.shift_clock.rollover(),
        "Starting sales floor API server"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

async fn open_store(backend: StoreBackend) -> ApiResult<SharedStore> {
    match backend {
        StoreBackend::Postgres => {
            let db = DbClient::from_config(&DbConfig::from_env())?;
            db.ensure_schema().await?;
            Ok(Arc::new(db))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Ok(Arc::new(InMemoryFloorStore::new()))
        }
    }
}

fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let lookup = |key: &str| std::env::var(key).ok();
    let addr = format!("{}:{}", resolve_bind_host(lookup), resolve_port(lookup));
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
