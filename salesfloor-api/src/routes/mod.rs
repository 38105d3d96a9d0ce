//! HTTP routing.
//!
//! Every floor resource is nested under `/api`; health, metrics and the
//! OpenAPI document stay at the root.

pub mod agent;
pub mod break_schedule;
pub mod breaks;
pub mod health;
pub mod leaderboard;
pub mod message;
pub mod passup;
pub mod script;
pub mod stock;

use axum::{
    http::{header, request::Parts, HeaderValue, Method, StatusCode, Uri},
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware};

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::route_not_found(uri.path())
}

fn build_api_routes() -> Router<AppState> {
    Router::new()
        .nest("/agents", agent::create_router())
        .nest("/break-schedules", break_schedule::create_router())
        .nest("/breaks", breaks::create_router())
        .nest("/passups", passup::create_router())
        .nest("/leaderboard", leaderboard::create_router())
        .nest("/messages", message::create_router())
        .nest("/stock", stock::create_router())
        .nest("/scripts", script::create_router())
}

fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.is_production() {
        tracing::info!(
            "CORS: Production mode - allowing origins: {:?}",
            config.cors_origins
        );
    } else {
        tracing::info!("CORS: Development mode - allowing all origins");
    }

    let allow = config.clone();
    cors.allow_origin(AllowOrigin::predicate(
        move |origin: &HeaderValue, _parts: &Parts| {
            origin
                .to_str()
                .map(|o| allow.is_origin_allowed(o))
                .unwrap_or(false)
        },
    ))
}

/// Build the full application router.
pub fn create_api_router(state: AppState, config: &ApiConfig) -> Router {
    Router::new()
        .nest("/api", build_api_routes())
        .nest("/health", health::create_router())
        .route("/metrics", get(metrics_handler))
        .route("/openapi.json", get(openapi_json))
        .fallback(route_not_found)
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(from_fn(observability_middleware))
        .layer(build_cors_layer(config))
}
