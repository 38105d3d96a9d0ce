use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::FixedOffset;
use http_body_util::BodyExt;
use salesfloor_api::{create_api_router, ApiConfig, AppState, FloorConfig};
use salesfloor_core::FloorTimeZone;
use salesfloor_storage::InMemoryFloorStore;
use salesfloor_test_utils::ScriptedQuoteSource;
use serde_json::Value;
use tower::ServiceExt;

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Floor policy pinned to UTC so window boundaries don't depend on the host zone.
pub fn test_floor_config() -> FloorConfig {
    let mut config = FloorConfig::from_lookup(|_| None);
    config.time_zone = FloorTimeZone::Fixed(FixedOffset::east_opt(0).expect("zero offset"));
    config
}

/// Router over an empty in-memory store and the given quote upstream.
pub fn test_app(quotes: Arc<ScriptedQuoteSource>) -> Router {
    let store = Arc::new(InMemoryFloorStore::new());
    let state = AppState::new(store, quotes, &test_floor_config());
    create_api_router(state, &ApiConfig::default())
}

/// Send a request and decode the JSON body (`Value::Null` when empty).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> TestResult<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

/// Create (or fetch) an agent by name, returning its id.
pub async fn create_agent(app: &Router, name: &str) -> TestResult<String> {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/agents",
        Some(serde_json::json!({ "name": name })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "create agent: {}", body);
    Ok(body["id"].as_str().unwrap_or_default().to_string())
}
