//! Global Script REST API Routes

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use salesfloor_core::GlobalScript;

use crate::{
    error::{ApiError, ApiResult},
    extractors::ApiJson,
    services::script_service,
    state::{AppState, SharedStore},
    types::PublishScriptRequest,
};

/// GET /api/scripts/global - Latest version of the shared call script
#[utoipa::path(
    get,
    path = "/api/scripts/global",
    tag = "Scripts",
    responses(
        (status = 200, description = "Latest script", body = GlobalScript),
        (status = 404, description = "No script published", body = ApiError),
    ),
)]
pub async fn get_global_script(State(store): State<SharedStore>) -> ApiResult<Json<GlobalScript>> {
    Ok(Json(script_service::latest_script(store.as_ref()).await?))
}

/// PUT /api/scripts/global - Publish a new version
#[utoipa::path(
    put,
    path = "/api/scripts/global",
    tag = "Scripts",
    request_body = PublishScriptRequest,
    responses(
        (status = 200, description = "Script published", body = GlobalScript),
        (status = 400, description = "Content missing", body = ApiError),
    ),
)]
pub async fn put_global_script(
    State(store): State<SharedStore>,
    ApiJson(req): ApiJson<PublishScriptRequest>,
) -> ApiResult<Json<GlobalScript>> {
    let script = script_service::publish_script(store.as_ref(), req, Utc::now()).await?;
    Ok(Json(script))
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/global", get(get_global_script).put(put_global_script))
}
