//! Break REST API Routes

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use salesfloor_core::Break;

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ApiJson, OptionalApiJson, PathId},
    services::{break_service, BreakPolicy},
    state::{AppState, SharedStore},
    types::{EndBreakRequest, StartBreakRequest, TodaysBreaksResponse},
};

/// POST /api/breaks - Start a break
#[utoipa::path(
    post,
    path = "/api/breaks",
    tag = "Breaks",
    request_body = StartBreakRequest,
    responses(
        (status = 201, description = "Break started", body = Break),
        (status = 400, description = "Missing fields or invalid type", body = ApiError),
        (status = 404, description = "Agent not found", body = ApiError),
        (status = 409, description = "Agent already has an open break", body = ApiError),
    ),
)]
pub async fn start_break(
    State(store): State<SharedStore>,
    State(policy): State<BreakPolicy>,
    ApiJson(req): ApiJson<StartBreakRequest>,
) -> ApiResult<(StatusCode, Json<Break>)> {
    let record = break_service::start_break(store.as_ref(), &policy, req, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PATCH /api/breaks/{id} - End a break
///
/// The body is optional; `{"missed": true}` flags the break as missed.
#[utoipa::path(
    patch,
    path = "/api/breaks/{id}",
    tag = "Breaks",
    params(("id" = Uuid, Path, description = "Break ID")),
    request_body = EndBreakRequest,
    responses(
        (status = 200, description = "Break ended", body = Break),
        (status = 404, description = "Break not found", body = ApiError),
        (status = 409, description = "Break already ended", body = ApiError),
    ),
)]
pub async fn end_break(
    State(store): State<SharedStore>,
    State(policy): State<BreakPolicy>,
    PathId(id): PathId,
    OptionalApiJson(body): OptionalApiJson<EndBreakRequest>,
) -> ApiResult<Json<Break>> {
    let req = body.unwrap_or_default();
    let record = break_service::end_break(store.as_ref(), &policy, id, req, Utc::now()).await?;
    Ok(Json(record))
}

/// GET /api/breaks/agent/{agentId}/today - Breaks this shift and the bio-break budget
#[utoipa::path(
    get,
    path = "/api/breaks/agent/{agentId}/today",
    tag = "Breaks",
    params(("agentId" = Uuid, Path, description = "Agent ID")),
    responses(
        (status = 200, description = "Breaks since shift start", body = TodaysBreaksResponse),
    ),
)]
pub async fn todays_breaks(
    State(store): State<SharedStore>,
    State(policy): State<BreakPolicy>,
    PathId(agent_id): PathId,
) -> ApiResult<Json<TodaysBreaksResponse>> {
    let today = break_service::todays_breaks(store.as_ref(), &policy, agent_id, Utc::now()).await?;
    Ok(Json(today))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_break))
        .route("/:id", patch(end_break))
        .route("/agent/:agentId/today", get(todays_breaks))
}
