//! Break Schedule REST API Routes

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use salesfloor_core::BreakSchedule;

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ApiJson, PathId},
    services::schedule_service,
    state::{AppState, SharedStore},
    types::UpsertScheduleRequest,
};

/// GET /api/break-schedules/agent/{agentId} - Schedule, created with defaults on first read
#[utoipa::path(
    get,
    path = "/api/break-schedules/agent/{agentId}",
    tag = "Break Schedules",
    params(("agentId" = Uuid, Path, description = "Agent ID")),
    responses(
        (status = 200, description = "Break schedule", body = BreakSchedule),
        (status = 404, description = "Agent not found", body = ApiError),
    ),
)]
pub async fn get_schedule(
    State(store): State<SharedStore>,
    PathId(agent_id): PathId,
) -> ApiResult<Json<BreakSchedule>> {
    let schedule =
        schedule_service::get_or_create_schedule(store.as_ref(), agent_id, Utc::now()).await?;
    Ok(Json(schedule))
}

/// PUT /api/break-schedules/agent/{agentId} - Create or replace the schedule
#[utoipa::path(
    put,
    path = "/api/break-schedules/agent/{agentId}",
    tag = "Break Schedules",
    params(("agentId" = Uuid, Path, description = "Agent ID")),
    request_body = UpsertScheduleRequest,
    responses(
        (status = 200, description = "Schedule saved", body = BreakSchedule),
        (status = 404, description = "Agent not found", body = ApiError),
    ),
)]
pub async fn put_schedule(
    State(store): State<SharedStore>,
    PathId(agent_id): PathId,
    ApiJson(req): ApiJson<UpsertScheduleRequest>,
) -> ApiResult<Json<BreakSchedule>> {
    let schedule =
        schedule_service::upsert_schedule(store.as_ref(), agent_id, req, Utc::now()).await?;
    Ok(Json(schedule))
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/agent/:agentId", get(get_schedule).put(put_schedule))
}
