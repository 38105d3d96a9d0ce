//! Pass-Up REST API Routes

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use salesfloor_core::{FloorTimeZone, PassUp, PassUpStats, Period};
use salesfloor_storage::PassUpFilter;

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiQuery, PathId},
    services::pass_up_service::{self, OwnerClaim},
    state::{AppState, SharedStore},
    types::{
        parse_date_param, CreatePassUpRequest, DeleteResponse, OwnerQuery, PassUpListQuery,
        PeriodQuery, UpdatePassUpRequest,
    },
};

fn owner(query: OwnerQuery) -> ApiResult<OwnerClaim> {
    query
        .agent_id
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| OwnerClaim::parse(&raw))
        .ok_or_else(|| ApiError::missing_field("agentId"))
}

/// POST /api/passups - Log a pass-up
#[utoipa::path(
    post,
    path = "/api/passups",
    tag = "Pass-Ups",
    request_body = CreatePassUpRequest,
    responses(
        (status = 201, description = "Pass-up recorded", body = PassUp),
        (status = 400, description = "Missing fields or invalid disposition", body = ApiError),
        (status = 404, description = "Agent not found", body = ApiError),
    ),
)]
pub async fn create_pass_up(
    State(store): State<SharedStore>,
    ApiJson(req): ApiJson<CreatePassUpRequest>,
) -> ApiResult<(StatusCode, Json<PassUp>)> {
    let pass_up = pass_up_service::create_pass_up(store.as_ref(), req, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(pass_up)))
}

/// GET /api/passups/agent/{agentId} - An agent's pass-ups, newest first
#[utoipa::path(
    get,
    path = "/api/passups/agent/{agentId}",
    tag = "Pass-Ups",
    params(
        ("agentId" = Uuid, Path, description = "Agent ID"),
        ("startDate" = Option<String>, Query, description = "Inclusive lower bound on date"),
        ("endDate" = Option<String>, Query, description = "Inclusive upper bound on date"),
        ("limit" = Option<usize>, Query, description = "Maximum number of results (default 50)"),
    ),
    responses(
        (status = 200, description = "Pass-ups", body = Vec<PassUp>),
        (status = 400, description = "Malformed date", body = ApiError),
    ),
)]
pub async fn list_pass_ups(
    State(store): State<SharedStore>,
    PathId(agent_id): PathId,
    ApiQuery(query): ApiQuery<PassUpListQuery>,
) -> ApiResult<Json<Vec<PassUp>>> {
    let filter = PassUpFilter {
        agent_id,
        start: query
            .start_date
            .as_deref()
            .map(|v| parse_date_param("startDate", v))
            .transpose()?,
        end: query
            .end_date
            .as_deref()
            .map(|v| parse_date_param("endDate", v))
            .transpose()?,
        limit: query.limit.unwrap_or(PassUpFilter::DEFAULT_LIMIT),
    };
    Ok(Json(pass_up_service::list_pass_ups(store.as_ref(), &filter).await?))
}

/// GET /api/passups/agent/{agentId}/stats - Disposition counts and goal progress
#[utoipa::path(
    get,
    path = "/api/passups/agent/{agentId}/stats",
    tag = "Pass-Ups",
    params(
        ("agentId" = Uuid, Path, description = "Agent ID"),
        ("period" = Option<String>, Query, description = "daily | weekly | monthly (default daily)"),
    ),
    responses(
        (status = 200, description = "Stats for the period", body = PassUpStats),
    ),
)]
pub async fn pass_up_stats(
    State(store): State<SharedStore>,
    State(time_zone): State<FloorTimeZone>,
    PathId(agent_id): PathId,
    ApiQuery(query): ApiQuery<PeriodQuery>,
) -> ApiResult<Json<PassUpStats>> {
    let period = Period::from_query(query.period.as_deref());
    let stats =
        pass_up_service::pass_up_stats(store.as_ref(), &time_zone, agent_id, period, Utc::now())
            .await?;
    Ok(Json(stats))
}

/// PATCH /api/passups/{id}?agentId= - Edit a pass-up owned by `agentId`
#[utoipa::path(
    patch,
    path = "/api/passups/{id}",
    tag = "Pass-Ups",
    params(
        ("id" = Uuid, Path, description = "Pass-up ID"),
        ("agentId" = String, Query, description = "Agent claiming ownership"),
    ),
    request_body = UpdatePassUpRequest,
    responses(
        (status = 200, description = "Pass-up updated", body = PassUp),
        (status = 400, description = "Missing agentId or invalid disposition", body = ApiError),
        (status = 403, description = "Pass-up belongs to another agent", body = ApiError),
        (status = 404, description = "Pass-up not found", body = ApiError),
    ),
)]
pub async fn update_pass_up(
    State(store): State<SharedStore>,
    PathId(id): PathId,
    ApiQuery(query): ApiQuery<OwnerQuery>,
    ApiJson(req): ApiJson<UpdatePassUpRequest>,
) -> ApiResult<Json<PassUp>> {
    let agent_id = owner(query)?;
    let pass_up =
        pass_up_service::update_pass_up(store.as_ref(), id, agent_id, req, Utc::now()).await?;
    Ok(Json(pass_up))
}

/// DELETE /api/passups/{id}?agentId= - Delete a pass-up owned by `agentId`
#[utoipa::path(
    delete,
    path = "/api/passups/{id}",
    tag = "Pass-Ups",
    params(
        ("id" = Uuid, Path, description = "Pass-up ID"),
        ("agentId" = String, Query, description = "Agent claiming ownership"),
    ),
    responses(
        (status = 200, description = "Pass-up deleted", body = DeleteResponse),
        (status = 403, description = "Pass-up belongs to another agent", body = ApiError),
        (status = 404, description = "Pass-up not found", body = ApiError),
    ),
)]
pub async fn delete_pass_up(
    State(store): State<SharedStore>,
    PathId(id): PathId,
    ApiQuery(query): ApiQuery<OwnerQuery>,
) -> ApiResult<Json<DeleteResponse>> {
    let agent_id = owner(query)?;
    Ok(Json(
        pass_up_service::delete_pass_up(store.as_ref(), id, agent_id).await?,
    ))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_pass_up))
        .route("/agent/:agentId", get(list_pass_ups))
        .route("/agent/:agentId/stats", get(pass_up_stats))
        .route("/:id", patch(update_pass_up).delete(delete_pass_up))
}
