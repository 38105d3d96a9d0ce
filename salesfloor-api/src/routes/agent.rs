//! Agent REST API Routes

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use salesfloor_core::{Agent, AgentDetail};

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ApiJson, PathId},
    services::agent_service,
    state::{AppState, SharedStore},
    types::{CreateAgentRequest, UpdateAgentRequest},
};

/// POST /api/agents - Create an agent, or return the one with this name
#[utoipa::path(
    post,
    path = "/api/agents",
    tag = "Agents",
    request_body = CreateAgentRequest,
    responses(
        (status = 200, description = "Agent created or found", body = Agent),
        (status = 400, description = "Name missing or blank", body = ApiError),
    ),
)]
pub async fn create_agent(
    State(store): State<SharedStore>,
    ApiJson(req): ApiJson<CreateAgentRequest>,
) -> ApiResult<Json<Agent>> {
    let agent = agent_service::create_or_get_agent(store.as_ref(), req, Utc::now()).await?;
    Ok(Json(agent))
}

/// GET /api/agents/{id} - Agent with its 10 most recent pass-ups
#[utoipa::path(
    get,
    path = "/api/agents/{id}",
    tag = "Agents",
    params(("id" = Uuid, Path, description = "Agent ID")),
    responses(
        (status = 200, description = "Agent details", body = AgentDetail),
        (status = 404, description = "Agent not found", body = ApiError),
    ),
)]
pub async fn get_agent(
    State(store): State<SharedStore>,
    PathId(id): PathId,
) -> ApiResult<Json<AgentDetail>> {
    Ok(Json(agent_service::get_agent_detail(store.as_ref(), id).await?))
}

/// PATCH /api/agents/{id} - Rename an agent or set its custom script
#[utoipa::path(
    patch,
    path = "/api/agents/{id}",
    tag = "Agents",
    params(("id" = Uuid, Path, description = "Agent ID")),
    request_body = UpdateAgentRequest,
    responses(
        (status = 200, description = "Agent updated", body = Agent),
        (status = 404, description = "Agent not found", body = ApiError),
        (status = 409, description = "Name already taken", body = ApiError),
    ),
)]
pub async fn update_agent(
    State(store): State<SharedStore>,
    PathId(id): PathId,
    ApiJson(req): ApiJson<UpdateAgentRequest>,
) -> ApiResult<Json<Agent>> {
    let agent = agent_service::update_agent(store.as_ref(), id, req, Utc::now()).await?;
    Ok(Json(agent))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_agent))
        .route("/:id", get(get_agent).patch(update_agent))
}
