//! Leaderboard REST API Routes

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use salesfloor_core::{LeaderboardEntry, Period};
use std::sync::Arc;

use crate::{
    error::ApiResult,
    extractors::ApiQuery,
    services::LeaderboardService,
    state::{AppState, SharedStore},
    types::PeriodQuery,
};

/// GET /api/leaderboard - Agents ranked by productive pass-ups
#[utoipa::path(
    get,
    path = "/api/leaderboard",
    tag = "Leaderboard",
    params(
        ("period" = Option<String>, Query, description = "daily | weekly | monthly (default daily)"),
    ),
    responses(
        (status = 200, description = "Ranked agents with at least one pass-up", body = Vec<LeaderboardEntry>),
    ),
)]
pub async fn get_leaderboard(
    State(store): State<SharedStore>,
    State(leaderboard): State<Arc<LeaderboardService>>,
    ApiQuery(query): ApiQuery<PeriodQuery>,
) -> ApiResult<Json<Vec<LeaderboardEntry>>> {
    let period = Period::from_query(query.period.as_deref());
    let entries = leaderboard.rank(store.as_ref(), period, Utc::now()).await?;
    Ok(Json(entries))
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/", get(get_leaderboard))
}
