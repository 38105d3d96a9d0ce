//! Stock Quote REST API Routes

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use salesfloor_core::Quote;
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    extractors::ApiQuery,
    services::QuoteService,
    state::AppState,
    types::QuoteQuery,
};

/// GET /api/stock/quote - Cached quote for a ticker
#[utoipa::path(
    get,
    path = "/api/stock/quote",
    tag = "Stock",
    params(
        ("symbol" = Option<String>, Query, description = "Ticker symbol (default QTZM)"),
    ),
    responses(
        (status = 200, description = "Quote, flagged stale when served from cache after an upstream failure", body = Quote),
        (status = 400, description = "Malformed symbol", body = ApiError),
        (status = 500, description = "Upstream failed and nothing is cached", body = ApiError),
    ),
)]
pub async fn get_quote(
    State(quotes): State<Arc<QuoteService>>,
    ApiQuery(query): ApiQuery<QuoteQuery>,
) -> ApiResult<Json<Quote>> {
    let quote = quotes.get_quote(query.symbol.as_deref(), Utc::now()).await?;
    Ok(Json(quote))
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/quote", get(get_quote))
}
