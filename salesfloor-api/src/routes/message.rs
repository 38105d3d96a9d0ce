//! Message Board REST API Routes

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiQuery},
    services::message_service,
    state::{AppState, SharedStore},
    types::{
        parse_date_param, MessageListQuery, MessageResponse, MessagesResponse, PostMessageRequest,
        RecentMessagesQuery,
    },
};

/// GET /api/messages - A page of messages, oldest first
#[utoipa::path(
    get,
    path = "/api/messages",
    tag = "Messages",
    params(
        ("limit" = Option<usize>, Query, description = "Page size (default 50)"),
        ("offset" = Option<usize>, Query, description = "Messages to skip back from the newest"),
    ),
    responses(
        (status = 200, description = "Messages", body = MessagesResponse),
    ),
)]
pub async fn list_messages(
    State(store): State<SharedStore>,
    ApiQuery(query): ApiQuery<MessageListQuery>,
) -> ApiResult<Json<MessagesResponse>> {
    let messages = message_service::list_messages(store.as_ref(), query.limit, query.offset).await?;
    Ok(Json(MessagesResponse { messages }))
}

/// GET /api/messages/recent - Messages since a timestamp (default: the last minute)
#[utoipa::path(
    get,
    path = "/api/messages/recent",
    tag = "Messages",
    params(
        ("since" = Option<String>, Query, description = "ISO-8601 lower bound on creation time"),
    ),
    responses(
        (status = 200, description = "Messages", body = MessagesResponse),
        (status = 400, description = "Malformed timestamp", body = ApiError),
    ),
)]
pub async fn recent_messages(
    State(store): State<SharedStore>,
    ApiQuery(query): ApiQuery<RecentMessagesQuery>,
) -> ApiResult<Json<MessagesResponse>> {
    let since = query
        .since
        .as_deref()
        .map(|v| parse_date_param("since", v))
        .transpose()?;
    let messages = message_service::recent_messages(store.as_ref(), since, Utc::now()).await?;
    Ok(Json(MessagesResponse { messages }))
}

/// POST /api/messages - Post to the board
#[utoipa::path(
    post,
    path = "/api/messages",
    tag = "Messages",
    request_body = PostMessageRequest,
    responses(
        (status = 201, description = "Message posted", body = MessageResponse),
        (status = 400, description = "Missing fields, empty or too long", body = ApiError),
        (status = 404, description = "Agent not found", body = ApiError),
    ),
)]
pub async fn post_message(
    State(store): State<SharedStore>,
    ApiJson(req): ApiJson<PostMessageRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let message = message_service::post_message(store.as_ref(), req, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(MessageResponse { message })))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_messages).post(post_message))
        .route("/recent", get(recent_messages))
}
