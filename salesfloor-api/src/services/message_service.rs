//! Message Board Service

use chrono::TimeDelta;
use salesfloor_core::{
    new_entity_id, validate_message_content, Message, Timestamp, ValidationError,
};
use salesfloor_storage::FloorStore;

use crate::error::{ApiError, ApiResult};
use crate::types::PostMessageRequest;

pub const DEFAULT_MESSAGE_PAGE: usize = 50;

/// Window used by the tail read when no `since` is given.
pub const RECENT_WINDOW_SECS: i64 = 60;

/// Post a message. Content is trimmed and must be 1..=1000 characters.
pub async fn post_message(
    store: &dyn FloorStore,
    req: PostMessageRequest,
    now: Timestamp,
) -> ApiResult<Message> {
    let (agent_id, raw) = match (req.agent_id, req.content) {
        (Some(agent_id), Some(raw)) => (agent_id, raw),
        _ => return Err(ApiError::validation_failed("Missing agentId or content")),
    };
    let content = validate_message_content(&raw).map_err(|e| match e {
        ValidationError::TooLong { max, .. } => {
            ApiError::validation_failed(format!("Message is too long (max {} characters)", max))
        }
        other => ApiError::from(other),
    })?;

    let message = store
        .message_insert(new_entity_id(), agent_id, &content, now)
        .await?;
    tracing::debug!(agent_id = %agent_id, message_id = %message.id, "Message posted");
    Ok(message)
}

/// The `limit` messages ending `offset` back from the newest, oldest first.
pub async fn list_messages(
    store: &dyn FloorStore,
    limit: Option<usize>,
    offset: Option<usize>,
) -> ApiResult<Vec<Message>> {
    let mut page = store
        .message_page(limit.unwrap_or(DEFAULT_MESSAGE_PAGE), offset.unwrap_or(0))
        .await?;
    page.reverse();
    Ok(page)
}

/// Every message since `since` (default: the last minute), oldest first.
pub async fn recent_messages(
    store: &dyn FloorStore,
    since: Option<Timestamp>,
    now: Timestamp,
) -> ApiResult<Vec<Message>> {
    let since = since.unwrap_or(now - TimeDelta::seconds(RECENT_WINDOW_SECS));
    Ok(store.message_list_since(since).await?)
}
