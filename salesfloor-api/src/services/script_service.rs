//! Global Script Service

use salesfloor_core::{new_entity_id, GlobalScript, Timestamp};
use salesfloor_storage::FloorStore;

use crate::error::{ApiError, ApiResult};
use crate::types::PublishScriptRequest;

/// The newest script version.
pub async fn latest_script(store: &dyn FloorStore) -> ApiResult<GlobalScript> {
    store
        .global_script_latest()
        .await?
        .ok_or_else(|| ApiError::not_found("No global script has been published"))
}

/// Store `content` as the next version.
pub async fn publish_script(
    store: &dyn FloorStore,
    req: PublishScriptRequest,
    now: Timestamp,
) -> ApiResult<GlobalScript> {
    let content = req
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::missing_field("content"))?;
    let script = store
        .global_script_publish(new_entity_id(), &content, now)
        .await?;
    tracing::info!(version = script.version, "Global script published");
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::Utc;
    use salesfloor_storage::InMemoryFloorStore;

    #[tokio::test]
    async fn test_versions_increment() -> ApiResult<()> {
        let store = InMemoryFloorStore::new();
        let err = latest_script(&store).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);

        let publish = |c: &str| PublishScriptRequest {
            content: Some(c.to_string()),
        };
        let v1 = publish_script(&store, publish("Hi, this is..."), Utc::now()).await?;
        let v2 = publish_script(&store, publish("Hello, this is..."), Utc::now()).await?;
        assert_eq!(v1.version + 1, v2.version);
        assert_eq!(latest_script(&store).await?.content, "Hello, this is...");
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_content_rejected() {
        let store = InMemoryFloorStore::new();
        let err = publish_script(&store, PublishScriptRequest { content: None }, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);
    }
}
