//! Path extractor for entity IDs.
//!
//! `PathId` rejects a malformed UUID segment with the API's standard
//! `INVALID_FORMAT` error body instead of Axum's plain-text rejection.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use salesfloor_core::EntityId;

use crate::error::ApiError;

/// Extractor for a single UUID path parameter.
///
/// # Example
///
/// ```rust,ignore
/// async fn get_agent(PathId(agent_id): PathId) -> ApiResult<Json<AgentDetail>> {
///     // agent_id is a parsed EntityId
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub EntityId);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<EntityId> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                tracing::debug!(path = %parts.uri.path(), error = %e, "Rejected path id");
                ApiError::invalid_format("id", "a UUID")
            })?;
        Ok(PathId(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    async fn echo(PathId(id): PathId) -> String {
        id.to_string()
    }

    #[tokio::test]
    async fn test_valid_and_invalid_ids() -> Result<(), Box<dyn std::error::Error>> {
        let app = Router::new().route("/items/:id", get(echo));

        let id = salesfloor_core::new_entity_id();
        let ok = app
            .clone()
            .oneshot(Request::get(format!("/items/{}", id)).body(Body::empty())?)
            .await?;
        assert_eq!(ok.status(), axum::http::StatusCode::OK);

        let bad = app
            .oneshot(Request::get("/items/not-a-uuid").body(Body::empty())?)
            .await?;
        assert_eq!(bad.status(), ErrorCode::InvalidFormat.status_code());
        Ok(())
    }
}
