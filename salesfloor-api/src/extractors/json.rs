//! Body and query extractors with JSON error bodies.
//!
//! Axum's own `Json` and `Query` reject malformed input with a plain-text
//! 400/415/422. These wrappers run the same extraction and turn any
//! rejection into a 400 `VALIDATION_FAILED` [`ApiError`].

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{header, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON request body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "Rejected request body");
            ApiError::validation_failed(format!("Invalid request body: {}", e.body_text()))
        })?;
        Ok(ApiJson(value))
    }
}

/// JSON body that may be left off entirely.
///
/// A request without a `Content-Type` yields `None`; a body that is sent
/// must still parse.
#[derive(Debug, Clone, Default)]
pub struct OptionalApiJson<T>(pub Option<T>);

#[async_trait]
impl<T, S> FromRequest<S> for OptionalApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !req.headers().contains_key(header::CONTENT_TYPE) {
            return Ok(OptionalApiJson(None));
        }
        let ApiJson(value) = ApiJson::<T>::from_request(req, state).await?;
        Ok(OptionalApiJson(Some(value)))
    }
}

/// Query string.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                tracing::debug!(query = ?parts.uri.query(), error = %e, "Rejected query string");
                ApiError::validation_failed(format!("Invalid query string: {}", e.body_text()))
            })?;
        Ok(ApiQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use axum::{body::Body, http::StatusCode, routing::post, Router};
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize)]
    struct Payload {
        count: Option<u32>,
    }

    async fn count(ApiQuery(q): ApiQuery<Payload>, ApiJson(body): ApiJson<Payload>) -> String {
        format!("{:?}/{:?}", q.count, body.count)
    }

    async fn maybe(OptionalApiJson(body): OptionalApiJson<Payload>) -> String {
        format!("{:?}", body.and_then(|b| b.count))
    }

    fn app() -> Router {
        Router::new()
            .route("/count", post(count))
            .route("/maybe", post(maybe))
    }

    async fn call(
        uri: &str,
        body: Option<&str>,
    ) -> Result<(StatusCode, String), Box<dyn std::error::Error>> {
        let builder = Request::post(uri);
        let request = match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        let response = app().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        Ok((status, String::from_utf8(bytes.to_vec())?))
    }

    #[tokio::test]
    async fn test_well_formed_input_passes_through() -> Result<(), Box<dyn std::error::Error>> {
        let (status, text) = call("/count?count=2", Some(r#"{"count": 3}"#)).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(text, "Some(2)/Some(3)");
        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_typed_body_is_json_400() -> Result<(), Box<dyn std::error::Error>> {
        let (status, text) = call("/count", Some(r#"{"count": "three"}"#)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ApiError = serde_json::from_str(&text)?;
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let (status, _) = call("/count", Some("{not json")).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call("/count", None).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_typed_query_is_json_400() -> Result<(), Box<dyn std::error::Error>> {
        let (status, text) = call("/count?count=abc", Some("{}")).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ApiError = serde_json::from_str(&text)?;
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(err.message.starts_with("Invalid query string"));
        Ok(())
    }

    #[tokio::test]
    async fn test_optional_body() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(call("/maybe", None).await?, (StatusCode::OK, "None".to_string()));
        assert_eq!(
            call("/maybe", Some(r#"{"count": 1}"#)).await?,
            (StatusCode::OK, "Some(1)".to_string())
        );
        let (status, _) = call("/maybe", Some(r#"{"count": true}"#)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }
}
