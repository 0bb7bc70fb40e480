//! Request extractors that reject with [`AppError`].
//!
//! `ApiJson<T>` and `ApiPath<T>` behave like `axum::Json<T>` and
//! `axum::extract::Path<T>`, but a malformed body, a missing
//! `Content-Type: application/json` or an unparseable path segment becomes a
//! 400 `invalid_request` with the usual `{error, code}` body instead of
//! axum's plain-text 415/422.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON request body.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;

        Ok(ApiJson(value))
    }
}

/// Typed path parameters.
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;

        Ok(ApiPath(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::StatusCode,
        routing::{post, put},
    };
    use serde::Deserialize;
    use tower::ServiceExt;
    use uuid::Uuid;

    #[derive(Debug, Deserialize)]
    struct Payload {
        url: Option<String>,
    }

    async fn echo(ApiJson(body): ApiJson<Payload>) -> String {
        body.url.unwrap_or_default()
    }

    async fn by_id(ApiPath(id): ApiPath<Uuid>) -> String {
        id.to_string()
    }

    fn app() -> Router {
        Router::new()
            .route("/echo", post(echo))
            .route("/items/{id}", put(by_id))
    }

    async fn send(req: axum::http::Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    fn post_echo(content_type: Option<&str>, body: &'static str) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder().method("POST").uri("/echo");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn valid_body_is_extracted() {
        let response = app()
            .oneshot(post_echo(Some("application/json"), r#"{"url":"https://y/1"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn wrongly_typed_field_is_400_json() {
        let (status, body) = send(post_echo(Some("application/json"), r#"{"url":123}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
        assert!(body["error"].as_str().unwrap().contains("url"));
    }

    #[tokio::test]
    async fn syntax_error_is_400_json() {
        let (status, body) = send(post_echo(Some("application/json"), "not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
    }

    #[tokio::test]
    async fn missing_content_type_is_400_json() {
        let (status, body) = send(post_echo(None, r#"{"url":"https://y/1"}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
    }

    #[tokio::test]
    async fn unparseable_path_is_400_json() {
        let req = axum::http::Request::builder()
            .method("PUT")
            .uri("/items/not-a-uuid")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
    }
}
