//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor with automatic validation.
///
/// Deserializes the body and runs the `validator` crate's `Validate` impl.
/// Every failure is a 400 [`ErrorResponse`](crate::errors::ErrorResponse):
/// malformed JSON or a missing/mistyped field yields `INVALID_JSON`, a
/// failed constraint yields `VALIDATION_ERROR` with per-field details.
/// A body without a JSON content type is rejected with 415.
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::post;
/// use axum_helpers::extractors::ValidatedJson;
/// use serde::Deserialize;
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// struct CreateProduct {
///     #[validate(length(min = 1))]
///     name: String,
///     price: f64,
/// }
///
/// async fn create(ValidatedJson(payload): ValidatedJson<CreateProduct>) -> String {
///     format!("Creating product: {}", payload.name)
/// }
///
/// let app = Router::new().route("/products", post(create));
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorResponse;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        routing::post,
    };
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 1))]
        name: String,
        price: f64,
    }

    async fn accept(ValidatedJson(payload): ValidatedJson<Payload>) -> String {
        format!("{}:{}", payload.name, payload.price)
    }

    async fn send(content_type: Option<&str>, body: &str) -> (StatusCode, Vec<u8>) {
        let mut request = Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }
        let response = Router::new()
            .route("/", post(accept))
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_valid_payload_passes_through() {
        let (status, body) = send(Some("application/json"), r#"{"name":"Widget","price":9.5}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"Widget:9.5");
    }

    #[tokio::test]
    async fn test_constraint_failure_is_400_with_details() {
        let (status, body) = send(Some("application/json"), r#"{"name":"","price":1}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "VALIDATION_ERROR");
        assert!(error.details.unwrap().get("name").is_some());
    }

    #[tokio::test]
    async fn test_missing_field_is_400() {
        let (status, body) = send(Some("application/json"), r#"{"name":"Widget"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "INVALID_JSON");
        assert!(error.message.contains("price"));
    }

    #[tokio::test]
    async fn test_syntax_error_is_400() {
        let (status, _) = send(Some("application/json"), "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_content_type_is_415() {
        let (status, _) = send(None, r#"{"name":"Widget","price":1}"#).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
