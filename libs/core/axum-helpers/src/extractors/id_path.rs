//! Integer path parameter extractor.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
    response::{IntoResponse, Response},
};

/// Extractor for a single integer `{id}` path parameter.
///
/// Only a plain decimal `i32`, optionally negative, is accepted. Anything
/// else is rejected with a 400 `INVALID_ID` error response.
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::get;
/// use axum_helpers::extractors::IdPath;
///
/// async fn get_product(IdPath(id): IdPath) -> String {
///     format!("Product ID: {}", id)
/// }
///
/// let app = Router::new().route("/products/{id}", get(get_product));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPath(pub i32);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        // `i32::from_str` alone would also take a leading '+'
        if raw.starts_with('+') {
            return Err(AppError::InvalidId(raw).into_response());
        }

        raw.parse::<i32>()
            .map(IdPath)
            .map_err(|_| AppError::InvalidId(raw).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn echo(IdPath(id): IdPath) -> String {
        id.to_string()
    }

    fn app() -> Router {
        Router::new().route("/{id}", get(echo))
    }

    async fn send(uri: &str) -> (StatusCode, String) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_parses_integer_id() {
        assert_eq!(send("/42").await, (StatusCode::OK, "42".to_string()));
        assert_eq!(send("/-7").await, (StatusCode::OK, "-7".to_string()));
    }

    #[tokio::test]
    async fn test_rejects_non_integer_id() {
        let (status, body) = send("/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("INVALID_ID"));
    }

    #[tokio::test]
    async fn test_rejects_padded_or_signed_id() {
        for uri in ["/%205", "/5%20", "/%095", "/+5"] {
            let (status, body) = send(uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert!(body.contains("INVALID_ID"));
        }
    }

    #[tokio::test]
    async fn test_rejects_overflowing_id() {
        let (status, _) = send("/99999999999").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
