use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use serde_json::{json, Map, Value};
use thiserror::Error;
use validator::ValidationErrors;

use crate::patch::PatchError;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(i32),

    #[error("Invalid product: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Malformed patch document: {0}")]
    MalformedPatch(String),

    #[error("Patch could not be applied: {0}")]
    PatchRejected(#[from] PatchError),

    #[error("Patched product is invalid: {0}")]
    PatchValidation(ValidationErrors),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => AppError::NotFound(format!("Product {} not found", id)),
            ProductError::Validation(errors) => AppError::ValidationError(errors),
            ProductError::MalformedPatch(msg) => AppError::BadRequest(msg),
            ProductError::PatchRejected(patch_err) => {
                let mut details = Map::new();
                details.insert(patch_err.path().to_string(), json!([patch_err.to_string()]));
                AppError::UnprocessableEntity {
                    message: "Patch could not be applied".to_string(),
                    details: Some(Value::Object(details)),
                }
            }
            ProductError::PatchValidation(errors) => AppError::UnprocessableValidation(errors),
            ProductError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_not_found_has_no_body() {
        let response = ProductError::NotFound(42).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ProductError::NotFound(1), StatusCode::NOT_FOUND),
            (
                ProductError::MalformedPatch("missing".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ProductError::PatchRejected(PatchError::UnknownPath("/stock".into())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ProductError::Internal("lock poisoned".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
