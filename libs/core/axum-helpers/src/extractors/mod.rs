//! Custom extractors for Axum handlers.
//!
//! These extractors turn malformed input into the standard [`ErrorResponse`]
//! shape instead of axum's plain-text rejections.
//!
//! [`ErrorResponse`]: crate::errors::ErrorResponse

pub mod id_path;
pub mod validated_json;

pub use id_path::IdPath;
pub use validated_json::ValidatedJson;
