//! Products API routes

use axum::Router;
use domain_products::handlers;

use crate::state::AppState;

/// Create products router over the shared store
pub fn router(state: &AppState) -> Router {
    handlers::router(state.products.clone())
}
