pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::export::handlers as export;
use crate::extraction::handlers as extraction;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/cv/extract", post(extraction::handle_extract))
        .route(
            "/api/v1/cv/export/schema-org",
            post(export::handle_export_schema_org),
        )
        .route(
            "/api/v1/cv/import/schema-org",
            post(export::handle_import_schema_org),
        )
        .with_state(state)
}
