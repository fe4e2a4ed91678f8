//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! CORS is permissive (the API is consumed by browser frontends on other
//! origins) and request bodies are capped at 16 MiB before any handler
//! runs.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::config::MAX_UPLOAD_BYTES;

/// Build the API router.
pub fn api_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/", get(endpoints::health::check))
        .route("/extract-text", post(endpoints::extract::extract_text))
        .route("/add-patient", post(endpoints::patients::add_patient))
        .route("/get-patient/:id", get(endpoints::patients::get_patient))
        .route(
            "/get-all-patients",
            get(endpoints::patients::get_all_patients),
        )
        .route(
            "/get-patient-reports/:id",
            get(endpoints::patients::get_patient_reports),
        )
        .with_state(ctx)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
}
