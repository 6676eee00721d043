//! HTTP API route definitions.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::docs::openapi_json;
use super::handlers::{health, schedule_appointment, schedule_appointment_custom, AppState};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/", get(health))
        .route("/health", get(health))
        // Scheduling endpoints
        .route("/schedule-appointment", post(schedule_appointment))
        .route("/schedule-appointment-custom", post(schedule_appointment_custom))
        // Documentation
        .route("/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
