//! OpenAPI document for the relay.

use axum::Json;
use utoipa::OpenApi;

use super::handlers::{self, CustomAppointment, HealthResponse};
use crate::error::{ErrorDetail, ValidationDetail};
use crate::rlm::{AppointmentRequest, FieldError, RlmQuestion, RlmSchedulePayload, ScheduleResponse};

/// OpenAPI description of every route.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "RLM API Server",
        description = "Relay for RLM capacity management appointment scheduling"
    ),
    paths(
        handlers::health,
        handlers::schedule_appointment,
        handlers::schedule_appointment_custom
    ),
    components(schemas(
        HealthResponse,
        AppointmentRequest,
        CustomAppointment,
        RlmQuestion,
        RlmSchedulePayload,
        ScheduleResponse,
        FieldError,
        ValidationDetail,
        ErrorDetail
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "scheduling", description = "Appointment forwarding")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
