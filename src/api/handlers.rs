//! HTTP API handlers.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::config::Config;
use crate::error::{ErrorDetail, RelayError, Result, ValidationDetail};
use crate::rlm::{
    validate_appointment, validate_raw_object, AppointmentRequest, RlmClient, RlmSchedulePayload,
    ScheduleResponse, UpstreamResponse,
};

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Upstream client.
    pub rlm: RlmClient,
    /// Wrap relayed responses in [`ScheduleResponse`].
    pub response_envelope: bool,
}

impl AppState {
    /// Create app state from config.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            rlm: RlmClient::new(config)?,
            response_envelope: config.response_envelope,
        })
    }
}

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Fixed status message.
    #[schema(example = "RLM API Server is running")]
    pub message: String,
}

/// Arbitrary JSON object forwarded without checks.
///
/// Holds the request text as received, so number precision and key order
/// reach the upstream untouched.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(value_type = Object)]
pub struct CustomAppointment(pub Box<RawValue>);

fn invalid_body(rejection: JsonRejection) -> RelayError {
    warn!(status = %rejection.status(), "Rejected request body");
    RelayError::InvalidBody {
        status: rejection.status(),
        reason: rejection.body_text(),
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Read a JSON body without re-encoding it.
fn raw_json(headers: &HeaderMap, body: &Bytes) -> Result<Box<RawValue>> {
    if !has_json_content_type(headers) {
        warn!("Rejected request body without JSON content type");
        return Err(RelayError::InvalidBody {
            status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
            reason: "Expected request with `Content-Type: application/json`".to_string(),
        });
    }

    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "Rejected malformed JSON body");
        RelayError::InvalidBody {
            status: StatusCode::BAD_REQUEST,
            reason: format!("Failed to parse the request body as JSON: {e}"),
        }
    })
}

/// Turn an upstream answer into the response sent to the caller.
///
/// The upstream status is mirrored. The body is copied verbatim unless
/// envelope mode is on.
pub fn relay(upstream: UpstreamResponse, envelope: bool) -> Response {
    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);

    if envelope {
        return (status, Json(ScheduleResponse::from_upstream(&upstream))).into_response();
    }

    let content_type = upstream
        .content_type
        .unwrap_or_else(|| "application/json".to_string());
    (status, [(header::CONTENT_TYPE, content_type)], upstream.body).into_response()
}

/// Health check handler - always returns 200.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Server is up", body = HealthResponse))
)]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        message: "RLM API Server is running".to_string(),
    })
}

/// Validate an appointment and forward it to the RLM API.
#[utoipa::path(
    post,
    path = "/schedule-appointment",
    tag = "scheduling",
    request_body = AppointmentRequest,
    responses(
        (status = 200, description = "Upstream response, relayed with the upstream status"),
        (status = 422, description = "Missing or malformed fields", body = ValidationDetail),
        (status = 502, description = "RLM API unreachable", body = ErrorDetail),
        (status = 504, description = "RLM API timed out", body = ErrorDetail)
    )
)]
pub async fn schedule_appointment(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Response> {
    let Json(body) = body.map_err(invalid_body)?;

    let request = validate_appointment(body).map_err(|errors| {
        warn!(failed_fields = errors.len(), "Appointment failed validation");
        RelayError::Validation(errors)
    })?;

    info!(
        client_code = %request.client_code,
        client_order_number = %request.client_order_number,
        "Forwarding appointment to RLM"
    );

    let payload = RlmSchedulePayload::from(request);
    let upstream = state.rlm.forward(&payload).await?;

    Ok(relay(upstream, state.response_envelope))
}

/// Forward an arbitrary JSON object to the RLM API unchanged.
#[utoipa::path(
    post,
    path = "/schedule-appointment-custom",
    tag = "scheduling",
    request_body = CustomAppointment,
    responses(
        (status = 200, description = "Upstream response, relayed with the upstream status"),
        (status = 422, description = "Body is not a JSON object", body = ValidationDetail),
        (status = 502, description = "RLM API unreachable", body = ErrorDetail),
        (status = 504, description = "RLM API timed out", body = ErrorDetail)
    )
)]
pub async fn schedule_appointment_custom(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let raw = raw_json(&headers, &body)?;
    validate_raw_object(&raw).map_err(RelayError::Validation)?;
    let payload = CustomAppointment(raw);

    info!(bytes = payload.0.get().len(), "Forwarding custom payload to RLM");

    let upstream = state.rlm.forward(&payload).await?;

    Ok(relay(upstream, state.response_envelope))
}
