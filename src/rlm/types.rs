//! RLM request and response types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::client::UpstreamResponse;
use super::questions;

/// Appointment confirmation submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    /// Client code assigned by RLM.
    #[schema(example = "ACME")]
    pub client_code: String,
    /// Client order number.
    #[schema(example = "ORD-100234")]
    pub client_order_number: String,
    /// Confirmed delivery date.
    #[schema(example = "2025-07-01")]
    pub scheduled_date: String,
    /// Name of the consignee.
    #[schema(example = "Jane Doe")]
    pub consignee_name: String,
    /// Consignee phone number.
    #[schema(example = "5551234567")]
    pub phone_number: String,
    /// Whether the consignee consented to the AI call, as a string flag.
    #[schema(example = "Y")]
    pub ai_consent: String,
    /// When consent was given.
    #[schema(example = "2025-06-28T14:30:00")]
    pub consent_date_time: String,
    /// Screening answers keyed by question number.
    #[schema(example = json!({"1": "N", "2": "N", "3": "N", "4": "N", "5": "N"}))]
    pub questions: BTreeMap<String, String>,
}

/// A screening answer in the shape the RLM API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RlmQuestion {
    /// Full question text.
    pub question_description: String,
    /// Numeric question id.
    pub question_id: u32,
    /// Lowercased answer.
    pub question_response: String,
}

/// Body POSTed to the RLM API for a structured appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RlmSchedulePayload {
    pub client_code: String,
    pub client_order_number: String,
    pub scheduled_date: String,
    pub consignee_name: String,
    pub phone_number: String,
    pub ai_consent: String,
    pub consent_date_time: String,
    pub questions: Vec<RlmQuestion>,
}

impl From<AppointmentRequest> for RlmSchedulePayload {
    fn from(request: AppointmentRequest) -> Self {
        let questions = questions::transform(&request.questions);
        Self {
            client_code: request.client_code,
            client_order_number: request.client_order_number,
            scheduled_date: request.scheduled_date,
            consignee_name: request.consignee_name,
            phone_number: request.phone_number,
            ai_consent: request.ai_consent,
            consent_date_time: request.consent_date_time,
            questions,
        }
    }
}

/// Envelope wrapping a relayed upstream response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScheduleResponse {
    /// True when the upstream answered 200.
    pub success: bool,
    /// Upstream status code.
    pub status_code: u16,
    /// Upstream JSON body, or `{"raw_response": ...}` for non-JSON bodies.
    #[schema(value_type = Option<Object>)]
    pub response_data: Option<Value>,
    /// `HTTP <code>: <body>` for non-200 responses.
    pub error_message: Option<String>,
}

impl ScheduleResponse {
    /// Build the envelope for an upstream response.
    pub fn from_upstream(upstream: &UpstreamResponse) -> Self {
        let text = String::from_utf8_lossy(&upstream.body);
        let response_data = match serde_json::from_slice::<Value>(&upstream.body) {
            Ok(value) => value,
            Err(_) => serde_json::json!({ "raw_response": text }),
        };
        let success = upstream.status == 200;

        Self {
            success,
            status_code: upstream.status,
            response_data: Some(response_data),
            error_message: (!success).then(|| format!("HTTP {}: {}", upstream.status, text)),
        }
    }
}
