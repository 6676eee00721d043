//! Field validation for inbound request bodies.
//!
//! Every field is checked before anything is forwarded so that a caller sees
//! all problems with its body in one response.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::types::AppointmentRequest;

/// Fields every structured appointment must carry.
pub const REQUIRED_FIELDS: [&str; 8] = [
    "clientCode",
    "clientOrderNumber",
    "scheduledDate",
    "consigneeName",
    "phoneNumber",
    "aiConsent",
    "consentDateTime",
    "questions",
];

/// A single failed check, located by its path in the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    /// Path to the offending value, starting with `"body"`.
    pub loc: Vec<String>,
    /// Human readable message.
    pub msg: String,
    /// Machine readable error kind.
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    fn new(loc: &[&str], msg: &str, kind: &str) -> Self {
        let mut path = vec!["body".to_string()];
        path.extend(loc.iter().map(|s| s.to_string()));
        Self {
            loc: path,
            msg: msg.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Field absent from the body.
    pub fn missing(field: &str) -> Self {
        Self::new(&[field], "Field required", "missing")
    }

    /// Value present but not a string.
    pub fn not_a_string(loc: &[&str]) -> Self {
        Self::new(loc, "Input should be a valid string", "string_type")
    }

    /// Value present but not an object.
    pub fn not_an_object(loc: &[&str]) -> Self {
        Self::new(loc, "Input should be a valid dictionary", "dict_type")
    }
}

/// Require the body to be a JSON object.
pub fn validate_object(body: Value) -> Result<Map<String, Value>, Vec<FieldError>> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(vec![FieldError::not_an_object(&[])]),
    }
}

/// Require raw JSON text to hold an object, without decoding it.
pub fn validate_raw_object(raw: &RawValue) -> Result<(), Vec<FieldError>> {
    if raw.get().trim_start().starts_with('{') {
        Ok(())
    } else {
        Err(vec![FieldError::not_an_object(&[])])
    }
}

fn take_string(
    map: &mut Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match map.remove(field) {
        None => {
            errors.push(FieldError::missing(field));
            None
        }
        Some(Value::String(s)) => Some(s),
        Some(_) => {
            errors.push(FieldError::not_a_string(&[field]));
            None
        }
    }
}

fn take_answers(
    map: &mut Map<String, Value>,
    errors: &mut Vec<FieldError>,
) -> Option<BTreeMap<String, String>> {
    const FIELD: &str = "questions";

    let answers = match map.remove(FIELD) {
        None => {
            errors.push(FieldError::missing(FIELD));
            return None;
        }
        Some(Value::Object(answers)) => answers,
        Some(_) => {
            errors.push(FieldError::not_an_object(&[FIELD]));
            return None;
        }
    };

    let before = errors.len();
    let mut out = BTreeMap::new();
    for (key, value) in answers {
        match value {
            Value::String(s) => {
                out.insert(key, s);
            }
            _ => errors.push(FieldError::not_a_string(&[FIELD, key.as_str()])),
        }
    }

    (errors.len() == before).then_some(out)
}

/// Check a body against the appointment schema.
///
/// Unknown fields are ignored. On failure, returns one error per bad field.
pub fn validate_appointment(body: Value) -> Result<AppointmentRequest, Vec<FieldError>> {
    let mut map = validate_object(body)?;
    let mut errors = Vec::new();

    let client_code = take_string(&mut map, "clientCode", &mut errors);
    let client_order_number = take_string(&mut map, "clientOrderNumber", &mut errors);
    let scheduled_date = take_string(&mut map, "scheduledDate", &mut errors);
    let consignee_name = take_string(&mut map, "consigneeName", &mut errors);
    let phone_number = take_string(&mut map, "phoneNumber", &mut errors);
    let ai_consent = take_string(&mut map, "aiConsent", &mut errors);
    let consent_date_time = take_string(&mut map, "consentDateTime", &mut errors);
    let questions = take_answers(&mut map, &mut errors);

    match (
        client_code,
        client_order_number,
        scheduled_date,
        consignee_name,
        phone_number,
        ai_consent,
        consent_date_time,
        questions,
    ) {
        (
            Some(client_code),
            Some(client_order_number),
            Some(scheduled_date),
            Some(consignee_name),
            Some(phone_number),
            Some(ai_consent),
            Some(consent_date_time),
            Some(questions),
        ) if errors.is_empty() => Ok(AppointmentRequest {
            client_code,
            client_order_number,
            scheduled_date,
            consignee_name,
            phone_number,
            ai_consent,
            consent_date_time,
            questions,
        }),
        _ => Err(errors),
    }
}
