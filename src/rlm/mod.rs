//! RLM capacity management API integration.
//!
//! This module handles:
//! - Appointment payload types and the response envelope
//! - The fixed screening question catalog
//! - Field validation for inbound appointment requests
//! - The upstream HTTP client

pub mod client;
pub mod questions;
pub mod types;
pub mod validation;

pub use client::{RlmClient, UpstreamResponse};
pub use types::{AppointmentRequest, RlmQuestion, RlmSchedulePayload, ScheduleResponse};
pub use validation::{validate_appointment, validate_raw_object, FieldError};
