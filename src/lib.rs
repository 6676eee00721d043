//! HTTP relay for the RLM capacity management API.
//!
//! Accepts appointment scheduling requests over a small REST surface and
//! forwards them, with the configured auth header, to the RLM
//! `AIScheduleConfirmation` endpoint. The upstream status and body are relayed
//! back to the caller.
//!
//! ```text
//! caller ── POST /schedule-appointment ──▶ rlm-relay ── POST + auth ──▶ RLM API
//!        ◀──────── upstream status/body ──            ◀── response ──
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`rlm`]: RLM payload types, question catalog, validation and client
//! - [`api`]: HTTP routes, handlers and OpenAPI document
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod rlm;
pub mod utils;

pub use config::Config;
pub use error::{ConfigError, RelayError, Result};
