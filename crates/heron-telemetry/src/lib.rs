//! # Heron Telemetry
//!
//! Structured logging for Heron services, built on `tracing` and
//! `tracing-subscriber`.
//!
//! Every dispatch runs inside a `dispatch` span:
//!
//! | Field | Value |
//! |-------|-------|
//! | `request_id` | UUID v7, taken from `x-request-id` when valid |
//! | `http.method` | request method |
//! | `http.path` | request path |
//! | `controller` | handler id, once a route matched |
//! | `handler` | target method, once a route matched |
//!
//! Client errors are logged at `warn`, internal errors at `error` with their
//! cause chain, controller initialization at `info`, pipeline steps at `debug`.

#![doc(html_root_url = "https://docs.rs/heron-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig};

/// Result alias for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
