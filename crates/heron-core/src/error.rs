//! Dispatch error taxonomy.
//!
//! Every failure that can end a dispatch is a [`DispatchError`]. Each variant
//! maps to one HTTP status and one stable description, and converts into the
//! plain-text [`RuntimeResult`] sent back to the caller. Messages and sources
//! are for logs only; they never reach the response body.
//!
//! Handler code returns [`HandlerError`], which is either a classified
//! `DispatchError` or an arbitrary fault. Faults become
//! [`DispatchError::Internal`].

use http::StatusCode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::result::RuntimeResult;

/// Result alias for handler methods.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// A failure that aborts a dispatch.
///
/// # Example
///
/// ```
/// use heron_core::DispatchError;
/// use http::StatusCode;
///
/// let err = DispatchError::bad_request("malformed JSON body");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.description(), "Bad Request");
///
/// let result = err.into_result();
/// assert_eq!(result.body_text(), Some("Bad Request"));
/// ```
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No route matched the request.
    #[error("not found: {message}")]
    NotFound {
        /// What was not found.
        message: String,
    },

    /// The request was malformed or failed validation.
    #[error("bad request: {message}")]
    BadRequest {
        /// What was wrong.
        message: String,
        /// Per-input failures, when produced by validation.
        field_errors: Option<FieldErrors>,
    },

    /// The request body exceeded the configured limit.
    #[error("payload too large: limit is {limit} bytes")]
    PayloadTooLarge {
        /// The configured limit.
        limit: usize,
    },

    /// Anything else.
    #[error("internal error: {message}")]
    Internal {
        /// What failed.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl DispatchError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a bad-request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            field_errors: None,
        }
    }

    /// Creates a bad-request error listing every failed input.
    #[must_use]
    pub fn validation(field_errors: FieldErrors) -> Self {
        Self::BadRequest {
            message: format!("{} input(s) failed validation", field_errors.len()),
            field_errors: Some(field_errors),
        }
    }

    /// Creates a payload-too-large error.
    #[must_use]
    pub const fn payload_too_large(limit: usize) -> Self {
        Self::PayloadTooLarge { limit }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with an underlying cause.
    pub fn internal_with_source(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable, transport-independent text for the status.
    #[must_use]
    pub fn description(&self) -> &'static str {
        status_description(self.status_code())
    }

    /// True for 4xx errors.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Per-input validation failures, if any.
    #[must_use]
    pub const fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::BadRequest { field_errors, .. } => field_errors.as_ref(),
            _ => None,
        }
    }

    /// Builds the plain-text error result.
    #[must_use]
    pub fn into_result(self) -> RuntimeResult {
        RuntimeResult::status_text(self.status_code())
    }
}

/// Stable text for a status code: its canonical reason phrase.
#[must_use]
pub fn status_description(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Error")
}

/// Validation failures keyed by input name.
///
/// Keys are kept in first-failure order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{} input(s) failed validation", .fields.len())]
pub struct FieldErrors {
    /// Field key to messages.
    pub fields: IndexMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure for `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(message.into());
    }

    /// True if nothing failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of failed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Messages for one field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Returns `Ok(())` when empty, otherwise a validation error.
    pub fn into_result(self) -> Result<(), DispatchError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DispatchError::validation(self))
        }
    }
}

/// Error returned by handler methods.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A classified error, passed through with its status.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// An unclassified fault, reported as an internal error.
    #[error(transparent)]
    Fault(#[from] anyhow::Error),
}

impl HandlerError {
    /// Wraps any error as an unclassified fault.
    pub fn fault(error: impl Into<anyhow::Error>) -> Self {
        Self::Fault(error.into())
    }

    /// Classifies the error for the dispatcher.
    #[must_use]
    pub fn into_dispatch(self) -> DispatchError {
        match self {
            Self::Dispatch(err) => err,
            Self::Fault(err) => DispatchError::internal_with_source("handler fault", err),
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Fault(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_description() {
        let cases = [
            (DispatchError::not_found("GET /x"), 404, "Not Found"),
            (DispatchError::bad_request("bad"), 400, "Bad Request"),
            (DispatchError::payload_too_large(10), 413, "Payload Too Large"),
            (DispatchError::internal("boom"), 500, "Internal Server Error"),
        ];

        for (err, status, description) in cases {
            assert_eq!(err.status_code().as_u16(), status);
            assert_eq!(err.description(), description);
        }
    }

    #[test]
    fn test_into_result_hides_detail() {
        let err = DispatchError::internal_with_source(
            "database unreachable",
            anyhow::anyhow!("connection refused at 10.0.0.5"),
        );
        let result = err.into_result();

        assert_eq!(result.status_code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(result.body_text(), Some("Internal Server Error"));
        assert_eq!(result.header("content-type"), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn test_field_errors_aggregate() {
        let mut errors = FieldErrors::new();
        errors.add("id", "expected integer");
        errors.add("body", "missing required property 'name'");
        errors.add("id", "required");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("id").map(<[String]>::len), Some(2));

        let err = errors.into_result().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.field_errors().map(FieldErrors::len), Some(2));
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_handler_error_classification() {
        let passed = HandlerError::from(DispatchError::not_found("user 7")).into_dispatch();
        assert_eq!(passed.status_code(), StatusCode::NOT_FOUND);

        let fault = HandlerError::fault(anyhow::anyhow!("oops")).into_dispatch();
        assert_eq!(fault.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(std::error::Error::source(&fault).is_some());
    }
}
