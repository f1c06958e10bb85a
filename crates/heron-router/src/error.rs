//! Router build errors.

use http::Method;
use thiserror::Error;

/// Errors raised while registering routes.
///
/// Matching never fails with an error; an unmatched request is simply `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// The same method and (normalized) pattern shape was registered twice.
    #[error("route conflict: {method} {pattern} collides with {existing}")]
    Conflict {
        /// Method of the rejected route.
        method: Method,
        /// Pattern of the rejected route.
        pattern: String,
        /// Pattern of the route already occupying the slot.
        existing: String,
    },

    /// A pattern could not be parsed.
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl RouterError {
    pub(crate) fn invalid(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}
