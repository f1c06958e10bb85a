//! Gateway errors.

use thiserror::Error;

/// A raw gateway payload could not be handled.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The payload is not a gateway event.
    #[error("invalid gateway event: {0}")]
    InvalidEvent(#[source] serde_json::Error),

    /// The response could not be serialized.
    #[error("failed to encode gateway response: {0}")]
    Encode(#[source] serde_json::Error),
}
