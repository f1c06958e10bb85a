//! Body decoding by declared type.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use heron_core::{Arg, DispatchError};

/// Declared type for a raw text body.
pub const TEXT_TYPE: &str = "text";

/// Declared type for a raw binary body.
pub const BINARY_TYPE: &str = "binary";

/// How a transport delivered the body.
#[derive(Debug, Clone, Copy)]
pub enum BodySource<'a> {
    /// Raw bytes, as read off a socket. Always binary-capable.
    Raw(&'a Bytes),
    /// Text carried in an event, base64 encoded when `base64` is set.
    Encoded {
        /// The body text.
        body: &'a str,
        /// Whether `body` is base64.
        base64: bool,
    },
}

impl BodySource<'_> {
    fn is_empty(&self) -> bool {
        match self {
            Self::Raw(bytes) => bytes.is_empty(),
            Self::Encoded { body, .. } => body.is_empty(),
        }
    }

    fn into_bytes(self) -> Result<Bytes, DispatchError> {
        match self {
            Self::Raw(bytes) => Ok(bytes.clone()),
            Self::Encoded { body, base64: true } => STANDARD
                .decode(body)
                .map(Bytes::from)
                .map_err(|e| DispatchError::bad_request(format!("invalid base64 body: {e}"))),
            Self::Encoded { body, base64: false } => Ok(Bytes::copy_from_slice(body.as_bytes())),
        }
    }
}

/// Decodes a body for a route input of `declared_type`.
///
/// An empty body is absent. A `binary` declaration requires a binary-capable
/// source; an event body not flagged as base64 is rejected with 400.
///
/// ```
/// use heron_extract::{decode_body, BodySource};
///
/// let err = decode_body("binary", BodySource::Encoded { body: "AAEC", base64: false }).unwrap_err();
/// assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
///
/// let bytes = decode_body("binary", BodySource::Encoded { body: "AAEC", base64: true }).unwrap();
/// assert_eq!(bytes.unwrap().as_bytes().map(|b| b.to_vec()), Some(vec![0, 1, 2]));
/// ```
pub fn decode_body(declared_type: &str, source: BodySource<'_>) -> Result<Option<Arg>, DispatchError> {
    if source.is_empty() {
        return Ok(None);
    }

    match declared_type {
        TEXT_TYPE => {
            if let BodySource::Encoded { body, base64: false } = source {
                return Ok(Some(Arg::Text(body.to_string())));
            }
            let bytes = source.into_bytes()?;
            String::from_utf8(bytes.to_vec())
                .map(|text| Some(Arg::Text(text)))
                .map_err(|_| DispatchError::bad_request("text body is not valid UTF-8"))
        }
        BINARY_TYPE => {
            if let BodySource::Encoded { base64: false, .. } = source {
                return Err(DispatchError::bad_request(
                    "binary body declared but the payload is not marked as base64-encoded",
                ));
            }
            source.into_bytes().map(|bytes| Some(Arg::Binary(bytes)))
        }
        _ => {
            let bytes = source.into_bytes()?;
            serde_json::from_slice(&bytes)
                .map(|value| Some(Arg::Json(value)))
                .map_err(|e| DispatchError::bad_request(format!("malformed JSON body: {e}")))
        }
    }
}
