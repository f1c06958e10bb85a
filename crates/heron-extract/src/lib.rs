//! # Heron Extract
//!
//! Input extraction for the Heron dispatcher.
//!
//! The dispatcher does not know how a transport represents a request. For each
//! declared [`RuntimeInput`] it asks an [`InputExtractor`] for the raw value, and
//! each transport supplies one implementation:
//!
//! | Extractor | Transport | Request representation |
//! |-----------|-----------|------------------------|
//! | [`BufferedExtractor`] | embedded HTTP server | `http::Request` with a fully buffered body |
//! | [`EventExtractor`] | serverless gateway | [`GatewayEvent`] with maps, a cookie list and a base64 flag |
//!
//! Extractors return raw values only. Coercion and required-ness are
//! the validator's job, so a missing input is `Ok(None)`, never an error.
//! Errors are reserved for bodies that cannot be decoded as declared.
//!
//! ## Body decoding by declared type
//!
//! | Declared type | Result |
//! |---------------|--------|
//! | `text` | the body as UTF-8 text |
//! | `binary` | the body bytes; the transport must mark the payload as binary |
//! | anything else | the body parsed as JSON |
//!
//! ## Example
//!
//! ```rust
//! use bytes::Bytes;
//! use heron_core::{Arg, RuntimeInput};
//! use heron_extract::{BufferedExtractor, InputExtractor};
//! use heron_router::Params;
//!
//! let request = http::Request::builder()
//!     .uri("/users/7?verbose=true")
//!     .header("X-Tenant", "acme")
//!     .body(Bytes::from_static(br#"{"name":"Ada"}"#))
//!     .unwrap();
//! let extractor = BufferedExtractor::new(request);
//!
//! let mut params = Params::new();
//! params.push("id", "7");
//!
//! let id = extractor.extract(&RuntimeInput::path("id", "integer"), &params).unwrap();
//! assert_eq!(id.as_ref().and_then(Arg::as_str), Some("7"));
//!
//! let tenant = extractor.extract(&RuntimeInput::header("x-tenant", "string"), &params).unwrap();
//! assert_eq!(tenant.as_ref().and_then(Arg::as_str), Some("acme"));
//!
//! let body = extractor.extract(&RuntimeInput::body("object"), &params).unwrap();
//! assert_eq!(body.as_ref().and_then(Arg::as_json), Some(&serde_json::json!({ "name": "Ada" })));
//! ```

#![doc(html_root_url = "https://docs.rs/heron-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod body;
mod buffered;
pub mod cookie;
mod event;
mod query;

pub use body::{decode_body, BodySource, BINARY_TYPE, TEXT_TYPE};
pub use buffered::BufferedExtractor;
pub use event::{EventExtractor, EventHttp, EventRequestContext, GatewayEvent};
pub use query::QueryParams;

use heron_core::{Arg, DispatchError, RuntimeInput};
use heron_router::Params;

/// Reads raw input values from one transport's request representation.
///
/// Implementations are built once per request by the transport adapter and
/// shared with the dispatcher for the whole pipeline.
pub trait InputExtractor: Send + Sync {
    /// Returns the raw value for `input`, or `None` if it is absent.
    ///
    /// `path_params` are the parameters captured by the router for the
    /// matched route.
    fn extract(&self, input: &RuntimeInput, path_params: &Params) -> Result<Option<Arg>, DispatchError>;
}

impl<E: InputExtractor + ?Sized> InputExtractor for &E {
    fn extract(&self, input: &RuntimeInput, path_params: &Params) -> Result<Option<Arg>, DispatchError> {
        (**self).extract(input, path_params)
    }
}

impl<E: InputExtractor + ?Sized> InputExtractor for Box<E> {
    fn extract(&self, input: &RuntimeInput, path_params: &Params) -> Result<Option<Arg>, DispatchError> {
        (**self).extract(input, path_params)
    }
}
