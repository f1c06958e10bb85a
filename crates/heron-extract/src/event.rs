//! Serverless gateway events.

use std::collections::HashMap;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use heron_core::{Arg, DispatchError, InputLocation, NativeRequest, RuntimeInput};
use heron_router::Params;
use serde::{Deserialize, Serialize};

use crate::body::{decode_body, BodySource};
use crate::cookie::find_in_list;
use crate::query::QueryParams;
use crate::InputExtractor;

/// An HTTP API gateway event (payload format 2.0).
///
/// Every field is optional on the wire. Missing maps are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayEvent {
    /// Payload format version, usually `"2.0"`.
    pub version: String,
    /// The gateway's route key, e.g. `"GET /users/{id}"`.
    pub route_key: String,
    /// Request path.
    pub raw_path: String,
    /// Undecoded query string, without the leading `?`.
    pub raw_query_string: String,
    /// Cookies as `name=value` strings.
    pub cookies: Vec<String>,
    /// Request headers. Repeated headers arrive comma joined.
    pub headers: HashMap<String, String>,
    /// Decoded query parameters; used when `raw_query_string` is empty.
    pub query_string_parameters: HashMap<String, String>,
    /// Path parameters the gateway already bound.
    pub path_parameters: HashMap<String, String>,
    /// Request context.
    pub request_context: EventRequestContext,
    /// Body text, base64 encoded when `is_base64_encoded` is set.
    pub body: Option<String>,
    /// Whether `body` is base64.
    pub is_base64_encoded: bool,
}

/// The `requestContext` object of a [`GatewayEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventRequestContext {
    /// Gateway request id.
    pub request_id: String,
    /// HTTP details.
    pub http: EventHttp,
}

/// The `requestContext.http` object of a [`GatewayEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventHttp {
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Client address.
    pub source_ip: String,
}

impl GatewayEvent {
    /// The request method, upper-cased. Falls back to the route key.
    #[must_use]
    pub fn method(&self) -> String {
        let method = if self.request_context.http.method.is_empty() {
            self.route_key.split_whitespace().next().unwrap_or_default()
        } else {
            self.request_context.http.method.as_str()
        };
        method.to_ascii_uppercase()
    }

    /// The request path: `rawPath`, else `requestContext.http.path`, else `/`.
    #[must_use]
    pub fn path(&self) -> &str {
        if !self.raw_path.is_empty() {
            &self.raw_path
        } else if !self.request_context.http.path.is_empty() {
            &self.request_context.http.path
        } else {
            "/"
        }
    }

    /// Body size after base64 decoding, without decoding it.
    #[must_use]
    pub fn decoded_body_len(&self) -> usize {
        let Some(body) = self.body.as_deref() else {
            return 0;
        };
        if self.is_base64_encoded {
            body.trim_end_matches('=').len() * 3 / 4
        } else {
            body.len()
        }
    }

    /// Decoded body bytes, for transports that need them raw.
    pub fn body_bytes(&self) -> Result<Vec<u8>, DispatchError> {
        match self.body.as_deref() {
            None => Ok(Vec::new()),
            Some(body) if self.is_base64_encoded => STANDARD
                .decode(body)
                .map_err(|e| DispatchError::bad_request(format!("invalid base64 body: {e}"))),
            Some(body) => Ok(body.as_bytes().to_vec()),
        }
    }
}

/// Reads inputs from a [`GatewayEvent`].
///
/// Header names are lower-cased once at construction. Path parameters bound
/// by the gateway take precedence over those captured by the router.
#[derive(Debug, Clone)]
pub struct EventExtractor {
    event: Arc<GatewayEvent>,
    headers: HashMap<String, String>,
    query: QueryParams,
}

impl EventExtractor {
    /// Wraps an event.
    #[must_use]
    pub fn new(event: GatewayEvent) -> Self {
        let headers = event
            .headers
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
            .collect();
        let query = if event.raw_query_string.is_empty() {
            QueryParams::from_pairs(
                event
                    .query_string_parameters
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            )
        } else {
            QueryParams::parse(&event.raw_query_string)
        };
        Self {
            event: Arc::new(event),
            headers,
            query,
        }
    }

    /// The wrapped event.
    #[must_use]
    pub fn event(&self) -> &GatewayEvent {
        &self.event
    }
}

impl InputExtractor for EventExtractor {
    fn extract(&self, input: &RuntimeInput, path_params: &Params) -> Result<Option<Arg>, DispatchError> {
        let name = input.name.as_str();
        let value = match input.location {
            InputLocation::Request => Some(Arg::Native(NativeRequest::from_arc(Arc::clone(&self.event)))),
            InputLocation::Query if input.is_array() => self.query.array(name).map(Arg::Json),
            InputLocation::Query => self.query.first(name).map(Arg::from),
            InputLocation::Path => self
                .event
                .path_parameters
                .get(name)
                .map(String::as_str)
                .or_else(|| path_params.get(name))
                .map(Arg::from),
            InputLocation::Header => self
                .headers
                .get(&name.to_ascii_lowercase())
                .map(|v| Arg::from(v.as_str())),
            InputLocation::Cookie => find_in_list(&self.event.cookies, name).map(Arg::from),
            InputLocation::Body => {
                let source = BodySource::Encoded {
                    body: self.event.body.as_deref().unwrap_or_default(),
                    base64: self.event.is_base64_encoded,
                };
                return decode_body(&input.declared_type, source);
            }
        };
        Ok(value)
    }
}
