//! Extractor over a fully buffered `http::Request`.

use std::sync::Arc;

use bytes::Bytes;
use heron_core::{Arg, DispatchError, InputLocation, NativeRequest, RuntimeInput};
use heron_router::Params;
use http::{HeaderMap, Request};

use crate::body::{decode_body, BodySource};
use crate::cookie::find_in_header;
use crate::query::QueryParams;
use crate::InputExtractor;

/// Reads inputs from an `http::Request` whose body has already been read.
///
/// The query string is decoded once at construction. A `request` input
/// receives the whole `Arc<http::Request<Bytes>>` as a [`NativeRequest`].
#[derive(Debug, Clone)]
pub struct BufferedExtractor {
    request: Arc<Request<Bytes>>,
    query: QueryParams,
}

impl BufferedExtractor {
    /// Wraps a buffered request.
    #[must_use]
    pub fn new(request: Request<Bytes>) -> Self {
        let query = request.uri().query().map(QueryParams::parse).unwrap_or_default();
        Self {
            request: Arc::new(request),
            query,
        }
    }

    /// The wrapped request.
    #[must_use]
    pub fn request(&self) -> &Request<Bytes> {
        &self.request
    }

    /// Decoded query parameters.
    #[must_use]
    pub const fn query(&self) -> &QueryParams {
        &self.query
    }

    fn header(&self, name: &str) -> Option<String> {
        joined_header(self.request.headers(), name)
    }
}

/// Every value of a header joined with `", "`, or `None` if absent.
///
/// Values that are not visible ASCII are skipped.
pub(crate) fn joined_header(headers: &HeaderMap, name: &str) -> Option<String> {
    let name = name.to_ascii_lowercase();
    let values: Vec<&str> = headers
        .get_all(name.as_str())
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

impl InputExtractor for BufferedExtractor {
    fn extract(&self, input: &RuntimeInput, path_params: &Params) -> Result<Option<Arg>, DispatchError> {
        let value = match input.location {
            InputLocation::Request => Some(Arg::Native(NativeRequest::from_arc(Arc::clone(&self.request)))),
            InputLocation::Query if input.is_array() => self.query.array(&input.name).map(Arg::Json),
            InputLocation::Query => self.query.first(&input.name).map(Arg::from),
            InputLocation::Path => path_params.get(&input.name).map(Arg::from),
            InputLocation::Header => self.header(&input.name).map(Arg::Text),
            InputLocation::Cookie => self
                .header("cookie")
                .and_then(|header| find_in_header(&header, &input.name).map(Arg::from)),
            InputLocation::Body => {
                return decode_body(&input.declared_type, BodySource::Raw(self.request.body()));
            }
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extractor() -> BufferedExtractor {
        let request = Request::builder()
            .method("POST")
            .uri("/orgs/acme?tag=a&tag=b&limit=5")
            .header("Accept", "text/html")
            .header("accept", "application/json")
            .header("Cookie", "session=abc; theme=dark")
            .body(Bytes::from_static(b"[1,2,3]"))
            .unwrap();
        BufferedExtractor::new(request)
    }

    fn params() -> Params {
        let mut params = Params::new();
        params.push("org", "acme");
        params
    }

    fn text(arg: Option<Arg>) -> Option<String> {
        arg.and_then(|a| a.as_str().map(str::to_string))
    }

    #[test]
    fn test_query_scalar_and_array() {
        let ex = extractor();
        assert_eq!(
            text(ex.extract(&RuntimeInput::query("tag", "string"), &params()).unwrap()),
            Some("a".into())
        );
        let all = ex.extract(&RuntimeInput::query("tag", "string[]"), &params()).unwrap();
        assert_eq!(all.and_then(|a| a.as_json().cloned()), Some(json!(["a", "b"])));
        assert!(ex
            .extract(&RuntimeInput::query("page", "integer"), &params())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_headers_case_insensitive_and_joined() {
        let ex = extractor();
        assert_eq!(
            text(ex.extract(&RuntimeInput::header("ACCEPT", "string"), &params()).unwrap()),
            Some("text/html, application/json".into())
        );
    }

    #[test]
    fn test_cookie_and_path() {
        let ex = extractor();
        assert_eq!(
            text(ex.extract(&RuntimeInput::cookie("theme", "string"), &params()).unwrap()),
            Some("dark".into())
        );
        assert!(ex
            .extract(&RuntimeInput::cookie("missing", "string"), &params())
            .unwrap()
            .is_none());
        assert_eq!(
            text(ex.extract(&RuntimeInput::path("org", "string"), &params()).unwrap()),
            Some("acme".into())
        );
    }

    #[test]
    fn test_body_and_native_request() {
        let ex = extractor();
        let body = ex.extract(&RuntimeInput::body("integer[]"), &params()).unwrap();
        assert_eq!(body.and_then(|a| a.as_json().cloned()), Some(json!([1, 2, 3])));

        let native = ex.extract(&RuntimeInput::request(), &params()).unwrap().unwrap();
        let request = native
            .as_native()
            .and_then(NativeRequest::downcast_ref::<Request<Bytes>>)
            .unwrap();
        assert_eq!(request.method(), http::Method::POST);
    }
}
