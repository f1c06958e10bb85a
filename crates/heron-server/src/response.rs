//! `RuntimeResult` to hyper response.

use bytes::Bytes;
use heron_core::{RequestId, ResultBody, RuntimeResult};
use http::header::SET_COOKIE;
use http::{HeaderName, HeaderValue, Response};
use http_body_util::Full;

/// Body type of every response the server writes.
pub type ResponseBody = Full<Bytes>;

/// The HTTP response type.
pub type HttpResponse = Response<ResponseBody>;

/// Header carrying the request id, read from requests and echoed on responses.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Serializes a dispatch result onto HTTP.
///
/// Each cookie becomes its own `set-cookie` header. Headers whose name or
/// value is not valid HTTP are dropped with a warning.
pub fn into_response(result: RuntimeResult, request_id: RequestId) -> HttpResponse {
    let body = match result.body {
        ResultBody::Text(text) => Bytes::from(text),
        ResultBody::Binary(bytes) => bytes,
    };

    let mut response = Response::new(Full::new(body));
    *response.status_mut() = result.status_code;
    let headers = response.headers_mut();

    for (name, value) in &result.headers {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "dropping invalid response header"),
        }
    }

    for cookie in result.cookies.values() {
        match HeaderValue::from_str(&cookie.to_header_value()) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(_) => tracing::warn!(cookie = cookie.name(), "dropping invalid cookie"),
        }
    }

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        headers.insert(REQUEST_ID_HEADER, value);
    }

    response
}
