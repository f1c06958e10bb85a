//! Transport-agnostic response.

use bytes::Bytes;
use http::StatusCode;
use indexmap::IndexMap;

use crate::cookie::SetCookie;
use crate::error::status_description;

/// Content type of error and plain-text results.
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Content type used when nothing else applies.
pub const APPLICATION_JSON: &str = "application/json";

/// Content type of binary results.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultBody {
    /// UTF-8 text.
    Text(String),
    /// Raw bytes, to be base64 encoded by transports that require it.
    Binary(Bytes),
}

/// The outcome of one dispatch, before transport serialization.
///
/// Header names are lower-cased and unique; setting a header twice keeps the
/// last value. Cookies are unique by name and each one becomes its own
/// outgoing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeResult {
    /// Response status.
    pub status_code: StatusCode,
    /// Lower-cased header names to values.
    pub headers: IndexMap<String, String>,
    /// Cookie name to cookie.
    pub cookies: IndexMap<String, SetCookie>,
    /// Response body.
    pub body: ResultBody,
}

impl RuntimeResult {
    /// Creates a result with an empty text body and no headers.
    #[must_use]
    pub fn new(status_code: StatusCode) -> Self {
        Self {
            status_code,
            headers: IndexMap::new(),
            cookies: IndexMap::new(),
            body: ResultBody::Text(String::new()),
        }
    }

    /// A `text/plain` result whose body is the status description.
    #[must_use]
    pub fn status_text(status_code: StatusCode) -> Self {
        let mut result = Self::new(status_code);
        result.set_header("content-type", TEXT_PLAIN);
        result.body = ResultBody::Text(status_description(status_code).to_string());
        result
    }

    /// Sets a header, replacing any previous value.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Looks up a header case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Adds a cookie, replacing one with the same name.
    pub fn set_cookie(&mut self, cookie: SetCookie) {
        self.cookies.insert(cookie.name().to_string(), cookie);
    }

    /// The `content-type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// True if the body is binary.
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        matches!(self.body, ResultBody::Binary(_))
    }

    /// The body text, if the body is text.
    #[must_use]
    pub fn body_text(&self) -> Option<&str> {
        match &self.body {
            ResultBody::Text(text) => Some(text.as_str()),
            ResultBody::Binary(_) => None,
        }
    }

    /// The body as bytes, whichever kind it is.
    #[must_use]
    pub fn body_bytes(&self) -> Bytes {
        match &self.body {
            ResultBody::Text(text) => Bytes::copy_from_slice(text.as_bytes()),
            ResultBody::Binary(bytes) => bytes.clone(),
        }
    }

    /// Rendered `Set-Cookie` values, one per cookie.
    pub fn set_cookie_values(&self) -> impl Iterator<Item = String> + '_ {
        self.cookies.values().map(SetCookie::to_header_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_case_insensitive_last_write_wins() {
        let mut result = RuntimeResult::new(StatusCode::OK);
        result.set_header("X-Test", "1");
        result.set_header("x-test", "2");

        assert_eq!(result.headers.len(), 1);
        assert_eq!(result.header("X-TEST"), Some("2"));
    }

    #[test]
    fn test_cookies_stay_separate() {
        let mut result = RuntimeResult::new(StatusCode::OK);
        result.set_cookie(SetCookie::new("a", "b"));
        result.set_cookie(SetCookie::new("c", "d"));
        result.set_cookie(SetCookie::new("a", "z"));

        let values: Vec<_> = result.set_cookie_values().collect();
        assert_eq!(values, vec!["a=z", "c=d"]);
    }

    #[test]
    fn test_status_text() {
        let result = RuntimeResult::status_text(StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(result.body_text(), Some("Gateway Timeout"));
        assert_eq!(result.content_type(), Some(TEXT_PLAIN));
        assert!(!result.is_binary());
    }
}
