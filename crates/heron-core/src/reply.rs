//! What handlers return.

use bytes::Bytes;
use http::StatusCode;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::cookie::SetCookie;
use crate::result::{ResultBody, RuntimeResult, APPLICATION_JSON, OCTET_STREAM, TEXT_PLAIN};

/// Body of a [`Reply`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    /// No body.
    Empty,
    /// Serialized as JSON text.
    Json(Value),
    /// Sent as-is.
    Text(String),
    /// Sent as raw bytes.
    Binary(Bytes),
}

/// A handler's response: status, headers, cookies and body.
///
/// Status defaults to 200. Without an explicit `content-type` header the
/// content type follows the body kind.
///
/// # Example
///
/// ```
/// use heron_core::{Reply, SetCookie};
/// use http::StatusCode;
///
/// let result = Reply::json(serde_json::json!({ "id": 7 }))
///     .with_status(StatusCode::CREATED)
///     .with_header("X-Test", "1")
///     .with_cookie(SetCookie::new("a", "b"))
///     .into_result();
///
/// assert_eq!(result.status_code, StatusCode::CREATED);
/// assert_eq!(result.header("content-type"), Some("application/json"));
/// assert_eq!(result.body_text(), Some(r#"{"id":7}"#));
/// ```
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    headers: IndexMap<String, String>,
    cookies: IndexMap<String, SetCookie>,
    body: ReplyBody,
}

impl Reply {
    fn with_body(body: ReplyBody) -> Self {
        Self {
            status: StatusCode::OK,
            headers: IndexMap::new(),
            cookies: IndexMap::new(),
            body,
        }
    }

    /// A JSON reply.
    #[must_use]
    pub fn json(value: Value) -> Self {
        Self::with_body(ReplyBody::Json(value))
    }

    /// A JSON reply from any serializable value.
    pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::json(serde_json::to_value(value)?))
    }

    /// A plain-text reply.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_body(ReplyBody::Text(text.into()))
    }

    /// A binary reply.
    #[must_use]
    pub fn binary(bytes: impl Into<Bytes>) -> Self {
        Self::with_body(ReplyBody::Binary(bytes.into()))
    }

    /// A reply with no body.
    #[must_use]
    pub fn empty() -> Self {
        Self::with_body(ReplyBody::Empty)
    }

    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Sets a header. Names are case-insensitive and the last write wins.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Adds a cookie, replacing an earlier one with the same name.
    #[must_use]
    pub fn with_cookie(mut self, cookie: SetCookie) -> Self {
        self.cookies.insert(cookie.name().to_string(), cookie);
        self
    }

    /// The status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// The body.
    #[must_use]
    pub const fn body(&self) -> &ReplyBody {
        &self.body
    }

    /// Shapes the reply into a [`RuntimeResult`].
    #[must_use]
    pub fn into_result(self) -> RuntimeResult {
        let (default_type, body) = match self.body {
            ReplyBody::Empty => (APPLICATION_JSON, ResultBody::Text(String::new())),
            ReplyBody::Json(value) => (APPLICATION_JSON, ResultBody::Text(value.to_string())),
            ReplyBody::Text(text) => (TEXT_PLAIN, ResultBody::Text(text)),
            ReplyBody::Binary(bytes) => (OCTET_STREAM, ResultBody::Binary(bytes)),
        };

        let mut headers = self.headers;
        if !headers.contains_key("content-type") {
            headers.insert("content-type".to_string(), default_type.to_string());
        }

        RuntimeResult {
            status_code: self.status,
            headers,
            cookies: self.cookies,
            body,
        }
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Self::json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_content_type_is_json() {
        let result = Reply::json(json!({ "ok": true }))
            .with_header("X-Test", "1")
            .into_result();

        assert_eq!(result.status_code, StatusCode::OK);
        assert_eq!(result.header("content-type"), Some(APPLICATION_JSON));
        assert_eq!(result.header("x-test"), Some("1"));
    }

    #[test]
    fn test_explicit_content_type_wins() {
        let result = Reply::json(json!("<p>hi</p>"))
            .with_header("Content-Type", "text/html")
            .into_result();
        assert_eq!(result.content_type(), Some("text/html"));
        assert_eq!(result.headers.len(), 1);
    }

    #[test]
    fn test_body_kinds() {
        let scalar = Reply::json(json!("hi")).into_result();
        assert_eq!(scalar.body_text(), Some("\"hi\""));

        let text = Reply::text("hi").into_result();
        assert_eq!(text.body_text(), Some("hi"));
        assert_eq!(text.content_type(), Some(TEXT_PLAIN));

        let binary = Reply::binary(vec![1_u8, 2, 3]).into_result();
        assert!(binary.is_binary());
        assert_eq!(binary.content_type(), Some(OCTET_STREAM));

        let empty = Reply::empty().with_status(StatusCode::NO_CONTENT).into_result();
        assert_eq!(empty.body_text(), Some(""));
        assert_eq!(empty.content_type(), Some(APPLICATION_JSON));
        assert_eq!(empty.status_code, StatusCode::NO_CONTENT);
    }

    #[test]
    fn test_two_cookies_two_entries() {
        let result = Reply::empty()
            .with_cookie(SetCookie::new("a", "b"))
            .with_cookie(SetCookie::new("c", "d"))
            .into_result();

        assert_eq!(result.cookies.len(), 2);
        assert_eq!(result.set_cookie_values().count(), 2);
    }

    #[test]
    fn test_to_json() {
        #[derive(Serialize)]
        struct User {
            id: u32,
        }
        let result = Reply::to_json(&User { id: 3 }).unwrap().into_result();
        assert_eq!(result.body_text(), Some(r#"{"id":3}"#));
    }
}
