//! Gateway result object.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use heron_core::{ResultBody, RuntimeResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// What a gateway expects back from its function.
///
/// Cookies travel in their own list rather than as headers, and a binary
/// body is base64 encoded with `isBase64Encoded` set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    /// HTTP status.
    pub status_code: u16,
    /// Response headers, lower-cased.
    pub headers: IndexMap<String, String>,
    /// Rendered `Set-Cookie` values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cookies: Vec<String>,
    /// Body text, or base64 when `is_base64_encoded`.
    pub body: String,
    /// Whether `body` is base64.
    pub is_base64_encoded: bool,
}

impl GatewayResponse {
    /// Decodes the body, undoing base64 when the flag is set.
    pub fn body_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        if self.is_base64_encoded {
            STANDARD.decode(&self.body)
        } else {
            Ok(self.body.as_bytes().to_vec())
        }
    }
}

impl From<RuntimeResult> for GatewayResponse {
    fn from(result: RuntimeResult) -> Self {
        let cookies = result.set_cookie_values().collect();
        let (body, is_base64_encoded) = match result.body {
            ResultBody::Text(text) => (text, false),
            ResultBody::Binary(bytes) => (STANDARD.encode(&bytes), true),
        };

        Self {
            status_code: result.status_code.as_u16(),
            headers: result.headers,
            cookies,
            body,
            is_base64_encoded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_core::{Reply, SetCookie};
    use http::StatusCode;

    #[test]
    fn test_binary_result_is_base64() {
        let response = GatewayResponse::from(Reply::binary(vec![0u8, 159, 146, 150]).into_result());

        assert!(response.is_base64_encoded);
        assert_eq!(response.body, "AJ+Slg==");
        assert_eq!(response.body_bytes().unwrap(), vec![0u8, 159, 146, 150]);
        assert_eq!(
            response.headers.get("content-type").map(String::as_str),
            Some("application/octet-stream")
        );
    }

    #[test]
    fn test_cookies_are_listed_and_camel_cased() {
        let result = Reply::text("hi")
            .with_status(StatusCode::ACCEPTED)
            .with_cookie(SetCookie::new("a", "b"))
            .with_cookie(SetCookie::new("c", "d"))
            .into_result();
        let json = serde_json::to_value(GatewayResponse::from(result)).unwrap();

        assert_eq!(json["statusCode"], 202);
        assert_eq!(json["isBase64Encoded"], false);
        assert_eq!(json["cookies"], serde_json::json!(["a=b", "c=d"]));
        assert_eq!(json["body"], "hi");
    }
}
