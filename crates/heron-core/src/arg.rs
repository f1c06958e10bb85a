//! Handler arguments.
//!
//! Extractors produce raw [`Arg`]s, the validator coerces them, and the
//! dispatcher hands the ordered result to the handler as [`Args`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DispatchError;

/// One argument value.
#[derive(Debug, Clone)]
pub enum Arg {
    /// Structured data.
    Json(Value),
    /// Raw text.
    Text(String),
    /// Raw bytes.
    Binary(Bytes),
    /// The transport's native request object.
    Native(NativeRequest),
}

impl Arg {
    /// Short name of the variant, for error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Json(_) => "json",
            Self::Text(_) => "text",
            Self::Binary(_) => "binary",
            Self::Native(_) => "request",
        }
    }

    /// Returns the JSON value, if this is `Json`.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the text of a `Text` argument or of a JSON string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::Json(Value::String(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Returns the bytes, if this is `Binary`.
    #[must_use]
    pub const fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the native request, if this is `Native`.
    #[must_use]
    pub const fn as_native(&self) -> Option<&NativeRequest> {
        match self {
            Self::Native(native) => Some(native),
            _ => None,
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for Arg {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Arg {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Bytes> for Arg {
    fn from(bytes: Bytes) -> Self {
        Self::Binary(bytes)
    }
}

/// A type-erased handle to a transport's native request.
///
/// Handlers that declare a `request` input receive one and downcast it to the
/// type their transport uses.
///
/// ```
/// use heron_core::NativeRequest;
///
/// let native = NativeRequest::new(String::from("raw event"));
/// assert_eq!(native.downcast_ref::<String>().map(String::as_str), Some("raw event"));
/// assert!(native.downcast_ref::<u32>().is_none());
/// ```
#[derive(Clone)]
pub struct NativeRequest(Arc<dyn Any + Send + Sync>);

impl NativeRequest {
    /// Wraps a native request value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Wraps an already shared value.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self(value)
    }

    /// Borrows the value as `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Clones out the shared value as `Arc<T>`.
    #[must_use]
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.0).downcast::<T>().ok()
    }
}

impl fmt::Debug for NativeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeRequest").finish_non_exhaustive()
    }
}

/// Validated arguments in declared order. Absent optional inputs are `None`.
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: Vec<Option<Arg>>,
}

impl Args {
    /// Wraps an ordered argument list.
    #[must_use]
    pub fn new(values: Vec<Option<Arg>>) -> Self {
        Self { values }
    }

    /// Number of declared arguments, present or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the route declares no inputs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The argument at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arg> {
        self.values.get(index).and_then(Option::as_ref)
    }

    /// Takes the argument at `index`, leaving `None`.
    pub fn take(&mut self, index: usize) -> Option<Arg> {
        self.values.get_mut(index).and_then(Option::take)
    }

    /// The JSON value at `index`.
    #[must_use]
    pub fn json(&self, index: usize) -> Option<&Value> {
        self.get(index).and_then(Arg::as_json)
    }

    /// The string at `index`, from text or a JSON string.
    #[must_use]
    pub fn str(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(Arg::as_str)
    }

    /// The integer at `index`.
    #[must_use]
    pub fn i64(&self, index: usize) -> Option<i64> {
        self.json(index).and_then(Value::as_i64)
    }

    /// The boolean at `index`.
    #[must_use]
    pub fn bool(&self, index: usize) -> Option<bool> {
        self.json(index).and_then(Value::as_bool)
    }

    /// The bytes at `index`.
    #[must_use]
    pub fn bytes(&self, index: usize) -> Option<&Bytes> {
        self.get(index).and_then(Arg::as_bytes)
    }

    /// The native request at `index`, downcast to `T`.
    #[must_use]
    pub fn native<T: Any>(&self, index: usize) -> Option<&T> {
        self.get(index)
            .and_then(Arg::as_native)
            .and_then(NativeRequest::downcast_ref::<T>)
    }

    /// Deserializes the JSON value at `index` into `T`.
    ///
    /// A missing argument deserializes from `null`, so `Option<T>` targets
    /// accept absent optional inputs.
    pub fn parse<T: DeserializeOwned>(&self, index: usize) -> Result<T, DispatchError> {
        let value = self.json(index).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value)
            .map_err(|e| DispatchError::bad_request(format!("argument {index}: {e}")))
    }

    /// Consumes the list.
    #[must_use]
    pub fn into_inner(self) -> Vec<Option<Arg>> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct NewUser {
        name: String,
    }

    fn sample() -> Args {
        Args::new(vec![
            Some(Arg::Json(json!(42))),
            None,
            Some(Arg::Text("hello".into())),
            Some(Arg::Json(json!({ "name": "ada" }))),
            Some(Arg::Binary(Bytes::from_static(b"\x00\x01"))),
            Some(Arg::Native(NativeRequest::new(7_u16))),
        ])
    }

    #[test]
    fn test_typed_accessors() {
        let args = sample();
        assert_eq!(args.len(), 6);
        assert_eq!(args.i64(0), Some(42));
        assert!(args.get(1).is_none());
        assert_eq!(args.str(2), Some("hello"));
        assert_eq!(args.bytes(4).map(Bytes::len), Some(2));
        assert_eq!(args.native::<u16>(5), Some(&7));
        assert!(args.get(99).is_none());
    }

    #[test]
    fn test_parse() {
        let args = sample();
        let user: NewUser = args.parse(3).unwrap();
        assert_eq!(user, NewUser { name: "ada".into() });

        let missing: Option<NewUser> = args.parse(1).unwrap();
        assert!(missing.is_none());

        let err = args.parse::<NewUser>(0).unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_take() {
        let mut args = sample();
        assert!(matches!(args.take(2), Some(Arg::Text(_))));
        assert!(args.get(2).is_none());
    }
}
