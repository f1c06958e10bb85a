//! JSON value schemas.
//!
//! A small structural schema language covering what declared input types need:
//! scalar types with bounds, arrays, objects with required properties, and
//! `any`. Validation walks the whole value and reports every violation rather
//! than stopping at the first.
//!
//! # Example
//!
//! ```
//! use heron_core::schema::Schema;
//! use serde_json::json;
//!
//! let schema = Schema::object([
//!     ("name", Schema::string().min_length(1)),
//!     ("age", Schema::integer().minimum(0)),
//! ])
//! .require(["name"]);
//!
//! assert!(schema.validate(&json!({ "name": "Ada", "age": 36 })).is_empty());
//!
//! let violations = schema.validate(&json!({ "age": -1 }));
//! assert_eq!(violations.len(), 2);
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A structural schema for JSON values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schema {
    /// A string.
    String {
        /// Minimum length in characters.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        /// Maximum length in characters.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    /// An integer.
    Integer {
        /// Inclusive lower bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<i64>,
        /// Inclusive upper bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<i64>,
    },
    /// Any JSON number.
    Number {
        /// Inclusive lower bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
        /// Inclusive upper bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<f64>,
    },
    /// `true` or `false`.
    Boolean,
    /// An array of `items`.
    Array {
        /// Schema for each element.
        items: Box<Schema>,
        /// Minimum element count.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_items: Option<usize>,
        /// Maximum element count.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_items: Option<usize>,
    },
    /// An object. Unlisted properties are allowed.
    Object {
        /// Known properties.
        #[serde(default)]
        properties: IndexMap<String, Schema>,
        /// Properties that must be present and non-null.
        #[serde(default)]
        required: Vec<String>,
    },
    /// Anything, including `null`.
    Any,
}

impl Schema {
    /// A string schema.
    #[must_use]
    pub const fn string() -> Self {
        Self::String {
            min_length: None,
            max_length: None,
        }
    }

    /// An integer schema.
    #[must_use]
    pub const fn integer() -> Self {
        Self::Integer {
            minimum: None,
            maximum: None,
        }
    }

    /// A number schema.
    #[must_use]
    pub const fn number() -> Self {
        Self::Number {
            minimum: None,
            maximum: None,
        }
    }

    /// A boolean schema.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::Boolean
    }

    /// An array schema.
    #[must_use]
    pub fn array(items: Self) -> Self {
        Self::Array {
            items: Box::new(items),
            min_items: None,
            max_items: None,
        }
    }

    /// An object schema from `(name, schema)` pairs.
    #[must_use]
    pub fn object<'a>(properties: impl IntoIterator<Item = (&'a str, Self)>) -> Self {
        Self::Object {
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema))
                .collect(),
            required: Vec::new(),
        }
    }

    /// A schema accepting any value.
    #[must_use]
    pub const fn any() -> Self {
        Self::Any
    }

    /// Marks object properties as required. No effect on other schemas.
    #[must_use]
    pub fn require<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        if let Self::Object { required, .. } = &mut self {
            required.extend(names.into_iter().map(str::to_string));
        }
        self
    }

    /// Sets the minimum string length.
    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        if let Self::String { min_length, .. } = &mut self {
            *min_length = Some(len);
        }
        self
    }

    /// Sets the maximum string length.
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        if let Self::String { max_length, .. } = &mut self {
            *max_length = Some(len);
        }
        self
    }

    /// Sets the integer lower bound.
    #[must_use]
    pub fn minimum(mut self, min: i64) -> Self {
        if let Self::Integer { minimum, .. } = &mut self {
            *minimum = Some(min);
        }
        self
    }

    /// Sets the integer upper bound.
    #[must_use]
    pub fn maximum(mut self, max: i64) -> Self {
        if let Self::Integer { maximum, .. } = &mut self {
            *maximum = Some(max);
        }
        self
    }

    /// Sets the minimum array length.
    #[must_use]
    pub fn min_items(mut self, min: usize) -> Self {
        if let Self::Array { min_items, .. } = &mut self {
            *min_items = Some(min);
        }
        self
    }

    /// Sets the maximum array length.
    #[must_use]
    pub fn max_items(mut self, max: usize) -> Self {
        if let Self::Array { max_items, .. } = &mut self {
            *max_items = Some(max);
        }
        self
    }

    /// Validates `value`, returning every violation found.
    #[must_use]
    pub fn validate(&self, value: &Value) -> Vec<Violation> {
        let mut violations = Vec::new();
        self.check(value, "$", &mut violations);
        violations
    }

    /// Converts a string from a textual location into the value this schema expects.
    ///
    /// Numbers and booleans are parsed, arrays convert each element, and
    /// object or `any` schemas try JSON first and fall back to the string.
    /// A string that cannot be converted is returned unchanged so validation
    /// reports the mismatch.
    #[must_use]
    pub fn coerce(&self, value: Value) -> Value {
        match (self, value) {
            (Self::Integer { .. }, Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or(Value::String(s)),
            (Self::Number { .. }, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map_or(Value::String(s), Value::Number),
            (Self::Boolean, Value::String(s)) => match s.as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::String(s),
            },
            (Self::Array { items, .. }, Value::Array(values)) => {
                Value::Array(values.into_iter().map(|v| items.coerce(v)).collect())
            }
            (Self::Array { items, .. }, Value::String(s)) => Value::Array(vec![items.coerce(Value::String(s))]),
            (Self::Object { .. } | Self::Any, Value::String(s)) => {
                serde_json::from_str(&s).unwrap_or(Value::String(s))
            }
            (_, value) => value,
        }
    }

    fn check(&self, value: &Value, path: &str, out: &mut Vec<Violation>) {
        let mut fail = |message: String| {
            out.push(Violation {
                path: path.to_string(),
                message,
            });
        };

        match self {
            Self::Any => {}

            Self::String {
                min_length,
                max_length,
            } => {
                let Some(s) = value.as_str() else {
                    return fail(format!("expected string, got {}", type_name(value)));
                };
                let len = s.chars().count();
                if let Some(min) = min_length.filter(|min| len < *min) {
                    fail(format!("length {len} is less than minimum {min}"));
                }
                if let Some(max) = max_length.filter(|max| len > *max) {
                    fail(format!("length {len} is greater than maximum {max}"));
                }
            }

            Self::Integer { minimum, maximum } => {
                let Some(n) = value.as_i64() else {
                    return fail(format!("expected integer, got {}", type_name(value)));
                };
                if let Some(min) = minimum.filter(|min| n < *min) {
                    fail(format!("value {n} is less than minimum {min}"));
                }
                if let Some(max) = maximum.filter(|max| n > *max) {
                    fail(format!("value {n} is greater than maximum {max}"));
                }
            }

            Self::Number { minimum, maximum } => {
                let Some(n) = value.as_f64() else {
                    return fail(format!("expected number, got {}", type_name(value)));
                };
                if let Some(min) = minimum.filter(|min| n < *min) {
                    fail(format!("value {n} is less than minimum {min}"));
                }
                if let Some(max) = maximum.filter(|max| n > *max) {
                    fail(format!("value {n} is greater than maximum {max}"));
                }
            }

            Self::Boolean => {
                if !value.is_boolean() {
                    fail(format!("expected boolean, got {}", type_name(value)));
                }
            }

            Self::Array {
                items,
                min_items,
                max_items,
            } => {
                let Some(values) = value.as_array() else {
                    return fail(format!("expected array, got {}", type_name(value)));
                };
                let len = values.len();
                if let Some(min) = min_items.filter(|min| len < *min) {
                    fail(format!("{len} items is less than minimum {min}"));
                }
                if let Some(max) = max_items.filter(|max| len > *max) {
                    fail(format!("{len} items is greater than maximum {max}"));
                }
                for (index, item) in values.iter().enumerate() {
                    items.check(item, &format!("{path}[{index}]"), out);
                }
            }

            Self::Object {
                properties,
                required,
            } => {
                let Some(object) = value.as_object() else {
                    return fail(format!("expected object, got {}", type_name(value)));
                };
                for name in required {
                    if object.get(name).map_or(true, Value::is_null) {
                        out.push(Violation {
                            path: format!("{path}.{name}"),
                            message: format!("missing required property '{name}'"),
                        });
                    }
                }
                for (name, schema) in properties {
                    match object.get(name) {
                        None | Some(Value::Null) => {}
                        Some(item) => schema.check(item, &format!("{path}.{name}"), out),
                    }
                }
            }
        }
    }
}

/// One schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON path of the offending value, rooted at `$`.
    pub path: String,
    /// What is wrong.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path == "$" {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
