//! Input validation.
//!
//! The dispatcher hands every raw value of a route to a [`Validator`] at once.
//! The validator coerces what it can and reports every failing input together
//! in one [`FieldErrors`], so a single bad input never hides another.

use std::borrow::Cow;
use std::collections::HashMap;

use serde_json::Value;

use crate::arg::{Arg, Args};
use crate::error::{DispatchError, FieldErrors};
use crate::model::{is_array_type, RuntimeInput};
use crate::schema::Schema;

/// Coerces and validates the raw inputs of one route.
pub trait Validator: Send + Sync {
    /// Validates `raw`, which is parallel to `inputs`.
    ///
    /// Returns the coerced arguments in declared order, a
    /// [`DispatchError::BadRequest`] carrying every failure, or an internal
    /// error when an input's declared type is unknown.
    fn validate(&self, inputs: &[RuntimeInput], raw: Vec<Option<Arg>>) -> Result<Args, DispatchError>;

    /// Whether `declared_type` is understood. Checked when the dispatcher is built.
    fn supports(&self, declared_type: &str) -> bool {
        let _ = declared_type;
        true
    }

    /// Whether `declared_type` is a list, so repeated query values are all kept.
    fn is_list(&self, declared_type: &str) -> bool {
        is_array_type(declared_type)
    }
}

/// How a declared type is checked.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDef {
    /// A JSON value matching the schema.
    Schema(Schema),
    /// Raw text, passed through unchanged.
    Text,
    /// Raw bytes.
    Binary,
    /// The native request object.
    Request,
}

/// The default [`Validator`]: a registry from declared type name to [`TypeDef`].
///
/// Built-in names are `string`, `integer`, `number`, `boolean`, `object`,
/// `json`, `any`, `array`, `text`, `binary` and `request`. Applications
/// register their own object schemas under any other name. Any schema type
/// `T` is also available as the list type `T[]`.
///
/// # Example
///
/// ```
/// use heron_core::schema::Schema;
/// use heron_core::{Arg, RuntimeInput, SchemaValidator, Validator};
///
/// let validator = SchemaValidator::new()
///     .register("NewUser", Schema::object([("name", Schema::string())]).require(["name"]));
///
/// let inputs = [RuntimeInput::query("limit", "integer"), RuntimeInput::body("NewUser")];
/// let args = validator
///     .validate(
///         &inputs,
///         vec![Some(Arg::from("10")), Some(Arg::Json(serde_json::json!({ "name": "Ada" })))],
///     )
///     .unwrap();
///
/// assert_eq!(args.i64(0), Some(10));
/// ```
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    types: HashMap<String, TypeDef>,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaValidator {
    /// Creates a validator with the built-in types.
    #[must_use]
    pub fn new() -> Self {
        let mut types = HashMap::new();
        types.insert("string".to_string(), TypeDef::Schema(Schema::string()));
        types.insert("integer".to_string(), TypeDef::Schema(Schema::integer()));
        types.insert("number".to_string(), TypeDef::Schema(Schema::number()));
        types.insert("boolean".to_string(), TypeDef::Schema(Schema::boolean()));
        types.insert("object".to_string(), TypeDef::Schema(Schema::object(Vec::<(&str, Schema)>::new())));
        types.insert("json".to_string(), TypeDef::Schema(Schema::any()));
        types.insert("any".to_string(), TypeDef::Schema(Schema::any()));
        types.insert("array".to_string(), TypeDef::Schema(Schema::array(Schema::any())));
        types.insert("text".to_string(), TypeDef::Text);
        types.insert("binary".to_string(), TypeDef::Binary);
        types.insert("request".to_string(), TypeDef::Request);
        Self { types }
    }

    /// Registers a schema under `name`, replacing any earlier definition.
    #[must_use]
    pub fn register(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.types.insert(name.into(), TypeDef::Schema(schema));
        self
    }

    /// Registers a non-schema type definition.
    #[must_use]
    pub fn register_def(mut self, name: impl Into<String>, def: TypeDef) -> Self {
        self.types.insert(name.into(), def);
        self
    }

    /// Resolves a declared type, expanding `T[]` to an array of `T`.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Cow<'_, TypeDef>> {
        if let Some(def) = self.types.get(name) {
            return Some(Cow::Borrowed(def));
        }
        let item = name.strip_suffix("[]")?;
        match self.resolve(item)?.as_ref() {
            TypeDef::Schema(schema) => Some(Cow::Owned(TypeDef::Schema(Schema::array(schema.clone())))),
            _ => None,
        }
    }

    fn check_one(def: &TypeDef, input: &RuntimeInput, raw: Arg) -> Result<Arg, Vec<String>> {
        match (def, raw) {
            (TypeDef::Text, Arg::Text(text)) => Ok(Arg::Text(text)),
            (TypeDef::Binary, Arg::Binary(bytes)) => Ok(Arg::Binary(bytes)),
            (TypeDef::Request, Arg::Native(native)) => Ok(Arg::Native(native)),
            (TypeDef::Schema(schema), raw) => {
                let value = match raw {
                    Arg::Json(value) if input.location.is_textual() => schema.coerce(value),
                    Arg::Json(value) => value,
                    Arg::Text(text) if input.location.is_textual() => schema.coerce(Value::String(text)),
                    Arg::Text(text) => Value::String(text),
                    other => return Err(vec![format!("expected JSON value, got {}", other.kind())]),
                };
                let violations = schema.validate(&value);
                if violations.is_empty() {
                    Ok(Arg::Json(value))
                } else {
                    Err(violations.iter().map(ToString::to_string).collect())
                }
            }
            (def, other) => Err(vec![format!(
                "expected {}, got {}",
                match def {
                    TypeDef::Text => "text",
                    TypeDef::Binary => "binary",
                    _ => "request",
                },
                other.kind()
            )]),
        }
    }
}

impl Validator for SchemaValidator {
    fn validate(&self, inputs: &[RuntimeInput], raw: Vec<Option<Arg>>) -> Result<Args, DispatchError> {
        if raw.len() != inputs.len() {
            return Err(DispatchError::internal(format!(
                "{} raw values for {} inputs",
                raw.len(),
                inputs.len()
            )));
        }

        let mut errors = FieldErrors::new();
        let mut values = Vec::with_capacity(inputs.len());

        for (input, raw) in inputs.iter().zip(raw) {
            let def = self.resolve(&input.declared_type).ok_or_else(|| {
                DispatchError::internal(format!("no type registered as '{}'", input.declared_type))
            })?;

            let raw = match raw {
                None | Some(Arg::Json(Value::Null)) => None,
                present => present,
            };

            match raw {
                None => {
                    if input.required {
                        errors.add(input.field_key(), "required");
                    }
                    values.push(None);
                }
                Some(raw) => match Self::check_one(&def, input, raw) {
                    Ok(arg) => values.push(Some(arg)),
                    Err(messages) => {
                        for message in messages {
                            errors.add(input.field_key(), message);
                        }
                        values.push(None);
                    }
                },
            }
        }

        errors.into_result()?;
        Ok(Args::new(values))
    }

    fn supports(&self, declared_type: &str) -> bool {
        self.resolve(declared_type).is_some()
    }

    fn is_list(&self, declared_type: &str) -> bool {
        matches!(
            self.resolve(declared_type).as_deref(),
            Some(TypeDef::Schema(Schema::Array { .. }))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arg::NativeRequest;
    use crate::model::InputLocation;
    use bytes::Bytes;
    use serde_json::json;

    fn user_schema() -> Schema {
        Schema::object([("name", Schema::string().min_length(1))]).require(["name"])
    }

    #[test]
    fn test_coerces_textual_locations() {
        let validator = SchemaValidator::new();
        let inputs = [
            RuntimeInput::path("id", "integer"),
            RuntimeInput::query("verbose", "boolean"),
            RuntimeInput::header("x-tag", "string"),
        ];

        let args = validator
            .validate(
                &inputs,
                vec![
                    Some(Arg::from("42")),
                    Some(Arg::from("true")),
                    Some(Arg::from("7")),
                ],
            )
            .unwrap();

        assert_eq!(args.i64(0), Some(42));
        assert_eq!(args.bool(1), Some(true));
        assert_eq!(args.json(2), Some(&json!("7")));
    }

    #[test]
    fn test_list_types_resolve_through_registry() {
        let validator = SchemaValidator::new()
            .register("Tags", Schema::array(Schema::string()))
            .register("NewUser", user_schema());

        assert!(validator.is_list("Tags"));
        assert!(validator.is_list("array"));
        assert!(validator.is_list("NewUser[]"));
        assert!(!validator.is_list("NewUser"));
        assert!(!validator.is_list("binary"));
        assert!(!validator.is_list("Unknown[]"));
    }

    #[test]
    fn test_body_is_not_coerced() {
        let validator = SchemaValidator::new();
        let inputs = [RuntimeInput::body("integer")];
        let err = validator
            .validate(&inputs, vec![Some(Arg::Json(json!("42")))])
            .unwrap_err();
        assert!(err.field_errors().unwrap().get("body").is_some());
    }

    #[test]
    fn test_failures_are_aggregated() {
        let validator = SchemaValidator::new().register("NewUser", user_schema());
        let inputs = [
            RuntimeInput::path("id", "integer"),
            RuntimeInput::query("limit", "integer").required(),
            RuntimeInput::body("NewUser"),
            RuntimeInput::query("page", "integer"),
        ];

        let err = validator
            .validate(
                &inputs,
                vec![Some(Arg::from("abc")), None, Some(Arg::Json(json!({}))), None],
            )
            .unwrap_err();

        let fields = err.field_errors().unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields.get("limit"), Some(&["required".to_string()][..]));
        assert!(fields.get("id").is_some());
        assert!(fields.get("body").is_some());
        assert!(fields.get("page").is_none());
    }

    #[test]
    fn test_passthrough_kinds() {
        let validator = SchemaValidator::new();
        let inputs = [
            RuntimeInput::body("binary"),
            RuntimeInput::request(),
            RuntimeInput::new(InputLocation::Body, "", "text"),
        ];

        let args = validator
            .validate(
                &inputs,
                vec![
                    Some(Arg::Binary(Bytes::from_static(b"\x01"))),
                    Some(Arg::Native(NativeRequest::new(5_u8))),
                    Some(Arg::Text("hi".into())),
                ],
            )
            .unwrap();

        assert_eq!(args.bytes(0).map(|b| b.as_ref()), Some(&b"\x01"[..]));
        assert_eq!(args.native::<u8>(1), Some(&5));
        assert_eq!(args.str(2), Some("hi"));
    }

    #[test]
    fn test_kind_mismatch() {
        let validator = SchemaValidator::new();
        let err = validator
            .validate(&[RuntimeInput::body("binary")], vec![Some(Arg::from("text"))])
            .unwrap_err();
        assert_eq!(
            err.field_errors().unwrap().get("body"),
            Some(&["expected binary, got text".to_string()][..])
        );
    }

    #[test]
    fn test_list_types() {
        let validator = SchemaValidator::new();
        assert!(validator.supports("integer[]"));
        assert!(validator.supports("integer[][]"));
        assert!(!validator.supports("text[]"));

        let inputs = [RuntimeInput::query("ids", "integer[]")];
        let args = validator
            .validate(&inputs, vec![Some(Arg::Json(json!(["1", "2"])))])
            .unwrap();
        assert_eq!(args.json(0), Some(&json!([1, 2])));

        let args = validator.validate(&inputs, vec![Some(Arg::from("3"))]).unwrap();
        assert_eq!(args.json(0), Some(&json!([3])));
    }

    #[test]
    fn test_unknown_type_is_internal() {
        let validator = SchemaValidator::new();
        assert!(!validator.supports("Mystery"));
        let err = validator
            .validate(&[RuntimeInput::body("Mystery")], vec![None])
            .unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
