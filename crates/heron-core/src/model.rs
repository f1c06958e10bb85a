//! The static application descriptor.
//!
//! A [`RuntimeApp`] is produced once at startup, usually by deserializing the
//! app metadata emitted at build time, and never mutated afterwards. Field
//! names use camelCase on the wire.
//!
//! ```
//! use heron_core::{InputLocation, RuntimeApp};
//!
//! let app: RuntimeApp = serde_json::from_value(serde_json::json!({
//!     "controllers": [{
//!         "handlerId": "users",
//!         "ctorArgSources": ["DATABASE_URL"],
//!         "initMethod": "connect",
//!         "routes": [{
//!             "method": "get",
//!             "pathPattern": "/users/:id",
//!             "targetMethod": "getUser",
//!             "inputs": [
//!                 { "location": "path", "name": "id", "declaredType": "integer", "required": true }
//!             ]
//!         }]
//!     }]
//! }))
//! .unwrap();
//!
//! let route = &app.controllers[0].routes[0];
//! assert_eq!(route.method, http::Method::GET);
//! assert_eq!(route.inputs[0].location, InputLocation::Path);
//! ```

use http::Method;
use serde::{Deserialize, Serialize};

/// Ordered collection of controllers making up one application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeApp {
    /// Controllers in declaration order.
    pub controllers: Vec<RuntimeController>,
}

impl RuntimeApp {
    /// Creates an app from a list of controllers.
    #[must_use]
    pub fn new(controllers: impl IntoIterator<Item = RuntimeController>) -> Self {
        Self {
            controllers: controllers.into_iter().collect(),
        }
    }

    /// Iterates over every route paired with its owning controller.
    pub fn routes(&self) -> impl Iterator<Item = (&RuntimeController, &RuntimeRoute)> {
        self.controllers
            .iter()
            .flat_map(|controller| controller.routes.iter().map(move |route| (controller, route)))
    }
}

/// A handler class and the routes bound to its methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeController {
    /// Registry key of the controller definition.
    pub handler_id: String,
    /// Environment variable names whose values are passed to the constructor, in order.
    #[serde(default)]
    pub ctor_arg_sources: Vec<String>,
    /// Hook run once after construction, before the first invocation completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_method: Option<String>,
    /// Routes served by this controller.
    #[serde(default)]
    pub routes: Vec<RuntimeRoute>,
}

impl RuntimeController {
    /// Creates a controller with no constructor arguments, init hook, or routes.
    #[must_use]
    pub fn new(handler_id: impl Into<String>) -> Self {
        Self {
            handler_id: handler_id.into(),
            ctor_arg_sources: Vec::new(),
            init_method: None,
            routes: Vec::new(),
        }
    }

    /// Appends a constructor argument source.
    #[must_use]
    pub fn ctor_arg(mut self, source: impl Into<String>) -> Self {
        self.ctor_arg_sources.push(source.into());
        self
    }

    /// Names the init hook.
    #[must_use]
    pub fn init_method(mut self, name: impl Into<String>) -> Self {
        self.init_method = Some(name.into());
        self
    }

    /// Appends a route.
    #[must_use]
    pub fn route(mut self, route: RuntimeRoute) -> Self {
        self.routes.push(route);
        self
    }
}

/// A `(method, path pattern)` bound to a controller method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeRoute {
    /// HTTP method.
    #[serde(with = "http_method_serde")]
    pub method: Method,
    /// Pattern with `:name` or `{name}` parameter segments.
    pub path_pattern: String,
    /// Name of the controller method to invoke.
    pub target_method: String,
    /// Call the method on the class without constructing an instance.
    #[serde(default, rename = "static")]
    pub static_method: bool,
    /// Argument descriptors in call order.
    #[serde(default)]
    pub inputs: Vec<RuntimeInput>,
}

impl RuntimeRoute {
    /// Creates an instance-method route with no inputs.
    #[must_use]
    pub fn new(method: Method, path_pattern: impl Into<String>, target_method: impl Into<String>) -> Self {
        Self {
            method,
            path_pattern: path_pattern.into(),
            target_method: target_method.into(),
            static_method: false,
            inputs: Vec::new(),
        }
    }

    /// Marks the route as targeting a static method.
    #[must_use]
    pub fn static_method(mut self) -> Self {
        self.static_method = true;
        self
    }

    /// Appends an input descriptor.
    #[must_use]
    pub fn input(mut self, input: RuntimeInput) -> Self {
        self.inputs.push(input);
        self
    }
}

/// Where an input is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputLocation {
    /// The whole native request object.
    Request,
    /// A query string parameter.
    Query,
    /// A path parameter captured by the router.
    Path,
    /// A request header.
    Header,
    /// A request cookie.
    Cookie,
    /// The request body.
    Body,
}

impl InputLocation {
    /// Returns the wire name of the location.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Query => "query",
            Self::Path => "path",
            Self::Header => "header",
            Self::Cookie => "cookie",
            Self::Body => "body",
        }
    }

    /// True for locations whose raw values are strings.
    #[must_use]
    pub const fn is_textual(&self) -> bool {
        matches!(self, Self::Query | Self::Path | Self::Header | Self::Cookie)
    }
}

impl std::fmt::Display for InputLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes one handler argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeInput {
    /// Where the value comes from.
    pub location: InputLocation,
    /// Parameter, header or cookie name. Ignored for `request` and `body`.
    #[serde(default)]
    pub name: String,
    /// Declared type, resolved by the validator.
    pub declared_type: String,
    /// Whether a missing value is a validation failure.
    #[serde(default)]
    pub required: bool,
    /// Set when the validator resolves the declared type to a list schema.
    /// Filled in when the dispatcher is built.
    #[serde(skip)]
    pub multi_valued: bool,
}

impl RuntimeInput {
    /// Creates an optional input.
    #[must_use]
    pub fn new(location: InputLocation, name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            location,
            name: name.into(),
            declared_type: declared_type.into(),
            required: false,
            multi_valued: false,
        }
    }

    /// A required path parameter.
    #[must_use]
    pub fn path(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self::new(InputLocation::Path, name, declared_type).required()
    }

    /// An optional query parameter.
    #[must_use]
    pub fn query(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self::new(InputLocation::Query, name, declared_type)
    }

    /// An optional header.
    #[must_use]
    pub fn header(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self::new(InputLocation::Header, name, declared_type)
    }

    /// An optional cookie.
    #[must_use]
    pub fn cookie(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self::new(InputLocation::Cookie, name, declared_type)
    }

    /// The request body.
    #[must_use]
    pub fn body(declared_type: impl Into<String>) -> Self {
        Self::new(InputLocation::Body, "", declared_type)
    }

    /// The native request object.
    #[must_use]
    pub fn request() -> Self {
        Self::new(InputLocation::Request, "", "request")
    }

    /// Marks the input as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// True when the declared type is a list: written `T[]` or `array`, or
    /// resolved to a list schema by the validator.
    ///
    /// Query parameters with a list type collect every repeated value.
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.multi_valued || is_array_type(&self.declared_type)
    }

    /// Key used when reporting validation failures for this input.
    #[must_use]
    pub fn field_key(&self) -> &str {
        match self.location {
            InputLocation::Body => "body",
            InputLocation::Request => "request",
            _ => &self.name,
        }
    }
}

/// True for declared type names denoting a list: `array` or `T[]`.
#[must_use]
pub fn is_array_type(declared_type: &str) -> bool {
    declared_type == "array" || declared_type.ends_with("[]")
}

mod http_method_serde {
    use http::Method;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(method: &Method, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(method.as_str())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Method, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.to_ascii_uppercase().parse().map_err(serde::de::Error::custom)
    }
}
