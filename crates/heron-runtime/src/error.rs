//! Errors raised while building a dispatcher.

use heron_router::RouterError;
use http::Method;
use thiserror::Error;

/// The app descriptor cannot be served.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A route pattern is malformed or collides with another route.
    #[error(transparent)]
    Route(#[from] RouterError),

    /// A route's pattern parameters differ from its path inputs.
    #[error(
        "route {method} {pattern} of '{handler_id}': pattern parameters {pattern_params:?} do not match path inputs {path_inputs:?}"
    )]
    PathParams {
        /// Owning controller.
        handler_id: String,
        /// Route method.
        method: Method,
        /// Route pattern.
        pattern: String,
        /// Parameter names found in the pattern, sorted.
        pattern_params: Vec<String>,
        /// Names of path-located inputs, sorted.
        path_inputs: Vec<String>,
    },

    /// Two controllers declare the same handler id.
    #[error("controller '{handler_id}' is declared more than once")]
    DuplicateController {
        /// The repeated id.
        handler_id: String,
    },

    /// An input declares a type the validator does not know.
    #[error("route {method} {pattern} of '{handler_id}': unsupported declared type '{declared_type}'")]
    UnsupportedType {
        /// Owning controller.
        handler_id: String,
        /// Route method.
        method: Method,
        /// Route pattern.
        pattern: String,
        /// The unknown type name.
        declared_type: String,
    },
}
