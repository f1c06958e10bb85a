//! Per-method segment trie router for Heron.
//!
//! Routes are registered as `(method, pattern)` pairs during a build phase and
//! resolved against incoming `(method, path)` pairs afterwards. A built
//! [`Router`] is read-only and can be shared across tasks without locking.
//!
//! # Features
//!
//! - **One trie per method**: lookup only walks the tree for the request method
//! - **Path Parameters**: `:id` and `{id}` both capture a single segment
//! - **Literal precedence**: `/users/me` beats `/users/:id`, with backtracking
//!   into the parameter branch when the literal branch dead-ends deeper down
//! - **Exact arity**: no prefix matches and no implicit trailing wildcard
//! - **Conflict detection**: registering the same `(method, pattern)` twice fails
//!
//! # Example
//!
//! ```rust
//! use heron_router::Router;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.insert(Method::GET, "/users", "listUsers").unwrap();
//! router.insert(Method::GET, "/users/:id", "getUser").unwrap();
//!
//! let m = router.match_route(&Method::GET, "/users/42").unwrap();
//! assert_eq!(*m.value, "getUser");
//! assert_eq!(m.params.get("id"), Some("42"));
//!
//! assert!(router.match_route(&Method::DELETE, "/users/42").is_none());
//! ```
//!
//! # Architecture
//!
//! ```text
//!   GET ──► (root)                 POST ──► (root)
//!             │                               │
//!          "users" [listUsers]             "users" [createUser]
//!        ┌────┴────┐
//!      "me"       (:)
//!  [getMe]      [getUser]
//! ```
//!
//! Parameter edges are anonymous. The parameter names belong to the route
//! stored at the leaf, so `/a/:x` and `/a/:y/b` can share the same edge while
//! capturing under their own names.

mod error;
mod node;
mod params;
mod router;

pub use error::RouterError;
pub use node::{normalize_path, pattern_params};
pub use params::Params;
pub use router::Router;

/// A resolved route together with the captured path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    /// The value registered for the matched route.
    pub value: &'a T,
    /// The pattern the route was registered with.
    pub pattern: &'a str,
    /// Captured path parameters, in pattern order.
    pub params: Params,
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_literal_routes_match_with_empty_params() {
        let patterns = ["/", "/health", "/api/v1/users", "/api/v1/users/me"];
        let mut router = Router::new();
        for (i, pattern) in patterns.iter().enumerate() {
            router.insert(Method::GET, pattern, i).unwrap();
        }

        for (i, pattern) in patterns.iter().enumerate() {
            let m = router.match_route(&Method::GET, pattern).unwrap();
            assert_eq!(*m.value, i);
            assert!(m.params.is_empty());
        }
    }

    #[test]
    fn test_param_capture() {
        let mut router = Router::new();
        router.insert(Method::GET, "/users/:id", "getUser").unwrap();

        let m = router.match_route(&Method::GET, "/users/42").unwrap();
        assert_eq!(*m.value, "getUser");
        assert_eq!(m.params.get("id"), Some("42"));
        assert_eq!(m.params.len(), 1);
    }

    #[test]
    fn test_literal_wins_over_param() {
        let mut router = Router::new();
        router.insert(Method::GET, "/users/:id", "getUser").unwrap();
        router.insert(Method::GET, "/users/me", "getMe").unwrap();

        let m = router.match_route(&Method::GET, "/users/me").unwrap();
        assert_eq!(*m.value, "getMe");
        assert!(m.params.is_empty());

        let m = router.match_route(&Method::GET, "/users/you").unwrap();
        assert_eq!(*m.value, "getUser");
    }

    #[test]
    fn test_unregistered_is_no_match() {
        let mut router = Router::new();
        router.insert(Method::GET, "/users", "listUsers").unwrap();

        assert!(router.match_route(&Method::GET, "/posts").is_none());
        assert!(router.match_route(&Method::POST, "/users").is_none());
    }
}
