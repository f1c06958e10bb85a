//! The main router type.

use std::collections::HashMap;

use http::Method;

use crate::error::RouterError;
use crate::node::{parse_pattern, split_path, Leaf, Node, Segment};
use crate::params::Params;
use crate::RouteMatch;

/// Maps `(method, path pattern)` keys to values of type `T`.
///
/// Build the router once, then share it read-only. Registration takes
/// `&mut self` and matching takes `&self`, so the borrow checker keeps the two
/// phases apart.
///
/// # Example
///
/// ```rust
/// use heron_router::{Router, RouterError};
/// use http::Method;
///
/// let mut router = Router::new();
/// router.insert(Method::GET, "/users/me", 1).unwrap();
/// router.insert(Method::GET, "/users/{id}", 2).unwrap();
///
/// assert_eq!(router.match_route(&Method::GET, "/users/me").map(|m| *m.value), Some(1));
/// assert_eq!(router.match_route(&Method::GET, "/users/9").map(|m| *m.value), Some(2));
///
/// let dup = router.insert(Method::GET, "/users/:userId", 3);
/// assert!(matches!(dup, Err(RouterError::Conflict { .. })));
/// ```
#[derive(Debug, Clone)]
pub struct Router<T> {
    trees: HashMap<Method, Node<T>>,
    len: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self {
            trees: HashMap::new(),
            len: 0,
        }
    }
}

impl<T> Router<T> {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value` under `method` and `pattern`.
    ///
    /// Two patterns conflict when they have the same shape after
    /// normalization, so `/users/:id` and `/users/{userId}/` collide.
    pub fn insert(&mut self, method: Method, pattern: &str, value: T) -> Result<(), RouterError> {
        let segments = parse_pattern(pattern)?;
        let param_names = segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Param(name) => Some((*name).to_string()),
                Segment::Literal(_) => None,
            })
            .collect();

        let leaf = Leaf {
            value,
            pattern: pattern.to_string(),
            param_names,
        };

        self.trees
            .entry(method.clone())
            .or_default()
            .insert(&segments, leaf)
            .map_err(|existing| RouterError::Conflict {
                method,
                pattern: pattern.to_string(),
                existing,
            })?;

        self.len += 1;
        Ok(())
    }

    /// Resolves a request method and path to a registered route.
    ///
    /// Returns `None` when no route of that method has exactly this shape.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        let tree = self.trees.get(method)?;
        let segments = split_path(path);
        let mut captures = Vec::new();
        let leaf = tree.find(&segments, &mut captures)?;

        let params = leaf
            .param_names
            .iter()
            .zip(captures)
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect::<Params>();

        Some(RouteMatch {
            value: &leaf.value,
            pattern: &leaf.pattern,
            params,
        })
    }

    /// Returns true if any method has a route for `path`.
    #[must_use]
    pub fn has_path(&self, path: &str) -> bool {
        let segments = split_path(path);
        self.trees
            .values()
            .any(|tree| tree.find(&segments, &mut Vec::new()).is_some())
    }

    /// Number of registered routes across all methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(routes: &[(Method, &str, &'static str)]) -> Router<&'static str> {
        let mut router = Router::new();
        for (method, pattern, id) in routes {
            router.insert(method.clone(), pattern, *id).unwrap();
        }
        router
    }

    #[test]
    fn test_methods_are_separate_tries() {
        let router = router(&[
            (Method::GET, "/users", "listUsers"),
            (Method::POST, "/users", "createUser"),
            (Method::DELETE, "/users/:id", "deleteUser"),
        ]);

        assert_eq!(router.len(), 3);
        assert_eq!(
            router.match_route(&Method::GET, "/users").map(|m| *m.value),
            Some("listUsers")
        );
        assert_eq!(
            router.match_route(&Method::POST, "/users").map(|m| *m.value),
            Some("createUser")
        );
        assert!(router.match_route(&Method::GET, "/users/1").is_none());
        assert!(router.has_path("/users/1"));
    }

    #[test]
    fn test_no_prefix_or_extension_match() {
        let router = router(&[(Method::GET, "/users/:id", "getUser")]);

        assert!(router.match_route(&Method::GET, "/users").is_none());
        assert!(router.match_route(&Method::GET, "/users/1/posts").is_none());
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let router = router(&[
            (Method::GET, "/", "root"),
            (Method::GET, "/health/", "health"),
        ]);

        assert_eq!(router.match_route(&Method::GET, "/").map(|m| *m.value), Some("root"));
        assert_eq!(
            router.match_route(&Method::GET, "/health").map(|m| *m.value),
            Some("health")
        );
        assert_eq!(
            router.match_route(&Method::GET, "/health/").map(|m| *m.value),
            Some("health")
        );
    }

    #[test]
    fn test_backtracks_from_literal_to_param() {
        let router = router(&[
            (Method::GET, "/users/me/settings", "mySettings"),
            (Method::GET, "/users/:id/profile", "profile"),
        ]);

        let m = router.match_route(&Method::GET, "/users/me/profile").unwrap();
        assert_eq!(*m.value, "profile");
        assert_eq!(m.params.get("id"), Some("me"));

        let m = router.match_route(&Method::GET, "/users/me/settings").unwrap();
        assert_eq!(*m.value, "mySettings");
        assert!(m.params.is_empty());
    }

    #[test]
    fn test_names_come_from_the_matched_route() {
        let router = router(&[
            (Method::GET, "/orgs/:org", "getOrg"),
            (Method::GET, "/orgs/{orgId}/members/{memberId}", "getMember"),
        ]);

        let m = router.match_route(&Method::GET, "/orgs/acme").unwrap();
        assert_eq!(m.params.get("org"), Some("acme"));
        assert_eq!(m.pattern, "/orgs/:org");

        let m = router.match_route(&Method::GET, "/orgs/acme/members/7").unwrap();
        assert_eq!(*m.value, "getMember");
        assert_eq!(m.params.get("orgId"), Some("acme"));
        assert_eq!(m.params.get("memberId"), Some("7"));
        assert_eq!(m.params.get("org"), None);
    }

    #[test]
    fn test_empty_segment_does_not_bind_param() {
        let router = router(&[(Method::GET, "/a/:x/b", "ab")]);
        assert!(router.match_route(&Method::GET, "/a//b").is_none());
    }

    #[test]
    fn test_duplicate_is_conflict() {
        let mut router = router(&[(Method::GET, "/users/:id", "getUser")]);

        let err = router
            .insert(Method::GET, "/users/{userId}/", "other")
            .unwrap_err();
        match err {
            RouterError::Conflict {
                method, existing, ..
            } => {
                assert_eq!(method, Method::GET);
                assert_eq!(existing, "/users/:id");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(router.len(), 1);

        // Same shape under another method is fine.
        router.insert(Method::PUT, "/users/:id", "putUser").unwrap();
        assert_eq!(router.len(), 2);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let mut router: Router<()> = Router::new();
        assert!(matches!(
            router.insert(Method::GET, "/users/:", ()),
            Err(RouterError::InvalidPattern { .. })
        ));
        assert!(router.is_empty());
    }
}
