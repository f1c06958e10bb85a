//! Captured path parameters.
//!
//! A route rarely declares more than a handful of parameters, so captures are kept
//! inline on the stack for the common case.

use std::collections::HashMap;

use smallvec::SmallVec;

const INLINE_CAPTURES: usize = 4;

/// Path parameters captured by a route match, in pattern order.
///
/// # Example
///
/// ```rust
/// use heron_router::Params;
///
/// let mut params = Params::new();
/// params.push("orgId", "acme");
/// params.push("userId", "7");
///
/// assert_eq!(params.get("userId"), Some("7"));
/// assert_eq!(params.names().collect::<Vec<_>>(), vec!["orgId", "userId"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    captures: SmallVec<[(String, String); INLINE_CAPTURES]>,
}

impl Params {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a capture.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.captures.push((name.into(), value.into()));
    }

    /// Looks up a capture by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.captures
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if a capture with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.captures.iter().any(|(n, _)| n == name)
    }

    /// Number of captures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.captures.len()
    }

    /// True when nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    /// Iterates over `(name, value)` pairs in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.captures.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Iterates over capture names in pattern order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.captures.iter().map(|(n, _)| n.as_str())
    }

    /// Copies the captures into an owned map.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.captures.iter().cloned().collect()
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            captures: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        let mut params = Params::new();
        params.push("id", "42");
        params.push("format", "json");

        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.get("format"), Some("json"));
        assert_eq!(params.get("missing"), None);
        assert!(params.contains("id"));
        assert!(!params.contains("missing"));
    }

    #[test]
    fn test_order_is_preserved() {
        let params: Params = [("b", "2"), ("a", "1")]
            .into_iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();

        assert_eq!(params.iter().collect::<Vec<_>>(), vec![("b", "2"), ("a", "1")]);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_to_map() {
        let mut params = Params::new();
        params.push("id", "42");
        let map = params.to_map();
        assert_eq!(map.get("id").map(String::as_str), Some("42"));
    }
}
