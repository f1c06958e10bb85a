//! Trie nodes and pattern parsing.
//!
//! Every node has literal children keyed by segment text and at most one
//! parameter child. Parameter children carry no name; the final [`Leaf`]
//! records the names in pattern order and the matcher zips them with the
//! captured segments once a complete route is found.

use std::collections::HashMap;

use crate::error::RouterError;

/// A parsed pattern segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Literal(&'a str),
    Param(&'a str),
}

/// The route stored at the end of a pattern.
#[derive(Debug, Clone)]
pub(crate) struct Leaf<T> {
    pub(crate) value: T,
    pub(crate) pattern: String,
    pub(crate) param_names: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    literals: HashMap<String, Node<T>>,
    param: Option<Box<Node<T>>>,
    leaf: Option<Leaf<T>>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            literals: HashMap::new(),
            param: None,
            leaf: None,
        }
    }
}

impl<T> Node<T> {
    /// Inserts a leaf at the end of `segments`.
    ///
    /// Fails with the pattern already stored there when the slot is occupied.
    pub(crate) fn insert(&mut self, segments: &[Segment<'_>], leaf: Leaf<T>) -> Result<(), String> {
        let mut node = self;
        for segment in segments {
            node = match segment {
                Segment::Literal(text) => node.literals.entry((*text).to_string()).or_default(),
                Segment::Param(_) => &mut **node.param.get_or_insert_with(Box::default),
            };
        }

        if let Some(existing) = &node.leaf {
            return Err(existing.pattern.clone());
        }
        node.leaf = Some(leaf);
        Ok(())
    }

    /// Finds the leaf for `segments`, pushing one capture per parameter edge taken.
    ///
    /// Literal children are tried first. If the literal branch cannot reach a
    /// leaf the parameter branch is tried, and captures pushed by a failed
    /// attempt are popped before returning.
    pub(crate) fn find<'p>(
        &self,
        segments: &[&'p str],
        captures: &mut Vec<&'p str>,
    ) -> Option<&Leaf<T>> {
        let Some((first, rest)) = segments.split_first() else {
            return self.leaf.as_ref();
        };

        if let Some(child) = self.literals.get(*first) {
            if let Some(leaf) = child.find(rest, captures) {
                return Some(leaf);
            }
        }

        if first.is_empty() {
            return None;
        }

        if let Some(child) = &self.param {
            captures.push(*first);
            if let Some(leaf) = child.find(rest, captures) {
                return Some(leaf);
            }
            captures.pop();
        }

        None
    }
}

/// Trims a single trailing slash. The root path `/` is returned unchanged.
///
/// ```rust
/// use heron_router::normalize_path;
///
/// assert_eq!(normalize_path("/users/"), "/users");
/// assert_eq!(normalize_path("/"), "/");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

/// Splits a path into segments after normalization.
///
/// The root path has no segments. Empty interior segments are kept.
pub(crate) fn split_path(path: &str) -> Vec<&str> {
    let path = normalize_path(path);
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

pub(crate) fn parse_pattern(pattern: &str) -> Result<Vec<Segment<'_>>, RouterError> {
    let mut segments = Vec::new();
    let mut seen: Vec<&str> = Vec::new();

    for raw in split_path(pattern) {
        let name = if let Some(name) = raw.strip_prefix(':') {
            Some(name)
        } else if let Some(inner) = raw.strip_prefix('{') {
            let Some(name) = inner.strip_suffix('}') else {
                return Err(RouterError::invalid(pattern, format!("unterminated parameter '{raw}'")));
            };
            Some(name)
        } else {
            None
        };

        match name {
            Some("") => return Err(RouterError::invalid(pattern, "empty parameter name")),
            Some(name) => {
                if seen.contains(&name) {
                    return Err(RouterError::invalid(
                        pattern,
                        format!("parameter '{name}' appears more than once"),
                    ));
                }
                seen.push(name);
                segments.push(Segment::Param(name));
            }
            None => segments.push(Segment::Literal(raw)),
        }
    }

    Ok(segments)
}

/// Returns the parameter names declared by `pattern`, in order.
///
/// ```rust
/// use heron_router::pattern_params;
///
/// let names = pattern_params("/orgs/{org}/users/:id").unwrap();
/// assert_eq!(names, vec!["org", "id"]);
/// ```
pub fn pattern_params(pattern: &str) -> Result<Vec<String>, RouterError> {
    Ok(parse_pattern(pattern)?
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Param(name) => Some(name.to_string()),
            Segment::Literal(_) => None,
        })
        .collect())
}
