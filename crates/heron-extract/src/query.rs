//! Query string access.

use serde_json::Value;

/// Decoded query parameters, in order, repeated keys kept.
///
/// ```
/// use heron_extract::QueryParams;
///
/// let query = QueryParams::parse("tag=a&limit=10&tag=b&q=hello%20world");
/// assert_eq!(query.first("tag"), Some("a"));
/// assert_eq!(query.all("tag").collect::<Vec<_>>(), vec!["a", "b"]);
/// assert_eq!(query.first("q"), Some("hello world"));
/// assert_eq!(query.first("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parses an `application/x-www-form-urlencoded` query string.
    ///
    /// Malformed input yields an empty set rather than failing the request;
    /// inputs read from it are then simply absent.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        Self {
            pairs: serde_urlencoded::from_str(query).unwrap_or_default(),
        }
    }

    /// Builds a set from already decoded pairs.
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            pairs: pairs.into_iter().collect(),
        }
    }

    /// The first value for `name`.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Every value for `name`, in order.
    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All values for `name` as a JSON array of strings, or `None` if absent.
    #[must_use]
    pub fn array(&self, name: &str) -> Option<Value> {
        let values: Vec<Value> = self.all(name).map(|v| Value::String(v.to_string())).collect();
        if values.is_empty() {
            None
        } else {
            Some(Value::Array(values))
        }
    }

    /// True if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array() {
        let query = QueryParams::parse("id=1&id=2&other=x");
        assert_eq!(query.array("id"), Some(json!(["1", "2"])));
        assert_eq!(query.array("none"), None);
    }

    #[test]
    fn test_empty_and_valueless() {
        assert!(QueryParams::parse("").is_empty());
        let query = QueryParams::parse("flag&x=");
        assert_eq!(query.first("flag"), Some(""));
        assert_eq!(query.first("x"), Some(""));
    }

    #[test]
    fn test_first_outlives_lookup_key() {
        let query = QueryParams::parse("page=2");
        let page = {
            let key = String::from("page");
            query.first(&key)
        };
        assert_eq!(page, Some("2"));
    }

    #[test]
    fn test_plus_decodes_to_space() {
        let query = QueryParams::parse("q=a+b");
        assert_eq!(query.first("q"), Some("a b"));
    }
}
