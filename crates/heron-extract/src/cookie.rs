//! Request cookie parsing.
//!
//! Buffered requests carry cookies in one `cookie` header separated by `;`.
//! Gateway events carry them as a list of `name=value` strings. In both cases
//! the first `=` splits name from value.

/// Finds `name` in a `cookie` header value.
///
/// Whitespace around names and values and surrounding double quotes on values
/// are removed.
///
/// ```
/// use heron_extract::cookie::find_in_header;
///
/// let header = "session=abc123; theme=\"dark\"; token=a=b";
/// assert_eq!(find_in_header(header, "session"), Some("abc123"));
/// assert_eq!(find_in_header(header, "theme"), Some("dark"));
/// assert_eq!(find_in_header(header, "token"), Some("a=b"));
/// assert_eq!(find_in_header(header, "missing"), None);
/// ```
#[must_use]
pub fn find_in_header<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    find(header.split(';'), name)
}

/// Finds `name` in a list of `name=value` strings.
///
/// ```
/// use heron_extract::cookie::find_in_list;
///
/// let cookies = vec!["a=b".to_string(), "c=d=e".to_string()];
/// assert_eq!(find_in_list(&cookies, "c"), Some("d=e"));
/// assert_eq!(find_in_list(&cookies, "x"), None);
/// ```
#[must_use]
pub fn find_in_list<'a>(cookies: &'a [String], name: &str) -> Option<&'a str> {
    find(cookies.iter().map(String::as_str), name)
}

fn find<'a>(pairs: impl Iterator<Item = &'a str>, name: &str) -> Option<&'a str> {
    pairs
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_whitespace() {
        assert_eq!(find_in_header("  session  =  abc123  ", "session"), Some("abc123"));
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(find_in_header("a=1; a=2", "a"), Some("1"));
    }

    #[test]
    fn test_entries_without_equals_are_skipped() {
        let cookies = vec!["broken".to_string(), "ok=1".to_string()];
        assert_eq!(find_in_list(&cookies, "broken"), None);
        assert_eq!(find_in_list(&cookies, "ok"), Some("1"));
    }

    #[test]
    fn test_empty_value() {
        assert_eq!(find_in_header("empty=", "empty"), Some(""));
    }
}
