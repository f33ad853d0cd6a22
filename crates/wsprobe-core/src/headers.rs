//! Extra handshake headers supplied on the command line.
//!
//! Each `-H "Name: Value"` argument is split at the **first** colon, both
//! halves are trimmed, and the pair is appended to a [`HeaderSet`].  Order is
//! preserved exactly, including repeated names, because some servers care
//! about the order of duplicate headers such as `Cookie` or `Sec-WebSocket-Protocol`.

use thiserror::Error;

/// Errors produced while parsing a raw `Name: Value` header argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// The argument contains no `:` separator.
    #[error("header '{0}' is missing a ':' separator (expected \"Name: Value\")")]
    MissingColon(String),

    /// The text before the first `:` is empty after trimming.
    #[error("header '{0}' has an empty name")]
    EmptyName(String),
}

/// An ordered, immutable list of `(name, value)` handshake headers.
///
/// # Example
///
/// ```rust
/// use wsprobe_core::HeaderSet;
///
/// let headers = HeaderSet::from_raw(["X-Token: abc", "X-Token : def"]).unwrap();
/// let pairs: Vec<_> = headers.iter().collect();
/// assert_eq!(pairs, vec![("X-Token", "abc"), ("X-Token", "def")]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    /// Creates an empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a header set from raw `Name: Value` strings, in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`HeaderError`] encountered; no partial set is
    /// returned.
    pub fn from_raw<I, S>(raw: I) -> Result<Self, HeaderError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = raw
            .into_iter()
            .map(|entry| parse_header(entry.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Returns every value recorded for `name` (ASCII case-insensitive), in
    /// insertion order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
            .collect()
    }

    /// Number of header entries, counting duplicates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no headers were supplied.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Splits one `Name: Value` argument at its first colon and trims both sides.
///
/// Values may themselves contain colons (`Authorization: Basic a:b`); only the
/// first colon separates the name.
///
/// # Errors
///
/// [`HeaderError::MissingColon`] when there is no colon at all, and
/// [`HeaderError::EmptyName`] when nothing precedes it.
pub fn parse_header(raw: &str) -> Result<(String, String), HeaderError> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| HeaderError::MissingColon(raw.to_string()))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(HeaderError::EmptyName(raw.to_string()));
    }

    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_trims_name_and_value() {
        // Arrange / Act
        let (name, value) = parse_header("  Sample-Header-1 :   foo  ").unwrap();

        // Assert
        assert_eq!(name, "Sample-Header-1");
        assert_eq!(value, "foo");
    }

    #[test]
    fn test_parse_header_splits_at_first_colon_only() {
        let (name, value) = parse_header("Authorization: Basic user:pass").unwrap();
        assert_eq!(name, "Authorization");
        assert_eq!(value, "Basic user:pass");
    }

    #[test]
    fn test_parse_header_allows_empty_value() {
        let (name, value) = parse_header("X-Empty:").unwrap();
        assert_eq!(name, "X-Empty");
        assert_eq!(value, "");
    }

    #[test]
    fn test_parse_header_without_colon_is_rejected() {
        let err = parse_header("NoSeparator").unwrap_err();
        assert_eq!(err, HeaderError::MissingColon("NoSeparator".to_string()));
    }

    #[test]
    fn test_parse_header_with_blank_name_is_rejected() {
        let err = parse_header("   : value").unwrap_err();
        assert!(matches!(err, HeaderError::EmptyName(_)));
    }

    #[test]
    fn test_from_raw_preserves_order_and_duplicates() {
        // Arrange
        let raw = ["B: 2", "A: 1", "B: 3"];

        // Act
        let set = HeaderSet::from_raw(raw).unwrap();

        // Assert
        let pairs: Vec<_> = set.iter().collect();
        assert_eq!(pairs, vec![("B", "2"), ("A", "1"), ("B", "3")]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_from_raw_stops_at_first_bad_entry() {
        let result = HeaderSet::from_raw(["Good: yes", "bad"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_get_all_is_case_insensitive() {
        let set = HeaderSet::from_raw(["Cookie: a=1", "cookie: b=2", "Other: x"]).unwrap();
        assert_eq!(set.get_all("COOKIE"), vec!["a=1", "b=2"]);
    }

    #[test]
    fn test_empty_set() {
        let set = HeaderSet::new();
        assert!(set.is_empty());
        assert_eq!(set.iter().count(), 0);
    }
}
