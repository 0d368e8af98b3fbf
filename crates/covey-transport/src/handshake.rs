//! The parameters a client presents when opening a channel.

use std::collections::HashMap;

/// Path and query parameters of a channel's opening request.
///
/// For a WebSocket this is the upgrade URI, e.g.
/// `/town?token=abc&coveyTownID=xyz`. Parameter values are
/// percent-decoded; when a key repeats, the first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Handshake {
    path: String,
    params: HashMap<String, String>,
}

impl Handshake {
    /// Builds a handshake from a path and an optional raw query string.
    pub fn new(path: &str, query: Option<&str>) -> Self {
        let mut params = HashMap::new();
        if let Some(query) = query {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                params
                    .entry(key.into_owned())
                    .or_insert_with(|| value.into_owned());
            }
        }
        Self {
            path: path.to_string(),
            params,
        }
    }

    /// The request path, e.g. `/town`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Looks up a query parameter. Empty values count as absent.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_parses_query_params() {
        let hs = Handshake::new("/town", Some("token=abc&coveyTownID=T1"));
        assert_eq!(hs.path(), "/town");
        assert_eq!(hs.param("token"), Some("abc"));
        assert_eq!(hs.param("coveyTownID"), Some("T1"));
    }

    #[test]
    fn test_new_without_query_has_no_params() {
        let hs = Handshake::new("/user", None);
        assert_eq!(hs.param("token"), None);
    }

    #[test]
    fn test_param_percent_decodes_values() {
        let hs = Handshake::new("/user", Some("userID=a%20b"));
        assert_eq!(hs.param("userID"), Some("a b"));
    }

    #[test]
    fn test_param_empty_value_is_absent() {
        let hs = Handshake::new("/user", Some("token=&userID=u"));
        assert_eq!(hs.param("token"), None);
        assert_eq!(hs.param("userID"), Some("u"));
    }

    #[test]
    fn test_param_repeated_key_keeps_first() {
        let hs = Handshake::new("/town", Some("token=first&token=second"));
        assert_eq!(hs.param("token"), Some("first"));
    }
}
