//! Probe configuration.
//!
//! [`ProbeConfig`] is the single source of truth for one probe run.  `main.rs`
//! fills it from command-line arguments (and their environment-variable
//! overrides); the rest of the crate only ever sees this struct, never the
//! raw arguments.

use thiserror::Error;
use url::Url;

use wsprobe_core::{HeaderError, HeaderSet};

/// Endpoint used when `-u` is not given.
pub const DEFAULT_TARGET: &str = "ws://localhost:8080/api/v1/kubeql";

/// Origin used when `-o` is not given.
pub const DEFAULT_ORIGIN: &str = "http://localhost:8080";

/// Problems detected while building a [`ProbeConfig`].
///
/// All of them are reported before any connection is attempted.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `-u` was given an empty string.
    #[error("missing url")]
    EmptyUrl,

    /// `-o` could not be parsed as an absolute URL.
    #[error("failed to parse origin URL '{origin}': {source}")]
    InvalidOrigin {
        origin: String,
        #[source]
        source: url::ParseError,
    },

    /// A `-H` argument was not of the form `Name: Value`.
    #[error(transparent)]
    Header(#[from] HeaderError),
}

/// Everything needed to open and drive one probe session.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// WebSocket endpoint to connect to (`ws://` or `wss://`).
    pub target: String,

    /// Origin declared during the handshake, or `None` to send no `Origin`
    /// header of our own.
    pub origin: Option<Url>,

    /// Extra handshake headers, in command-line order.
    pub headers: HeaderSet,

    /// Text sent as the very first frame, before any standard-input line.
    pub initial_command: Option<String>,

    /// Whether inbound JSON is colourized.
    pub colour: bool,
}

impl ProbeConfig {
    /// Validates raw option values and builds a config.
    ///
    /// - `target` must be non-empty.
    /// - `origin` is parsed as a URL unless it is empty, which disables it.
    /// - `headers` are parsed as `Name: Value` in order.
    /// - An empty `initial_command` is the same as none.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn new<I, S>(
        target: &str,
        origin: &str,
        headers: I,
        initial_command: Option<String>,
        colour: bool,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if target.is_empty() {
            return Err(ConfigError::EmptyUrl);
        }

        let origin = if origin.is_empty() {
            None
        } else {
            let parsed = Url::parse(origin).map_err(|source| ConfigError::InvalidOrigin {
                origin: origin.to_string(),
                source,
            })?;
            Some(parsed)
        };

        Ok(Self {
            target: target.to_string(),
            origin,
            headers: HeaderSet::from_raw(headers)?,
            initial_command: initial_command.filter(|c| !c.is_empty()),
            colour,
        })
    }

    /// The value to put in the handshake's `Origin` header.
    ///
    /// This is the ASCII serialization of the URL's origin
    /// (`scheme://host[:port]`), so `http://localhost:8080/app` becomes
    /// `http://localhost:8080`.
    pub fn origin_header(&self) -> Option<String> {
        self.origin
            .as_ref()
            .map(|url| url.origin().ascii_serialization())
    }
}

impl Default for ProbeConfig {
    /// Local development defaults: the default target and origin, no extra
    /// headers, no initial command, colour on.
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            // Parsing a compile-time constant known to be a valid URL.
            origin: Url::parse(DEFAULT_ORIGIN).ok(),
            headers: HeaderSet::new(),
            initial_command: None,
            colour: true,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn no_headers() -> Vec<String> {
        Vec::new()
    }

    #[test]
    fn test_default_target_and_origin() {
        // Arrange / Act
        let cfg = ProbeConfig::default();

        // Assert
        assert_eq!(cfg.target, DEFAULT_TARGET);
        assert_eq!(cfg.origin_header().as_deref(), Some("http://localhost:8080"));
        assert!(cfg.colour);
        assert!(cfg.initial_command.is_none());
    }

    #[test]
    fn test_empty_target_is_rejected() {
        let result = ProbeConfig::new("", DEFAULT_ORIGIN, no_headers(), None, true);
        assert!(matches!(result, Err(ConfigError::EmptyUrl)));
    }

    #[test]
    fn test_empty_origin_disables_origin() {
        let cfg = ProbeConfig::new(DEFAULT_TARGET, "", no_headers(), None, true).unwrap();
        assert!(cfg.origin.is_none());
        assert!(cfg.origin_header().is_none());
    }

    #[test]
    fn test_malformed_origin_is_rejected() {
        let result = ProbeConfig::new(DEFAULT_TARGET, "not a url", no_headers(), None, true);
        assert!(matches!(result, Err(ConfigError::InvalidOrigin { .. })));
    }

    #[test]
    fn test_origin_header_drops_path() {
        let cfg = ProbeConfig::new(
            DEFAULT_TARGET,
            "https://app.example.com:8443/console/",
            no_headers(),
            None,
            true,
        )
        .unwrap();
        assert_eq!(
            cfg.origin_header().as_deref(),
            Some("https://app.example.com:8443")
        );
    }

    #[test]
    fn test_headers_are_parsed_in_order() {
        let cfg = ProbeConfig::new(
            DEFAULT_TARGET,
            DEFAULT_ORIGIN,
            ["Sample-Header-1: foo", "Sample-Header-2: bar", "Sample-Header-1: baz"],
            None,
            true,
        )
        .unwrap();
        let pairs: Vec<_> = cfg.headers.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("Sample-Header-1", "foo"),
                ("Sample-Header-2", "bar"),
                ("Sample-Header-1", "baz"),
            ]
        );
    }

    #[test]
    fn test_bad_header_is_a_config_error() {
        let result = ProbeConfig::new(DEFAULT_TARGET, DEFAULT_ORIGIN, ["oops"], None, true);
        assert!(matches!(result, Err(ConfigError::Header(_))));
    }

    #[test]
    fn test_empty_initial_command_is_none() {
        let cfg =
            ProbeConfig::new(DEFAULT_TARGET, DEFAULT_ORIGIN, no_headers(), Some(String::new()), false)
                .unwrap();
        assert!(cfg.initial_command.is_none());
        assert!(!cfg.colour);
    }

    #[test]
    fn test_error_messages_are_operator_friendly() {
        assert_eq!(ConfigError::EmptyUrl.to_string(), "missing url");
        let err = ProbeConfig::new(DEFAULT_TARGET, "::", no_headers(), None, true).unwrap_err();
        assert!(err.to_string().starts_with("failed to parse origin URL '::'"));
    }
}
