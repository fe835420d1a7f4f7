//! URI handler capability.
//!
//! An element type that declares [`Interfaces::URI_HANDLER`] can be created
//! from a URI. Its direction and supported protocols are recorded on the
//! class, so the registry can answer "who handles `https://…`?" before any
//! instance exists. The per-instance half is [`UriHandlerImpl`].
//!
//! [`Interfaces::URI_HANDLER`]: crate::element::Interfaces::URI_HANDLER
//! [`UriHandlerImpl`]: crate::element::UriHandlerImpl

use crate::error::{Error, Result};
use smallvec::SmallVec;
use std::fmt;
use url::Url;

/// Direction of a URI handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UriType {
    /// The element produces data from the URI.
    Src,
    /// The element consumes data into the URI.
    Sink,
}

impl fmt::Display for UriType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UriType::Src => f.write_str("src"),
            UriType::Sink => f.write_str("sink"),
        }
    }
}

/// Class-level URI information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriInfo {
    uri_type: UriType,
    protocols: SmallVec<[String; 4]>,
}

impl UriInfo {
    /// Create URI information; protocols are stored lowercase.
    pub fn new(uri_type: UriType, protocols: &[&str]) -> Self {
        Self {
            uri_type,
            protocols: protocols.iter().map(|p| p.to_ascii_lowercase()).collect(),
        }
    }

    /// Handler direction.
    pub fn uri_type(&self) -> UriType {
        self.uri_type
    }

    /// Supported protocols (URI schemes).
    pub fn protocols(&self) -> &[String] {
        &self.protocols
    }

    /// Check whether `protocol` is supported (case-insensitive).
    pub fn supports_protocol(&self, protocol: &str) -> bool {
        self.protocols
            .iter()
            .any(|p| p.eq_ignore_ascii_case(protocol))
    }

    /// Check whether the URI parses and its scheme is supported.
    pub fn supports_uri(&self, uri: &str) -> bool {
        uri_protocol(uri).is_ok_and(|p| self.supports_protocol(&p))
    }

    /// Validate `uri` against this handler.
    pub fn check_uri(&self, uri: &str) -> Result<()> {
        let protocol = uri_protocol(uri)?;
        if self.supports_protocol(&protocol) {
            Ok(())
        } else {
            Err(Error::UnsupportedProtocol(uri.to_string()))
        }
    }
}

/// Extract the (lowercase) protocol of a URI.
pub fn uri_protocol(uri: &str) -> Result<String> {
    Url::parse(uri)
        .map(|url| url.scheme().to_string())
        .map_err(|_| Error::BadUri(uri.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_protocol() {
        assert_eq!(uri_protocol("https://example.com/a").unwrap(), "https");
        assert_eq!(uri_protocol("HTTP://example.com").unwrap(), "http");
        assert!(matches!(uri_protocol("not a uri"), Err(Error::BadUri(_))));
        assert!(matches!(uri_protocol(""), Err(Error::BadUri(_))));
    }

    #[test]
    fn test_supports_uri() {
        let info = UriInfo::new(UriType::Src, &["http", "HTTPS"]);
        assert_eq!(info.protocols(), ["http", "https"]);
        assert!(info.supports_uri("http://host/a"));
        assert!(info.supports_uri("https://host/a"));
        assert!(!info.supports_uri("ftp://host/a"));
        assert!(!info.supports_uri("garbage"));
    }

    #[test]
    fn test_check_uri_errors() {
        let info = UriInfo::new(UriType::Src, &["http"]);
        assert!(info.check_uri("http://host").is_ok());
        assert!(matches!(
            info.check_uri("file:///tmp/x"),
            Err(Error::UnsupportedProtocol(_))
        ));
        assert!(matches!(info.check_uri("::"), Err(Error::BadUri(_))));
    }
}
