//! Extension name and parameter list.
//!
//! Uses the parameter syntax of the `Sec-WebSocket-Extensions` header:
//!
//! ```
//! use websocket_components::extension::ExtensionConfig;
//!
//! let config: ExtensionConfig = "permessage-deflate; client_max_window_bits=10; server_no_context_takeover"
//!     .parse()
//!     .unwrap();
//!
//! assert_eq!(config.name(), "permessage-deflate");
//! assert_eq!(config.parameter("client_max_window_bits"), Some("10"));
//! assert!(config.has_parameter("server_no_context_takeover"));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

// ============================================================================
// ExtensionConfig
// ============================================================================

/// An extension name with its ordered parameters.
///
/// Parameters without a value (flags) are stored with `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtensionConfig {
    name: String,
    parameters: Vec<(String, Option<String>)>,
}

impl ExtensionConfig {
    /// Creates a config with no parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExtension`] if `name` is not an HTTP token.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if !is_token(&name) {
            return Err(Error::invalid_extension(name, "name is not a valid token"));
        }
        Ok(Self {
            name,
            parameters: Vec::new(),
        })
    }

    /// Adds a `key=value` parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((key.into(), Some(value.into())));
        self
    }

    /// Adds a valueless parameter.
    #[must_use]
    pub fn with_flag(mut self, key: impl Into<String>) -> Self {
        self.parameters.push((key.into(), None));
        self
    }

    /// Returns the extension name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if `key` is present, with or without a value.
    #[must_use]
    pub fn has_parameter(&self, key: &str) -> bool {
        self.parameters.iter().any(|(k, _)| k == key)
    }

    /// Returns the value of the first `key` parameter, if it has one.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Iterates over parameters in insertion order.
    pub fn parameters(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.parameters
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

impl FromStr for ExtensionConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(';').map(str::trim);
        let mut config = Self::new(parts.next().unwrap_or_default())?;

        for part in parts.filter(|p| !p.is_empty()) {
            match part.split_once('=') {
                Some((key, value)) => {
                    let key = key.trim();
                    if !is_token(key) {
                        return Err(Error::invalid_extension(
                            &config.name,
                            format!("bad parameter name {key:?}"),
                        ));
                    }
                    let value = value.trim().trim_matches('"');
                    config.parameters.push((key.to_string(), Some(value.to_string())));
                }
                None if is_token(part) => config.parameters.push((part.to_string(), None)),
                None => {
                    return Err(Error::invalid_extension(
                        &config.name,
                        format!("bad parameter {part:?}"),
                    ));
                }
            }
        }

        Ok(config)
    }
}

impl fmt::Display for ExtensionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for (key, value) in &self.parameters {
            match value {
                Some(value) => write!(f, "; {key}={value}")?,
                None => write!(f, "; {key}")?,
            }
        }
        Ok(())
    }
}

/// RFC 7230 `token`.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^'
                        | b'_' | b'`' | b'|' | b'~'
                )
        })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_only() {
        let config: ExtensionConfig = "identity".parse().unwrap();
        assert_eq!(config.name(), "identity");
        assert_eq!(config.parameters().count(), 0);
    }

    #[test]
    fn test_parse_strips_quotes_and_whitespace() {
        let config: ExtensionConfig = " fragment ;  maxLength = \"4096\" ".parse().unwrap();
        assert_eq!(config.name(), "fragment");
        assert_eq!(config.parameter("maxLength"), Some("4096"));
    }

    #[test]
    fn test_flag_has_no_value() {
        let config: ExtensionConfig = "permessage-deflate; client_max_window_bits".parse().unwrap();
        assert!(config.has_parameter("client_max_window_bits"));
        assert_eq!(config.parameter("client_max_window_bits"), None);
    }

    #[test]
    fn test_display_uses_header_form() {
        let config = ExtensionConfig::new("permessage-deflate")
            .unwrap()
            .with_flag("server_no_context_takeover")
            .with_parameter("client_max_window_bits", "12");

        assert_eq!(
            config.to_string(),
            "permessage-deflate; server_no_context_takeover; client_max_window_bits=12"
        );
    }

    #[test]
    fn test_rejects_bad_names() {
        assert!("".parse::<ExtensionConfig>().is_err());
        assert!("bad name".parse::<ExtensionConfig>().is_err());
        assert!(ExtensionConfig::new("x/y").is_err());
    }

    #[test]
    fn test_rejects_bad_parameter() {
        let err = "fragment; max length=3".parse::<ExtensionConfig>().unwrap_err();
        assert!(matches!(err, Error::InvalidExtension { .. }));
    }
}
