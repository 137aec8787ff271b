//! Startup configuration.
//!
//! ```toml
//! listen = "0.0.0.0:8080"
//! allowed_methods = ["OPTIONS", "GET", "HEAD", "POST", "PUT", "DELETE"]
//! ```
//!
//! Both keys are optional; the values above are the defaults except for the
//! port, which defaults to 3000.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::Deserialize;

use crate::allow::AllowList;
use crate::error::Error;

/// Root configuration for the proxy.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Bind address.
    pub listen: SocketAddr,

    /// Methods relayed to backends, in the order advertised to clients.
    pub allowed_methods: AllowList,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 3000)),
            allowed_methods: AllowList::default(),
        }
    }
}

impl ProxyConfig {
    pub fn from_toml(src: &str) -> Result<Self, Error> {
        Ok(toml::from_str(src)?)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let src = std::fs::read_to_string(path)?;
        Self::from_toml(&src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ProxyConfig::from_toml("").unwrap();
        assert_eq!(config.listen, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.allowed_methods, AllowList::default());
    }

    #[test]
    fn parses_listen_and_allow_list() {
        let config = ProxyConfig::from_toml(
            r#"
            listen = "127.0.0.1:8080"
            allowed_methods = ["GET", "HEAD", "GET"]
            "#,
        )
        .unwrap();

        assert_eq!(config.listen, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.allowed_methods.methods(), &[Method::Get, Method::Head]);
    }

    #[test]
    fn rejects_unknown_method() {
        let err = ProxyConfig::from_toml(r#"allowed_methods = ["GET", "PATCH"]"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_lowercase_method() {
        assert!(ProxyConfig::from_toml(r#"allowed_methods = ["get"]"#).is_err());
    }

    #[test]
    fn rejects_empty_allow_list() {
        let err = ProxyConfig::from_toml("allowed_methods = []").unwrap_err();
        assert!(err.to_string().contains("at least one method"), "{err}");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ProxyConfig::load("/nonexistent/relay.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
