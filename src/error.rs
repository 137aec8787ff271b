//! Unified error type.

use crate::allow::AllowList;

/// The error type returned by relay's fallible operations.
///
/// Only [`Error::MethodNotAllowed`] ever reaches a client, as a `405`; the
/// [`Proxy`](crate::Proxy) turns upstream failures into `502` responses and
/// the remaining variants surface at startup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    MethodNotAllowed(#[from] MethodNotAllowed),

    #[error("upstream: {0}")]
    Upstream(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps a failure reported by an [`Upstream`](crate::Upstream).
    pub fn upstream(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Upstream(e.into())
    }
}

/// A request used a method outside the [`AllowList`].
///
/// `allow` is the comma-separated list to send back in the `Allow` header of
/// the `405` response.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("method {method} is not handled, allowed: {allow}")]
pub struct MethodNotAllowed {
    pub method: String,
    pub allow: String,
}

impl MethodNotAllowed {
    pub(crate) fn new(method: &str, allow: &AllowList) -> Self {
        Self { method: method.to_owned(), allow: allow.header_value() }
    }
}
