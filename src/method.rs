//! HTTP method as a typed enum.
//!
//! Only the verbs the proxy knows how to relay are representable. Anything
//! else is rejected by the [`Dispatcher`](crate::Dispatcher) with
//! `405 Method Not Allowed` before a backend response is ever relayed.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// A method the proxy can relay.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Options,
    Get,
    Head,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Every variant, in the order advertised by default.
    pub const ALL: [Method; 6] = [
        Self::Options,
        Self::Get,
        Self::Head,
        Self::Post,
        Self::Put,
        Self::Delete,
    ];

    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Options => "OPTIONS",
            Self::Get     => "GET",
            Self::Head    => "HEAD",
            Self::Post    => "POST",
            Self::Put     => "PUT",
            Self::Delete  => "DELETE",
        }
    }
}

/// Parses an uppercase method string (e.g. `"GET"`). Case-sensitive per RFC 9110 §9.1.
impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPTIONS" => Ok(Self::Options),
            "GET"     => Ok(Self::Get),
            "HEAD"    => Ok(Self::Head),
            "POST"    => Ok(Self::Post),
            "PUT"     => Ok(Self::Put),
            "DELETE"  => Ok(Self::Delete),
            _         => Err(()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_variant_from_its_wire_name() {
        for method in Method::ALL {
            assert_eq!(method.as_str().parse::<Method>(), Ok(method));
        }
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert!("get".parse::<Method>().is_err());
        assert!("Post".parse::<Method>().is_err());
    }

    #[test]
    fn rejects_verbs_outside_the_enum() {
        assert!("PATCH".parse::<Method>().is_err());
        assert!("TRACE".parse::<Method>().is_err());
        assert!("".parse::<Method>().is_err());
    }
}
