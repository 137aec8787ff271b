//! The set of methods the proxy relays.
//!
//! One [`AllowList`] is built at startup and handed to the
//! [`Dispatcher`](crate::Dispatcher), which passes the very same value on to
//! every OPTIONS handler it constructs. Clones share one allocation, so what
//! is enforced and what is advertised cannot drift apart.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::Error;
use crate::method::Method;

/// An immutable, ordered set of [`Method`]s.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(try_from = "Vec<Method>")]
pub struct AllowList {
    methods: Arc<[Method]>,
}

impl AllowList {
    /// Builds a list from `methods`, keeping the first occurrence of each.
    ///
    /// Returns [`Error::InvalidConfig`] when `methods` is empty: a proxy that
    /// rejects every verb is a misconfiguration, not a policy.
    pub fn new(methods: impl IntoIterator<Item = Method>) -> Result<Self, Error> {
        let mut unique: Vec<Method> = Vec::with_capacity(Method::ALL.len());
        for method in methods {
            if !unique.contains(&method) {
                unique.push(method);
            }
        }
        if unique.is_empty() {
            return Err(Error::InvalidConfig("allow-list must name at least one method".to_owned()));
        }
        Ok(Self { methods: unique.into() })
    }

    pub fn contains(&self, method: Method) -> bool {
        self.methods.contains(&method)
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// The `Allow` header rendering, e.g. `"OPTIONS,GET,HEAD"`.
    pub fn header_value(&self) -> String {
        self.to_string()
    }

    /// True when both lists are backed by the same allocation.
    pub fn shares_storage_with(&self, other: &AllowList) -> bool {
        Arc::ptr_eq(&self.methods, &other.methods)
    }
}

/// `OPTIONS,GET,HEAD,POST,PUT,DELETE`.
impl Default for AllowList {
    fn default() -> Self {
        Self { methods: Method::ALL.into() }
    }
}

impl TryFrom<Vec<Method>> for AllowList {
    type Error = Error;

    fn try_from(methods: Vec<Method>) -> Result<Self, Self::Error> {
        Self::new(methods)
    }
}

impl fmt::Display for AllowList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, method) in self.methods.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(method.as_str())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_renders_all_methods_in_canonical_order() {
        assert_eq!(AllowList::default().header_value(), "OPTIONS,GET,HEAD,POST,PUT,DELETE");
    }

    #[test]
    fn keeps_given_order_and_drops_duplicates() {
        let list = AllowList::new([Method::Get, Method::Options, Method::Get]).unwrap();
        assert_eq!(list.methods(), &[Method::Get, Method::Options]);
        assert_eq!(list.to_string(), "GET,OPTIONS");
        assert!(!list.contains(Method::Post));
    }

    #[test]
    fn empty_list_is_rejected() {
        let err = AllowList::new(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn clones_share_storage() {
        let list = AllowList::default();
        let clone = list.clone();
        assert!(list.shares_storage_with(&clone));
        assert!(!list.shares_storage_with(&AllowList::default()));
    }
}
