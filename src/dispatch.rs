//! Method dispatch.
//!
//! Maps the inbound method name to its [`ResponseHandler`]. Names outside
//! the [`AllowList`] are rejected with [`MethodNotAllowed`], which renders
//! as `405` with the same list in `Allow`.

use tracing::debug;

use crate::allow::AllowList;
use crate::error::MethodNotAllowed;
use crate::handler::{self, Outbound, ResponseHandler};
use crate::method::Method;

/// Picks a response handler per request method.
///
/// Build it once at startup. The OPTIONS handler it creates advertises the
/// dispatcher's own [`AllowList`], so the accepted and the advertised methods
/// are always the same set.
#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    allow: AllowList,
}

impl Dispatcher {
    pub fn new(allow: AllowList) -> Self {
        Self { allow }
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow
    }

    /// Returns the handler for `method`, wrapping `outbound`.
    ///
    /// `method` is matched case-sensitively against the canonical names:
    /// `"get"` is rejected just like `"PATCH"`.
    pub fn dispatch(
        &self,
        method: &str,
        outbound: Outbound,
    ) -> Result<Box<dyn ResponseHandler>, MethodNotAllowed> {
        match method.parse::<Method>() {
            Ok(m) if self.allow.contains(m) => Ok(handler::build(m, outbound, &self.allow)),
            _ => {
                debug!(method, allow = %self.allow, "method not allowed");
                Err(MethodNotAllowed::new(method, &self.allow))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn outbound() -> Outbound {
        http::Request::builder()
            .uri("http://backend-1/")
            .body(Bytes::new())
            .unwrap()
    }

    #[test]
    fn every_supported_method_gets_its_own_handler() {
        let dispatcher = Dispatcher::default();
        for method in Method::ALL {
            let handler = dispatcher.dispatch(method.as_str(), outbound()).unwrap();
            assert_eq!(handler.method(), method);
        }
    }

    #[test]
    fn unsupported_methods_are_rejected_with_the_allow_list() {
        let dispatcher = Dispatcher::default();
        for method in ["PATCH", "TRACE", "CONNECT", "get", ""] {
            let err = dispatcher.dispatch(method, outbound()).unwrap_err();
            assert_eq!(err.method, method);
            assert_eq!(err.allow, "OPTIONS,GET,HEAD,POST,PUT,DELETE");
        }
    }

    #[test]
    fn narrowed_allow_list_changes_acceptance_and_advertisement_together() {
        let allow = AllowList::new([Method::Get, Method::Options]).unwrap();
        let dispatcher = Dispatcher::new(allow);

        let err = dispatcher.dispatch("POST", outbound()).unwrap_err();
        assert_eq!(err.allow, "GET,OPTIONS");

        let handler = dispatcher.dispatch("OPTIONS", outbound()).unwrap();
        let res = handler.relay(http::Response::new(Bytes::new()));
        assert_eq!(res.headers()[http::header::ALLOW], err.allow.as_str());
    }
}
