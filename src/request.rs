//! Read-only view of an incoming HTTP request.

use http::header::{HeaderName, HeaderValue};
use http::{Method, Uri, Version};

/// What downstream code may read from an inbound request.
///
/// Implemented by [`http::Request`] and by decorators such as
/// [`SessionRewritingRequest`](crate::SessionRewritingRequest), so routing
/// code can be written once against either.
///
/// Header names are matched case-insensitively. A name that is not a valid
/// header name has no values.
pub trait RequestHead {
    fn method(&self) -> &Method;
    fn uri(&self) -> &Uri;
    fn version(&self) -> Version;

    /// First value of header `name`, or `None` when it is absent.
    fn header(&self, name: &str) -> Option<&HeaderValue>;

    /// Every value of header `name`, in the order received.
    fn header_all(&self, name: &str) -> Vec<&HeaderValue>;

    /// Distinct header names present on the request.
    fn header_names(&self) -> Vec<&HeaderName>;
}

impl<B> RequestHead for http::Request<B> {
    fn method(&self) -> &Method { http::Request::method(self) }
    fn uri(&self) -> &Uri { http::Request::uri(self) }
    fn version(&self) -> Version { http::Request::version(self) }

    fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers().get(name)
    }

    fn header_all(&self, name: &str) -> Vec<&HeaderValue> {
        self.headers().get_all(name).iter().collect()
    }

    fn header_names(&self) -> Vec<&HeaderName> {
        self.headers().keys().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let req = http::Request::builder()
            .header("X-Backend", "a")
            .body(())
            .unwrap();

        assert_eq!(req.header("x-backend").unwrap(), "a");
        assert_eq!(req.header("X-BACKEND").unwrap(), "a");
        assert!(req.header("x-missing").is_none());
    }

    #[test]
    fn header_all_keeps_order() {
        let req = http::Request::builder()
            .header("accept", "text/html")
            .header("accept", "application/json")
            .body(())
            .unwrap();

        let values: Vec<_> = req.header_all("Accept").into_iter().map(|v| v.to_str().unwrap()).collect();
        assert_eq!(values, ["text/html", "application/json"]);
    }

    #[test]
    fn invalid_header_name_has_no_values() {
        let req = http::Request::builder().body(()).unwrap();
        assert!(req.header("bad name").is_none());
        assert!(req.header_all("bad name").is_empty());
    }
}
