//! Per-method response handlers.
//!
//! Every supported [`Method`] has one handler type. A handler is created by
//! the [`Dispatcher`](crate::Dispatcher) around the outbound request, lends
//! that request to whoever executes it, and finally turns the backend's
//! answer into the [`Response`] sent to the client.
//!
//! ```text
//! dispatcher.dispatch("GET", outbound)   → Box<dyn ResponseHandler>  (GetHandler)
//! upstream.send(handler.outbound())      → BackendResponse
//! handler.relay(backend)                 → Response
//! ```
//!
//! What a handler does with the backend response is its own business: HEAD
//! drops the body, OPTIONS rewrites `Allow`. The dispatcher never looks.

use std::fmt;

use bytes::Bytes;
use http::header::{self, HeaderMap, HeaderName, HeaderValue};

use crate::allow::AllowList;
use crate::method::Method;
use crate::response::Response;

/// The request a handler was built around, already aimed at a backend.
pub type Outbound = http::Request<Bytes>;

/// What the backend answered.
pub type BackendResponse = http::Response<Bytes>;

/// Relays one backend response to the client.
pub trait ResponseHandler: fmt::Debug + Send + Sync {
    fn method(&self) -> Method;

    /// The prepared outbound request, for the caller to execute.
    fn outbound(&self) -> &Outbound;

    fn relay(self: Box<Self>, backend: BackendResponse) -> Response;
}

/// Builds the handler for `method`.
///
/// Adding a [`Method`] variant fails to compile until it gets an arm here.
pub(crate) fn build(method: Method, outbound: Outbound, allow: &AllowList) -> Box<dyn ResponseHandler> {
    match method {
        Method::Options => Box::new(OptionsHandler { outbound, allow: allow.clone() }),
        Method::Get     => Box::new(GetHandler { outbound }),
        Method::Head    => Box::new(HeadHandler { outbound }),
        Method::Post    => Box::new(PostHandler { outbound }),
        Method::Put     => Box::new(PutHandler { outbound }),
        Method::Delete  => Box::new(DeleteHandler { outbound }),
    }
}

// ── Hop-by-hop headers ────────────────────────────────────────────────────────

/// RFC 9110 §7.6.1 connection-specific headers; never relayed.
static HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in HOP_BY_HOP.iter().chain(&listed) {
        headers.remove(name);
    }
}

/// Status and end-to-end headers of `backend`, with `body` in place of its own.
fn relay_with_body(backend: BackendResponse, body: Bytes) -> Response {
    let (mut parts, _) = backend.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts.status, parts.headers, body)
}

fn relay_unchanged(backend: BackendResponse) -> Response {
    let body = backend.body().clone();
    relay_with_body(backend, body)
}

// ── Handlers ──────────────────────────────────────────────────────────────────

macro_rules! passthrough_handler {
    ($(#[$doc:meta])* $name:ident, $method:expr) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name {
            outbound: Outbound,
        }

        impl ResponseHandler for $name {
            fn method(&self) -> Method { $method }
            fn outbound(&self) -> &Outbound { &self.outbound }

            fn relay(self: Box<Self>, backend: BackendResponse) -> Response {
                relay_unchanged(backend)
            }
        }
    };
}

passthrough_handler!(
    /// Relays status, headers and body.
    GetHandler, Method::Get
);
passthrough_handler!(PostHandler, Method::Post);
passthrough_handler!(PutHandler, Method::Put);
passthrough_handler!(DeleteHandler, Method::Delete);

/// Relays status and headers; a HEAD response never has a body.
#[derive(Debug)]
pub struct HeadHandler {
    outbound: Outbound,
}

impl ResponseHandler for HeadHandler {
    fn method(&self) -> Method { Method::Head }
    fn outbound(&self) -> &Outbound { &self.outbound }

    fn relay(self: Box<Self>, backend: BackendResponse) -> Response {
        relay_with_body(backend, Bytes::new())
    }
}

/// Advertises the proxy's [`AllowList`].
///
/// When the backend sends its own `Allow`, only the methods both sides
/// support are advertised, in allow-list order.
#[derive(Debug)]
pub struct OptionsHandler {
    outbound: Outbound,
    allow: AllowList,
}

impl OptionsHandler {
    pub fn allow_list(&self) -> &AllowList {
        &self.allow
    }

    fn advertised(&self, backend: &HeaderMap) -> String {
        if !backend.contains_key(header::ALLOW) {
            return self.allow.header_value();
        }

        let offered: Vec<Method> = backend
            .get_all(header::ALLOW)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .filter_map(|m| m.trim().parse().ok())
            .collect();

        self.allow
            .methods()
            .iter()
            .filter(|m| offered.contains(m))
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl ResponseHandler for OptionsHandler {
    fn method(&self) -> Method { Method::Options }
    fn outbound(&self) -> &Outbound { &self.outbound }

    fn relay(self: Box<Self>, backend: BackendResponse) -> Response {
        let allow = self.advertised(backend.headers());
        let mut res = relay_unchanged(backend);
        match HeaderValue::try_from(allow) {
            Ok(v) => {
                res.headers.insert(header::ALLOW, v);
            }
            Err(_) => {
                res.headers.remove(header::ALLOW);
            }
        }
        res
    }
}
