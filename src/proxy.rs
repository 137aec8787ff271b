//! One request through the proxy.
//!
//! ```text
//! inbound ─▶ SessionRewritingRequest ─▶ Upstream::prepare ─▶ Dispatcher::dispatch
//!                                                                   │
//! client ◀── ResponseHandler::relay ◀── Upstream::send ◀────────────┘
//! ```
//!
//! Backend selection and the HTTP client live behind [`Upstream`]; this
//! module only sequences the steps and maps failures to responses.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http::StatusCode;
use tracing::{debug, warn};

use crate::allow::AllowList;
use crate::dispatch::Dispatcher;
use crate::error::Error;
use crate::handler::{BackendResponse, Outbound};
use crate::request::RequestHead;
use crate::response::{IntoResponse, Response};
use crate::session::SessionRewritingRequest;

/// A heap-allocated, type-erased future borrowing from its caller.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The inbound request as seen by backend selection.
pub type SessionRequest = SessionRewritingRequest<http::Request<Bytes>>;

/// Backend selection and execution.
pub trait Upstream: Send + Sync + 'static {
    /// Picks a backend for `req` and builds the request to send it.
    ///
    /// [`SessionRequest::affinity`] names the member that created the
    /// client's session, if any.
    fn prepare(&self, req: &SessionRequest) -> Result<Outbound, Error>;

    /// Executes `outbound` and returns the backend's full response.
    fn send<'a>(&'a self, outbound: &'a Outbound) -> BoxFuture<'a, Result<BackendResponse, Error>>;
}

/// Sequences one request through cookie rewriting, backend selection,
/// dispatch and relay.
pub struct Proxy<U> {
    dispatcher: Dispatcher,
    upstream: U,
}

impl<U: Upstream> Proxy<U> {
    pub fn new(allow: AllowList, upstream: U) -> Self {
        Self { dispatcher: Dispatcher::new(allow), upstream }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    /// Never fails: every error becomes a response.
    ///
    /// | failure | status |
    /// |---|---|
    /// | no backend for the request | `502` |
    /// | method outside the allow-list | `405` + `Allow` |
    /// | backend call failed | `502` |
    pub async fn handle(&self, req: http::Request<Bytes>) -> Response {
        let req = SessionRewritingRequest::new(req);
        let method = req.method().as_str().to_owned();

        let outbound = match self.upstream.prepare(&req) {
            Ok(outbound) => outbound,
            Err(e) => {
                warn!(%method, path = req.uri().path(), "no backend: {e}");
                return Response::status(StatusCode::BAD_GATEWAY);
            }
        };

        let handler = match self.dispatcher.dispatch(&method, outbound) {
            Ok(handler) => handler,
            Err(e) => return e.into_response(),
        };

        debug!(%method, backend = %handler.outbound().uri(), affinity = req.affinity(), "relaying");

        let sent = self.upstream.send(handler.outbound()).await;
        match sent {
            Ok(backend) => handler.relay(backend),
            Err(e) => {
                warn!(%method, backend = %handler.outbound().uri(), "upstream error: {e}");
                Response::status(StatusCode::BAD_GATEWAY)
            }
        }
    }
}
