//! # relay
//!
//! The request/response adaptation layer of a sticky-session HTTP reverse
//! proxy.
//!
//! ## What it does
//!
//! - **Cookie rewriting.** Cluster members tag session ids with a route
//!   suffix (`JSESSIONID=4F2A9C.node1`). [`SessionRewritingRequest`] hides the
//!   suffix from everything downstream while keeping it available to backend
//!   selection through [`SessionRewritingRequest::affinity`].
//! - **Method dispatch.** [`Dispatcher`] picks a [`ResponseHandler`] per
//!   method and answers anything outside the [`AllowList`] with `405`. The
//!   OPTIONS handler advertises the very same list.
//!
//! What it leaves to you, behind [`Upstream`]:
//!
//! - choosing a backend
//! - the HTTP client call
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use relay::{
//!     BackendResponse, BoxFuture, Error, Outbound, Proxy, ProxyConfig, RequestHead, Server,
//!     SessionRequest, Upstream,
//! };
//!
//! struct Cluster;
//!
//! impl Upstream for Cluster {
//!     fn prepare(&self, req: &SessionRequest) -> Result<Outbound, Error> {
//!         let backend = match req.affinity() {
//!             Some("node2") => "http://10.0.0.2:8080",
//!             _ => "http://10.0.0.1:8080",
//!         };
//!         let mut outbound = http::Request::builder()
//!             .method(req.method().clone())
//!             .uri(format!("{backend}{}", req.uri().path()));
//!         // Forward the rewritten cookies, not the originals.
//!         for cookie in req.header_all("cookie") {
//!             outbound = outbound.header(http::header::COOKIE, cookie.clone());
//!         }
//!         outbound.body(req.body().clone()).map_err(Error::upstream)
//!     }
//!
//!     fn send<'a>(&'a self, outbound: &'a Outbound) -> BoxFuture<'a, Result<BackendResponse, Error>> {
//!         Box::pin(async move {
//!             // hand `outbound` to your HTTP client of choice
//!             let _ = outbound;
//!             Ok(http::Response::new(Bytes::new()))
//!         })
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let config = ProxyConfig::load("relay.toml")?;
//!     let proxy = Proxy::new(config.allowed_methods.clone(), Cluster);
//!     Server::from_config(&config).serve(proxy).await
//! }
//! ```

mod allow;
mod config;
mod dispatch;
mod error;
mod handler;
mod method;
mod proxy;
mod request;
mod response;
mod server;
mod session;

pub use allow::AllowList;
pub use config::ProxyConfig;
pub use dispatch::Dispatcher;
pub use error::{Error, MethodNotAllowed};
pub use handler::{
    BackendResponse, DeleteHandler, GetHandler, HeadHandler, OptionsHandler, Outbound, PostHandler,
    PutHandler, ResponseHandler,
};
pub use method::Method;
pub use proxy::{BoxFuture, Proxy, SessionRequest, Upstream};
pub use request::RequestHead;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use server::Server;
pub use session::{SessionRewritingRequest, strip_affinity};
