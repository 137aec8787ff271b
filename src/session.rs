//! Sticky-session cookie rewriting.
//!
//! Cluster members mark the sessions they create by appending a route suffix
//! to the session id: `JSESSIONID=4F2A9C.node1`. The proxy needs that suffix
//! to pick the backend, but the application behind it must see the bare id,
//! `JSESSIONID=4F2A9C`.
//!
//! [`SessionRewritingRequest`] wraps the inbound request and rewrites every
//! `Cookie` header once, up front. Reads of `Cookie` are answered from the
//! rewritten copy; every other read goes straight to the wrapped request.
//!
//! ```text
//! Cookie: JSESSIONID=4F2A9C.node1; Path=/   →   Cookie: JSESSIONID=4F2A9C; Path=/
//! Cookie: theme=dark                        →   Cookie: theme=dark
//! ```

use std::borrow::Cow;
use std::sync::LazyLock;

use http::header::{self, HeaderName, HeaderValue};
use http::{Method, Uri, Version};
use regex::bytes::Regex;
use tracing::debug;

use crate::request::RequestHead;

/// `JSESSIONID=<id>` followed by `.<route>`, up to the next `;` or whitespace.
///
/// Byte-oriented (`-u`) so non-UTF-8 cookie values are matched, or skipped,
/// without ever failing.
static SESSION_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i-u)(JSESSIONID=[^.\s;]+)(\.[^;\s]+)").expect("session id pattern compiles")
});

/// Removes every route suffix from the session ids in `cookie`.
///
/// Borrows `cookie` unchanged when it carries no suffixed session id, which
/// also makes the rewrite idempotent.
pub fn strip_affinity(cookie: &[u8]) -> Cow<'_, [u8]> {
    SESSION_ID.replace_all(cookie, &b"$1"[..])
}

fn normalize(value: &HeaderValue) -> HeaderValue {
    match strip_affinity(value.as_bytes()) {
        Cow::Borrowed(_) => value.clone(),
        // Dropping bytes from a valid header value leaves it valid.
        Cow::Owned(stripped) => match HeaderValue::from_bytes(&stripped) {
            Ok(mut v) => {
                v.set_sensitive(value.is_sensitive());
                v
            }
            Err(_) => value.clone(),
        },
    }
}

/// The route suffix of the first suffixed session id in `cookie`, without its dot.
fn route_of(cookie: &HeaderValue) -> Option<String> {
    let caps = SESSION_ID.captures(cookie.as_bytes())?;
    let suffix = caps.get(2)?.as_bytes();
    std::str::from_utf8(&suffix[1..]).ok().map(str::to_owned)
}

fn is_cookie(name: &str) -> bool {
    name.eq_ignore_ascii_case(header::COOKIE.as_str())
}

/// A request whose `Cookie` headers carry bare session ids.
///
/// Built once per request; the rewritten cookies live exactly as long as the
/// wrapper.
pub struct SessionRewritingRequest<R> {
    inner: R,
    cookies: Vec<HeaderValue>,
    affinity: Option<String>,
}

impl<R: RequestHead> SessionRewritingRequest<R> {
    pub fn new(inner: R) -> Self {
        let originals = inner.header_all(header::COOKIE.as_str());
        let affinity = originals.iter().find_map(|v| route_of(v));
        let cookies: Vec<HeaderValue> = originals.into_iter().map(normalize).collect();

        if let Some(route) = &affinity {
            debug!(route = %route, cookies = cookies.len(), "stripped session affinity");
        }

        Self { inner, cookies, affinity }
    }

    /// The rewritten `Cookie` values, one per original header, in order.
    pub fn cookies(&self) -> &[HeaderValue] {
        &self.cookies
    }

    /// Route suffix of the first suffixed session id, e.g. `"node1"`.
    ///
    /// This is what backend selection uses to send the client back to the
    /// member that created its session.
    pub fn affinity(&self) -> Option<&str> {
        self.affinity.as_deref()
    }

    /// The wrapped request, with its cookies untouched.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<B> SessionRewritingRequest<http::Request<B>> {
    pub fn body(&self) -> &B {
        self.inner.body()
    }
}

impl<R: RequestHead> RequestHead for SessionRewritingRequest<R> {
    fn method(&self) -> &Method { self.inner.method() }
    fn uri(&self) -> &Uri { self.inner.uri() }
    fn version(&self) -> Version { self.inner.version() }

    fn header(&self, name: &str) -> Option<&HeaderValue> {
        if is_cookie(name) {
            self.cookies.first()
        } else {
            self.inner.header(name)
        }
    }

    fn header_all(&self, name: &str) -> Vec<&HeaderValue> {
        if is_cookie(name) {
            self.cookies.iter().collect()
        } else {
            self.inner.header_all(name)
        }
    }

    fn header_names(&self) -> Vec<&HeaderName> {
        self.inner.header_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(cookie: &str) -> String {
        String::from_utf8(strip_affinity(cookie.as_bytes()).into_owned()).unwrap()
    }

    fn request(cookies: &[&str]) -> http::Request<()> {
        let mut builder = http::Request::builder().header("x-forwarded-for", "10.0.0.1");
        for cookie in cookies {
            builder = builder.header("cookie", *cookie);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn strips_route_suffix() {
        assert_eq!(strip("JSESSIONID=ABC123.node1"), "JSESSIONID=ABC123");
    }

    #[test]
    fn keeps_trailing_attributes() {
        assert_eq!(
            strip("JSESSIONID=ABC123.node1; Path=/; Domain=x"),
            "JSESSIONID=ABC123; Path=/; Domain=x",
        );
    }

    #[test]
    fn keeps_other_cookies_on_the_same_line() {
        assert_eq!(
            strip("theme=dark; JSESSIONID=ABC123.node1.eu; lang=en"),
            "theme=dark; JSESSIONID=ABC123; lang=en",
        );
    }

    #[test]
    fn session_name_is_case_insensitive() {
        assert_eq!(strip("jsessionid=abc.node2"), "jsessionid=abc");
    }

    #[test]
    fn lines_without_session_pass_through() {
        assert!(matches!(strip_affinity(b"foo=bar"), Cow::Borrowed(_)));
        assert!(matches!(strip_affinity(b"JSESSIONID=ABC123"), Cow::Borrowed(_)));
        assert_eq!(strip("foo=bar"), "foo=bar");
    }

    #[test]
    fn rewrite_is_idempotent() {
        for cookie in ["JSESSIONID=ABC123.node1", "a=b; JSESSIONID=X.y; Path=/", "foo=bar"] {
            let once = strip(cookie);
            assert_eq!(strip(&once), once);
        }
    }

    #[test]
    fn non_utf8_values_are_left_alone() {
        let raw = b"blob=\xff\xfe";
        assert_eq!(&*strip_affinity(raw), &raw[..]);
    }

    #[test]
    fn wrapper_serves_stripped_cookie_not_the_original() {
        let req = SessionRewritingRequest::new(request(&["JSESSIONID=ABC123.node1"]));

        assert_eq!(req.header("Cookie").unwrap(), "JSESSIONID=ABC123");
        assert_eq!(req.inner().headers()["cookie"], "JSESSIONID=ABC123.node1");
    }

    #[test]
    fn every_cookie_header_is_kept_in_order() {
        let req = SessionRewritingRequest::new(request(&["JSESSIONID=S1.node1", "theme=dark"]));

        let all = req.header_all("COOKIE");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], "JSESSIONID=S1");
        assert_eq!(all[1], "theme=dark");
        assert_eq!(req.header("cookie").unwrap(), "JSESSIONID=S1");
    }

    #[test]
    fn no_cookie_header_reads_as_absent() {
        let req = SessionRewritingRequest::new(request(&[]));

        assert!(req.cookies().is_empty());
        assert!(req.header("cookie").is_none());
        assert!(req.header_all("cookie").is_empty());
        assert!(req.affinity().is_none());
    }

    #[test]
    fn other_headers_fall_through() {
        let req = SessionRewritingRequest::new(request(&["JSESSIONID=S1.node1"]));

        assert_eq!(req.header("X-Forwarded-For").unwrap(), "10.0.0.1");
        assert_eq!(RequestHead::method(&req), &Method::GET);
        assert_eq!(req.header_names().len(), 2);
    }

    #[test]
    fn exposes_route_of_first_session_cookie() {
        let req = SessionRewritingRequest::new(request(&["theme=dark", "JSESSIONID=S1.node7; Path=/"]));
        assert_eq!(req.affinity(), Some("node7"));
    }
}
