//! HTTP request header handling implementation.
//!
//! [`RequestHeader`] wraps the standard `http::Request<()>` and keeps the
//! request target and the header block bytes exactly as they arrived, so the
//! request log can show what the client sent rather than a normalized rendering.

use bytes::Bytes;
use http::header::CONNECTION;
use http::{HeaderMap, Method, Request, Uri, Version};

/// Represents a parsed HTTP request head.
#[derive(Debug)]
pub struct RequestHeader {
    inner: Request<()>,
    target: String,
    raw_headers: Bytes,
}

impl RequestHeader {
    pub(crate) fn new(inner: Request<()>, target: String, raw_headers: Bytes) -> Self {
        Self { inner, target, raw_headers }
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    /// Returns the request target parsed as a URI, `/` when it does not parse.
    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    /// Returns the request target exactly as sent on the request line.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the request's HTTP version.
    pub fn version(&self) -> Version {
        self.inner.version()
    }

    /// Returns the parsed headers: case-insensitive lookup, duplicates kept in order.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Header lines as received, including the terminating blank line.
    pub fn raw_headers(&self) -> &Bytes {
        &self.raw_headers
    }

    /// Whether the client expects the connection to stay open after this request.
    ///
    /// HTTP/1.1 defaults to persistent unless `Connection: close` is sent,
    /// HTTP/1.0 only stays open with an explicit `Connection: keep-alive`.
    pub fn keep_alive(&self) -> bool {
        let mut close = false;
        let mut keep_alive = false;
        for value in self.headers().get_all(CONNECTION) {
            for token in value.as_bytes().split(|b| *b == b',') {
                let token = token.trim_ascii();
                close |= token.eq_ignore_ascii_case(b"close");
                keep_alive |= token.eq_ignore_ascii_case(b"keep-alive");
            }
        }

        if close {
            return false;
        }

        match self.version() {
            Version::HTTP_10 => keep_alive,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    fn header(version: Version, connection: Option<&'static str>) -> RequestHeader {
        let mut request = Request::new(());
        *request.version_mut() = version;
        if let Some(value) = connection {
            request.headers_mut().insert(CONNECTION, HeaderValue::from_static(value));
        }
        RequestHeader::new(request, "/".to_owned(), Bytes::new())
    }

    #[test]
    fn http11_is_persistent_by_default() {
        assert!(header(Version::HTTP_11, None).keep_alive());
        assert!(header(Version::HTTP_11, Some("keep-alive")).keep_alive());
        assert!(!header(Version::HTTP_11, Some("close")).keep_alive());
        assert!(!header(Version::HTTP_11, Some("Upgrade, Close")).keep_alive());
    }

    #[test]
    fn http10_needs_explicit_keep_alive() {
        assert!(!header(Version::HTTP_10, None).keep_alive());
        assert!(header(Version::HTTP_10, Some("Keep-Alive")).keep_alive());
    }
}
