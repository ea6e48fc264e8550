use std::net::SocketAddr;

use crate::protocol::RequestHeader;

/// Request body resolved according to its framing policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Neither chunked encoding nor a positive Content-Length.
    Empty,
    /// Exactly Content-Length bytes.
    Length(String),
    /// Concatenated chunk payloads.
    ///
    /// `malformed_size` holds the size line that stopped decoding early, if any.
    Chunked { text: String, malformed_size: Option<String> },
}

/// Everything recorded about one request.
#[derive(Debug)]
pub struct CapturedRequest {
    remote_addr: SocketAddr,
    header: RequestHeader,
    body: Body,
}

impl CapturedRequest {
    pub fn new(remote_addr: SocketAddr, header: RequestHeader, body: Body) -> Self {
        Self { remote_addr, header, body }
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    pub fn header(&self) -> &RequestHeader {
        &self.header
    }

    pub fn body(&self) -> &Body {
        &self.body
    }
}
