//! HTTP response types.
//!
//! The listener never generates content: it either acknowledges a captured
//! request or reports that handling it failed.

use http::Response;

/// Type alias for HTTP response headers.
pub type ResponseHead = Response<()>;

/// Value of the `server` header.
pub const SERVER_TOKEN: &str = "CustomHTTP/1.0";

/// A response the connection can send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `200 OK` with an empty body.
    Ack { keep_alive: bool },
    /// `500 Internal Server Error` with the reason as plain text.
    InternalError { reason: String },
}

impl Reply {
    pub fn ack(keep_alive: bool) -> Self {
        Reply::Ack { keep_alive }
    }

    pub fn internal_error<S: ToString>(reason: S) -> Self {
        Reply::InternalError { reason: reason.to_string() }
    }
}
