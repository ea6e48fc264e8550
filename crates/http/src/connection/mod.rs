//! HTTP connection handling module
//!
//! # Components
//!
//! - [`HttpConnection`]: the per-connection loop that:
//!   - Reads and decodes requests one after another
//!   - Resolves each body according to its framing
//!   - Writes one request log entry per request
//!   - Answers `200`, or `500` when handling a request fails
//!   - Keeps persistent connections open until the client ends them

mod http_connection;

pub use http_connection::HttpConnection;
