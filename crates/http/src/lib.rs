//! Request capture over HTTP/1.1
//!
//! This crate reads HTTP/1.1 requests from a byte stream, resolves each body
//! according to its framing, records every request in an append-only log and
//! answers with a minimal acknowledgement. It is built on top of tokio and
//! decodes requests incrementally, so a slow or pipelining client never blocks
//! other connections.
//!
//! # Features
//!
//! - Request heads parsed with `httparse`, raw header block preserved
//! - `Content-Length` and chunked bodies
//! - Tolerant chunked decoding: a bad chunk size keeps what was read so far
//! - Keep-alive connections with pipelined requests
//! - One log entry per request, never interleaved between connections
//!
//! # Example
//!
//! ```no_run
//! use std::io;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn};
//! use probe_http::connection::HttpConnection;
//! use probe_http::logger::RequestLogger;
//!
//! #[tokio::main]
//! async fn main() {
//!     let logger = Arc::new(RequestLogger::new(io::stdout()));
//!
//!     info!(port = 8080, "start listening");
//!     let tcp_listener = match TcpListener::bind("0.0.0.0:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     loop {
//!         let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let logger = logger.clone();
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             let connection = HttpConnection::new(reader, writer, remote_addr);
//!             if let Err(e) = connection.process(&logger).await {
//!                 error!("connection closed after error, cause {}", e);
//!             }
//!         });
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! - [`codec`]: Request decoding and response encoding
//! - [`connection`]: The per-connection request loop
//! - [`logger`]: Request log formatting and writing
//! - [`protocol`]: Message types, the captured request model and errors

pub mod codec;
pub mod connection;
pub mod logger;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
