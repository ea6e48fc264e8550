//! HTTP codec module for decoding requests and encoding replies
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`RequestDecoder`]: Decodes incoming HTTP requests
//!   - Header parsing via [`header`] module
//!   - Payload decoding via [`body`] module
//!
//! - Response handling:
//!   - [`ResponseEncoder`]: Encodes the fixed replies
//!   - Header encoding via [`header`] module
//!
//! # Example
//!
//! ```
//! use probe_http::codec::{RequestDecoder, ResponseEncoder};
//! use probe_http::protocol::Reply;
//! use tokio_util::codec::{Decoder, Encoder};
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut request_buffer = BytesMut::from(&b"GET / HTTP/1.1\r\n\r\n"[..]);
//! let request = decoder.decode(&mut request_buffer).unwrap();
//! assert!(request.is_some());
//!
//! let mut encoder = ResponseEncoder::new();
//! let mut response_buffer = BytesMut::new();
//! encoder.encode(Reply::ack(true), &mut response_buffer).unwrap();
//! assert!(response_buffer.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

pub mod body;
pub mod header;
mod request_decoder;
mod response_encoder;

pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;
