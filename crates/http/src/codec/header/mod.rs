//! HTTP header processing module for encoding and decoding headers
//!
//! # Components
//!
//! - [`HeaderDecoder`]: Decodes HTTP request heads from raw bytes
//!   - Supports HTTP/1.0 and HTTP/1.1 request lines
//!   - Keeps the raw header block for logging
//!   - Manages header size limits
//!   - Chooses the body framing policy
//!
//! - [`HeaderEncoder`]: Encodes HTTP response heads to bytes
//!   - Writes the status line and header fields
//!   - Sets the content-length header from the payload size

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub use header_encoder::HeaderEncoder;
