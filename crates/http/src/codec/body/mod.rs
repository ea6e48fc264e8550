//! HTTP body decoding for captured requests.
//!
//! # Components
//!
//! - [`ChunkedDecoder`]: Handles chunked transfer encoded payloads
//! - [`LengthDecoder`]: Processes fixed-length payloads
//! - [`PayloadDecoder`]: Main decoder that picks the strategy for a request

mod chunked_decoder;
mod length_decoder;
mod payload_decoder;

pub use chunked_decoder::ChunkedDecoder;
pub use length_decoder::LengthDecoder;
pub use payload_decoder::PayloadDecoder;
