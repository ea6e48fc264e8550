//! HTTP header encoder implementation for serializing HTTP response heads
//!
//! Writes the status line and header fields of a [`ResponseHead`], setting
//! `content-length` from the [`PayloadSize`]. Replies are always HTTP/1.1 and
//! never chunked.

use crate::protocol::{PayloadSize, ResponseHead, SendError};

use bytes::{BufMut, BytesMut};

use http::{header, HeaderValue};
use std::io;
use std::io::Write;
use tokio_util::codec::Encoder;
use tracing::error;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 512;

/// Encoder for HTTP response heads implementing the [`Encoder`] trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl Encoder<(ResponseHead, PayloadSize)> for HeaderEncoder {
    type Error = SendError;

    /// Encodes an HTTP response head into the provided bytes buffer.
    ///
    /// # Errors
    ///
    /// Returns error if the payload size is chunked, which replies never use.
    fn encode(&mut self, item: (ResponseHead, PayloadSize), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (mut header, payload_size) = item;

        let content_length = match payload_size {
            PayloadSize::Length(n) => n,
            PayloadSize::Empty => 0,
            PayloadSize::Chunked => {
                error!("chunked responses are not supported");
                return Err(SendError::invalid_response("chunked response body"));
            }
        };
        header.headers_mut().insert(header::CONTENT_LENGTH, HeaderValue::from(content_length));

        dst.reserve(INIT_HEADER_SIZE);
        write!(
            FastWrite(dst),
            "HTTP/1.1 {} {}\r\n",
            header.status().as_str(),
            header.status().canonical_reason().unwrap_or("")
        )?;

        // Write all headers
        for (header_name, header_value) in header.headers() {
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

/// Writer adapter appending to a `BytesMut`.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
