//! HTTP request decoder module
//!
//! This module decodes HTTP requests using a streaming approach: the head is
//! parsed by [`HeaderDecoder`], then the body is produced by a
//! [`PayloadDecoder`] picked from the head.
//!
//! # Example
//!
//! ```
//! use probe_http::codec::RequestDecoder;
//! use probe_http::protocol::Message;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from(&b"GET /ping HTTP/1.1\r\nHost: x\r\n\r\n"[..]);
//! let message = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert!(matches!(message, Message::Header(_)));
//! ```

use crate::codec::body::PayloadDecoder;
use crate::codec::header::HeaderDecoder;
use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, RequestHeader};
use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::debug;

/// A decoder for HTTP requests that handles both headers and payload
///
/// # State Machine
///
/// The decoder maintains its state through the `payload_decoder` field:
/// - `None`: Currently parsing headers
/// - `Some(PayloadDecoder)`: Currently parsing payload
#[derive(Debug, Default)]
pub struct RequestDecoder {
    header_decoder: HeaderDecoder,
    payload_decoder: Option<PayloadDecoder>,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` instance
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for RequestDecoder {
    type Item = Message<(RequestHeader, PayloadSize)>;
    type Error = ParseError;

    /// Attempts to decode an HTTP request from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Message::Header(_)))`: Successfully decoded a request head
    /// - `Ok(Some(Message::Payload(_)))`: Successfully decoded a payload item
    /// - `Ok(None)`: Need more data to proceed
    /// - `Err(_)`: Encountered a parsing error
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // parse payload if have payload_decoder
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let message = match payload_decoder.decode(src)? {
                Some(item @ PayloadItem::Chunk(_)) => Some(Message::Payload(item)),
                Some(item @ (PayloadItem::Eof | PayloadItem::Truncated(_))) => {
                    // no need payload decoder in this request now
                    self.payload_decoder.take();
                    Some(Message::Payload(item))
                }
                None => None,
            };

            return Ok(message);
        }

        // parse request
        let message = match self.header_decoder.decode(src)? {
            Some((header, payload_size)) => {
                self.payload_decoder = Some(payload_size.into());
                Some(Message::Header((header, payload_size)))
            }
            None => None,
        };

        Ok(message)
    }

    /// Handles the end of the stream.
    ///
    /// Leftover bytes of an unfinished head end the connection quietly, an
    /// unfinished body is an error.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(message) = self.decode(src)? {
            return Ok(Some(message));
        }

        if self.payload_decoder.is_some() {
            return Err(ParseError::invalid_body("connection closed before the body was complete"));
        }

        if !src.is_empty() {
            debug!(remaining = src.len(), "discard incomplete request head at end of stream");
            src.clear();
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn body_of(decoder: &mut RequestDecoder, buffer: &mut BytesMut) -> (Vec<u8>, PayloadItem) {
        let mut body = Vec::new();
        loop {
            match decoder.decode(buffer).unwrap().unwrap().into_payload_item().unwrap() {
                PayloadItem::Chunk(bytes) => body.extend_from_slice(&bytes),
                end => return (body, end),
            }
        }
    }

    #[test]
    fn pipelined_requests() {
        let mut buffer = BytesMut::from(
            &b"POST /a HTTP/1.1\r\nContent-Length: 3\r\n\r\nonePOST /b HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n3\r\ntwo\r\n0\r\n\r\nGET /c HTTP/1.1\r\n\r\n"[..],
        );
        let mut decoder = RequestDecoder::new();

        let Message::Header((header, payload_size)) = decoder.decode(&mut buffer).unwrap().unwrap() else {
            panic!("expect header");
        };
        assert_eq!(header.uri().path(), "/a");
        assert_eq!(payload_size, PayloadSize::Length(3));
        let (body, end) = body_of(&mut decoder, &mut buffer);
        assert_eq!(body, b"one");
        assert!(end.is_eof());

        let Message::Header((header, payload_size)) = decoder.decode(&mut buffer).unwrap().unwrap() else {
            panic!("expect header");
        };
        assert_eq!(header.uri().path(), "/b");
        assert!(payload_size.is_chunked());
        let (body, end) = body_of(&mut decoder, &mut buffer);
        assert_eq!(body, b"two");
        assert!(end.is_eof());

        // the CRLF left after the zero-size chunk is skipped before the next request line
        let Message::Header((header, payload_size)) = decoder.decode(&mut buffer).unwrap().unwrap() else {
            panic!("expect header");
        };
        assert_eq!(header.uri().path(), "/c");
        assert!(payload_size.is_empty());
        let (body, end) = body_of(&mut decoder, &mut buffer);
        assert!(body.is_empty());
        assert!(end.is_eof());

        assert!(buffer.is_empty());
        assert!(decoder.decode(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn truncated_chunked_body_resets_decoder() {
        let mut buffer = BytesMut::from(&b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n2\r\nok\r\nzz\r\n"[..]);
        let mut decoder = RequestDecoder::new();

        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_header());
        let (body, end) = body_of(&mut decoder, &mut buffer);
        assert_eq!(body, b"ok");
        assert_eq!(end, PayloadItem::Truncated(Bytes::from_static(b"zz")));

        assert!(decoder.payload_decoder.is_none());
    }

    #[test]
    fn eof_without_data() {
        let mut buffer = BytesMut::new();
        assert!(RequestDecoder::new().decode_eof(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn eof_with_partial_head() {
        let mut buffer = BytesMut::from(&b"GET /ping HTTP/1.1\r\nHo"[..]);
        assert!(RequestDecoder::new().decode_eof(&mut buffer).unwrap().is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn eof_in_body() {
        let mut buffer = BytesMut::from(&b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc"[..]);
        let mut decoder = RequestDecoder::new();

        assert!(decoder.decode_eof(&mut buffer).unwrap().unwrap().is_header());
        let chunk = decoder.decode_eof(&mut buffer).unwrap().unwrap();
        assert!(chunk.is_payload());

        let result = decoder.decode_eof(&mut buffer);
        assert!(matches!(result, Err(ParseError::InvalidBody { .. })));
    }
}
