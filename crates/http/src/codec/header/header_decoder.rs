//! HTTP header decoder implementation for parsing HTTP request heads
//!
//! This module decodes a request line and header block from raw bytes into a
//! [`RequestHeader`] and picks the [`PayloadSize`] policy used to read the body.
//!
//! # Limits
//!
//! - Maximum number of headers: 100
//! - Maximum header size: 64KB
//! - Only supports HTTP/1.0 and HTTP/1.1
//!
//! # Body policy
//!
//! 1. `Transfer-Encoding` exactly `chunked` selects chunked decoding, any
//!    Content-Length is ignored
//! 2. otherwise a positive `Content-Length` selects a fixed-length body, a
//!    missing or unparseable value counts as zero
//! 3. otherwise the request has no body
//!
//! The policy does not depend on the request method.

use std::mem::MaybeUninit;

use bytes::BytesMut;
use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};
use httparse::{Error, Status};
use tokio_util::codec::Decoder;
use tracing::{debug, trace};

use crate::ensure;

use crate::protocol::{ParseError, PayloadSize, RequestHeader};

/// Maximum number of headers allowed in a request
const MAX_HEADER_NUM: usize = 100;

/// Maximum size in bytes allowed for the entire header section
const MAX_HEADER_BYTES: usize = 64 * 1024;

/// Decoder for HTTP request heads implementing the [`Decoder`] trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderDecoder;

impl Decoder for HeaderDecoder {
    type Item = (RequestHeader, PayloadSize);
    type Error = ParseError;

    /// Attempts to decode an HTTP request head from the provided bytes buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((header, payload_size)))` if a complete head was parsed
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if the request line or headers are malformed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Minimum valid HTTP request needs at least "GET / HTTP/1.1\r\n\r\n"
        if src.len() < 14 {
            return Ok(None);
        }

        let mut req = httparse::Request::new(&mut []);
        let mut headers = [MaybeUninit::uninit(); MAX_HEADER_NUM];

        // httparse skips empty lines in front of the request line
        let parsed_result = req.parse_with_uninit_headers(src, &mut headers).map_err(|e| match e {
            Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
            e => ParseError::invalid_header(e.to_string()),
        });

        match parsed_result? {
            Status::Complete(body_offset) => {
                trace!(body_size = body_offset, "parsed body size");
                ensure!(body_offset <= MAX_HEADER_BYTES, ParseError::too_large_header(body_offset, MAX_HEADER_BYTES));

                let header_count = req.headers.len();

                // Calculate and record byte range indices for each header
                let mut header_index: [HeaderIndex; MAX_HEADER_NUM] = EMPTY_HEADER_INDEX_ARRAY;
                HeaderIndex::record(src, req.headers, &mut header_index);

                let version = match req.version {
                    Some(0) => http::Version::HTTP_10,
                    Some(1) => http::Version::HTTP_11,
                    _ => return Err(ParseError::InvalidVersion(req.version)),
                };

                let method = req.method.ok_or(ParseError::InvalidMethod)?;
                let method = Method::from_bytes(method.as_bytes()).map_err(|_e| ParseError::InvalidMethod)?;
                let target = req.path.ok_or(ParseError::InvalidUri)?;
                // the raw target is what gets logged, a target `http::Uri` refuses leaves `uri` at `/`
                let uri = Uri::try_from(target).unwrap_or_else(|e| {
                    debug!(request_target = target, cause = %e, "request target is not a valid uri");
                    Uri::default()
                });
                let target = target.to_owned();

                let mut request = Request::new(());
                *request.method_mut() = method;
                *request.uri_mut() = uri;
                *request.version_mut() = version;

                // Split header portion from source buffer
                let header_bytes = src.split_to(body_offset).freeze();

                let headers = request.headers_mut();
                headers.reserve(header_count);
                for index in &header_index[..header_count] {
                    let name = HeaderName::from_bytes(&header_bytes[index.name.0..index.name.1])
                        .map_err(|e| ParseError::invalid_header(e.to_string()))?;
                    let value = HeaderValue::from_maybe_shared(header_bytes.slice(index.value.0..index.value.1))
                        .map_err(|e| ParseError::invalid_header(e.to_string()))?;
                    headers.append(name, value);
                }

                // the raw block runs from the first header name to the blank line
                let raw_start = header_index[..header_count].first().map_or(body_offset, |index| index.name.0);
                let raw_headers = header_bytes.slice(raw_start..body_offset);

                let payload_size = parse_payload(request.headers());
                let header = RequestHeader::new(request, target, raw_headers);

                Ok(Some((header, payload_size)))
            }
            // If parsing incomplete, ensure current buffer size does not exceed limit
            Status::Partial => {
                ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
                Ok(None)
            }
        }
    }
}

/// Stores the byte range positions of a header's name and value within the original buffer.
#[derive(Clone, Copy)]
struct HeaderIndex {
    /// Start and end byte positions of the header name
    name: (usize, usize),
    /// Start and end byte positions of the header value
    value: (usize, usize),
}

const EMPTY_HEADER_INDEX: HeaderIndex = HeaderIndex { name: (0, 0), value: (0, 0) };

const EMPTY_HEADER_INDEX_ARRAY: [HeaderIndex; MAX_HEADER_NUM] = [EMPTY_HEADER_INDEX; MAX_HEADER_NUM];

impl HeaderIndex {
    /// Records the byte positions of header names and values from the parsed headers.
    fn record(bytes: &[u8], headers: &[httparse::Header<'_>], indices: &mut [HeaderIndex]) {
        let bytes_ptr = bytes.as_ptr() as usize;
        for (header, indices) in headers.iter().zip(indices.iter_mut()) {
            let name_start = header.name.as_ptr() as usize - bytes_ptr;
            let name_end = name_start + header.name.len();
            indices.name = (name_start, name_end);
            let value_start = header.value.as_ptr() as usize - bytes_ptr;
            let value_end = value_start + header.value.len();
            indices.value = (value_start, value_end);
        }
    }
}

/// Determines how the body is framed from the request headers.
fn parse_payload(headers: &HeaderMap) -> PayloadSize {
    if is_chunked(headers.get(TRANSFER_ENCODING)) {
        return PayloadSize::new_chunked();
    }

    PayloadSize::new_length(content_length(headers.get(CONTENT_LENGTH)))
}

/// Checks whether the first Transfer-Encoding value is exactly `chunked`, byte for byte.
fn is_chunked(header_value: Option<&HeaderValue>) -> bool {
    const CHUNKED: &[u8] = b"chunked";
    header_value.is_some_and(|value| value.as_bytes() == CHUNKED)
}

/// Reads the Content-Length value, treating a missing or unparseable one as zero.
fn content_length(header_value: Option<&HeaderValue>) -> u64 {
    let Some(value) = header_value else {
        return 0;
    };

    match value.to_str().ok().and_then(|s| s.trim().parse::<u64>().ok()) {
        Some(length) => length,
        None => {
            debug!(content_length = ?value, "unparseable content-length, treating body as empty");
            0
        }
    }
}
