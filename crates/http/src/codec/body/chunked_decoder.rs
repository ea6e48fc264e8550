//! Decoder implementation for HTTP chunked transfer encoding.
//!
//! The decoder is line oriented: a size line is read whole, stripped and
//! parsed as hexadecimal, then exactly that many bytes are taken as chunk
//! data and the next two bytes are dropped as the delimiter, whatever they
//! are. Chunk extensions are not understood and make the size line invalid.
//!
//! An invalid size line does not fail the request. It ends the body early
//! with [`PayloadItem::Truncated`] so the caller can log what was decoded so
//! far. Whatever follows the zero-size chunk (the final CRLF, trailers) is
//! left unread.

use crate::protocol::{ParseError, PayloadItem};
use bytes::{Buf, Bytes, BytesMut};
use std::cmp;
use tokio_util::codec::Decoder;
use tracing::{trace, warn};
use ChunkedState::{Data, Delimiter, End, Size};

/// Longest size line we wait for before giving up on it.
const MAX_SIZE_LINE_BYTES: usize = 8 * 1024;

/// Bytes dropped after every chunk payload.
const DELIMITER_LEN: u8 = 2;

/// A decoder for handling HTTP chunked transfer encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
}

impl ChunkedDecoder {
    /// Creates a new `ChunkedDecoder` ready to read the first size line.
    pub fn new() -> Self {
        Self { state: Size }
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// Waiting for a complete size line
    Size,
    /// Reading chunk payload
    Data { remaining: u64 },
    /// Dropping the bytes after a chunk payload
    Delimiter { remaining: u8 },
    /// Zero-size chunk seen, or decoding stopped on a bad size line
    End,
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    /// Decodes chunked transfer encoded data from the input buffer.
    ///
    /// # Returns
    /// - `Ok(Some(PayloadItem::Chunk(bytes)))` when chunk data is available
    /// - `Ok(Some(PayloadItem::Eof))` when the zero-size chunk is read
    /// - `Ok(Some(PayloadItem::Truncated(line)))` when a size line is not valid hex
    /// - `Ok(None)` when more data is needed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.state {
                End => return Ok(Some(PayloadItem::Eof)),

                Size => {
                    let Some(line) = take_line(src) else {
                        if src.len() > MAX_SIZE_LINE_BYTES {
                            warn!(buffered = src.len(), "chunk size line too long");
                            self.state = End;
                            let line = src.split().freeze();
                            return Ok(Some(PayloadItem::Truncated(line)));
                        }
                        return Ok(None);
                    };

                    let token = trim(&line);
                    match parse_chunk_size(&token) {
                        Some(0) => {
                            trace!("finished reading chunked data");
                            self.state = End;
                            return Ok(Some(PayloadItem::Eof));
                        }
                        Some(size) => {
                            trace!(size, "read chunk size");
                            self.state = Data { remaining: size };
                        }
                        None => {
                            self.state = End;
                            return Ok(Some(PayloadItem::Truncated(token)));
                        }
                    }
                }

                Data { remaining } => {
                    if src.is_empty() {
                        return Ok(None);
                    }

                    // cap remaining bytes at what is buffered
                    let read_size = usize::try_from(remaining).map_or(src.len(), |r| cmp::min(r, src.len()));
                    let bytes = src.split_to(read_size).freeze();
                    let remaining = remaining - bytes.len() as u64;

                    self.state = if remaining == 0 { Delimiter { remaining: DELIMITER_LEN } } else { Data { remaining } };

                    trace!(len = bytes.len(), "read chunked bytes");
                    return Ok(Some(PayloadItem::Chunk(bytes)));
                }

                Delimiter { remaining } => {
                    if src.is_empty() {
                        return Ok(None);
                    }

                    let skip = u8::try_from(src.len()).map_or(remaining, |len| cmp::min(remaining, len));
                    src.advance(usize::from(skip));
                    let remaining = remaining - skip;

                    self.state = if remaining == 0 { Size } else { Delimiter { remaining } };
                }
            }
        }
    }
}

/// Splits off one line including its `\n`, if a complete line is buffered.
fn take_line(src: &mut BytesMut) -> Option<Bytes> {
    let end = src.iter().position(|b| *b == b'\n')?;
    Some(src.split_to(end + 1).freeze())
}

fn trim(line: &Bytes) -> Bytes {
    let trimmed = line.trim_ascii();
    if trimmed.is_empty() {
        return Bytes::new();
    }
    line.slice_ref(trimmed)
}

fn parse_chunk_size(token: &[u8]) -> Option<u64> {
    let token = std::str::from_utf8(token).ok()?;
    u64::from_str_radix(token, 16).ok()
}
