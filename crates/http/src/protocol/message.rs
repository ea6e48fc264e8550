use bytes::Bytes;

/// Represents a decoded piece of an HTTP request stream.
///
/// The decoder first yields a `Header` carrying the parsed head `T`, then
/// `Payload` items until the body is finished.
#[derive(Debug)]
pub enum Message<T> {
    /// Contains the header information of type `T`
    Header(T),
    /// Contains a chunk of payload data or an end marker
    Payload(PayloadItem),
}

/// Represents an item in the HTTP message payload stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem {
    /// A chunk of payload data
    Chunk(Bytes),
    /// Marks the end of the payload stream
    Eof,
    /// The chunked body ended early on a size line that is not valid hex.
    ///
    /// Carries the offending line with surrounding whitespace stripped.
    Truncated(Bytes),
}

/// Represents how the body of a request is framed.
///
/// The policy is chosen once from the request headers:
/// - Chunked: `Transfer-Encoding: chunked`, wins over any Content-Length
/// - Length: a positive `Content-Length`
/// - Empty: neither of the above
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    /// Payload with known length in bytes
    Length(u64),
    /// Payload using chunked transfer encoding
    Chunked,
    /// Empty payload (no body)
    Empty,
}

impl PayloadSize {
    #[inline]
    pub fn new_chunked() -> Self {
        PayloadSize::Chunked
    }

    /// A zero length is the same as no body at all.
    #[inline]
    pub fn new_length(length: u64) -> Self {
        if length == 0 { PayloadSize::Empty } else { PayloadSize::Length(length) }
    }

    /// Returns true if the payload uses chunked transfer encoding
    #[cfg(test)]
    #[inline]
    pub(crate) fn is_chunked(&self) -> bool {
        matches!(self, PayloadSize::Chunked)
    }

    /// Returns true if the payload is empty
    #[cfg(test)]
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, PayloadSize::Empty)
    }
}

impl<T> Message<T> {
    /// Returns true if this message contains payload data
    #[cfg(test)]
    #[inline]
    pub(crate) fn is_payload(&self) -> bool {
        matches!(self, Message::Payload(_))
    }

    /// Returns true if this message contains header information
    #[cfg(test)]
    #[inline]
    pub(crate) fn is_header(&self) -> bool {
        matches!(self, Message::Header(_))
    }

    /// Converts the message into a `PayloadItem` if it contains payload data
    #[cfg(test)]
    pub(crate) fn into_payload_item(self) -> Option<PayloadItem> {
        match self {
            Message::Header(_) => None,
            Message::Payload(payload_item) => Some(payload_item),
        }
    }
}

impl PayloadItem {
    /// Returns true if this item represents the end of the payload stream
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    /// Returns true if this item contains chunk data
    #[cfg(test)]
    #[inline]
    pub(crate) fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }

    #[inline]
    pub fn is_truncated(&self) -> bool {
        matches!(self, PayloadItem::Truncated(_))
    }

    /// Returns a reference to the contained bytes if this is a Chunk
    #[cfg(test)]
    pub(crate) fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof | PayloadItem::Truncated(_) => None,
        }
    }
}
