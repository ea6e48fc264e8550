//! Core HTTP protocol abstractions.
//!
//! # Architecture
//!
//! - **Message Handling** ([`message`]): what the request decoder yields
//!   - [`Message`]: Represents either a request head or a payload item
//!   - [`PayloadItem`]: Body chunks, end of body, or an early stop on a bad chunk size
//!   - [`PayloadSize`]: The body framing policy chosen from the headers
//!
//! - **Request Processing** ([`request`]): [`RequestHeader`] with the raw header block
//!
//! - **Captured Requests** ([`capture`]): [`CapturedRequest`] and its resolved [`Body`]
//!
//! - **Responses** ([`response`]): the fixed [`Reply`] set
//!
//! - **Error Handling** ([`error`]):
//!   - [`HttpError`]: Top-level error type at the connection boundary
//!   - [`ParseError`]: Request parsing errors
//!   - [`SendError`]: Response sending errors

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod request;
pub use request::RequestHeader;

mod capture;
pub use capture::Body;
pub use capture::CapturedRequest;

mod response;
pub use response::Reply;
pub use response::ResponseHead;
pub use response::SERVER_TOKEN;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
