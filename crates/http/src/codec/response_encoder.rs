use crate::codec::header::HeaderEncoder;
use crate::protocol::{PayloadSize, Reply, ResponseHead, SendError, SERVER_TOKEN};
use bytes::{BufMut, BytesMut};
use http::header::{CONNECTION, CONTENT_TYPE, SERVER};
use http::{HeaderValue, StatusCode};
use tokio_util::codec::Encoder;

const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// Encodes the fixed [`Reply`] set onto the wire.
#[derive(Debug, Default)]
pub struct ResponseEncoder {
    header_encoder: HeaderEncoder,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Encoder<Reply> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Reply, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Reply::Ack { keep_alive } => {
                let head = response_head(StatusCode::OK, keep_alive);
                self.header_encoder.encode((head, PayloadSize::Empty), dst)
            }

            Reply::InternalError { reason } => {
                let body = format!("Internal Server Error: {reason}");
                let mut head = response_head(StatusCode::INTERNAL_SERVER_ERROR, false);
                head.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN_UTF8));

                self.header_encoder.encode((head, PayloadSize::new_length(body.len() as u64)), dst)?;
                dst.put_slice(body.as_bytes());
                Ok(())
            }
        }
    }
}

fn response_head(status: StatusCode, keep_alive: bool) -> ResponseHead {
    let mut head = ResponseHead::new(());
    *head.status_mut() = status;
    head.headers_mut().insert(SERVER, HeaderValue::from_static(SERVER_TOKEN));
    if !keep_alive {
        head.headers_mut().insert(CONNECTION, HeaderValue::from_static("close"));
    }
    head
}
