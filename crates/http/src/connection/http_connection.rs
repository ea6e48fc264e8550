use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info, warn};

use crate::codec::{RequestDecoder, ResponseEncoder};
use crate::logger::RequestLogger;
use crate::protocol::{
    Body, CapturedRequest, HttpError, Message, ParseError, PayloadItem, PayloadSize, Reply, RequestHeader,
};

type RequestMessage = Message<(RequestHeader, PayloadSize)>;

/// An HTTP connection that captures every request sent on it
///
/// `HttpConnection` drives one client connection through its whole lifetime:
/// - Waiting for a request line and parsing the head
/// - Reading the body according to its framing
/// - Writing the request log entry
/// - Sending the reply, then waiting for the next request
///
/// The end of the stream, a head that does not parse, or no input within
/// the read timeout closes the connection without a reply. A failure after the head was parsed is
/// logged and answered with `500` before closing.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    framed_write: FramedWrite<W, ResponseEncoder>,
    remote_addr: SocketAddr,
    read_timeout: Option<Duration>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, remote_addr: SocketAddr) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, RequestDecoder::new(), 8 * 1024),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
            remote_addr,
            read_timeout: None,
        }
    }

    /// Closes the connection when no input arrives for `read_timeout`.
    #[must_use]
    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Serves requests until the connection ends.
    ///
    /// # Errors
    ///
    /// Returns the failure that made the connection answer `500` and close.
    pub async fn process(mut self, logger: &RequestLogger) -> Result<(), HttpError> {
        loop {
            let (header, payload_size) = match self.next_message().await {
                Ok(Some(Message::Header(header))) => header,

                Ok(Some(Message::Payload(_))) => {
                    error!("receive payload while waiting for a request head");
                    return Err(ParseError::invalid_body("need header while receive body").into());
                }

                Ok(None) => {
                    debug!(remote_addr = %self.remote_addr, "cant read more request, break this connection down");
                    return Ok(());
                }

                Err(e) => {
                    debug!(remote_addr = %self.remote_addr, cause = %e, "can't receive next request, close connection");
                    return Ok(());
                }
            };

            let keep_alive = header.keep_alive();

            match self.capture(header, payload_size, logger).await {
                Ok(()) => {}
                Err(e) if e.is_read_timeout() => {
                    debug!(remote_addr = %self.remote_addr, "read timed out inside a body, close connection");
                    return Ok(());
                }
                Err(e) => {
                    self.fail(&e, logger).await;
                    return Err(e);
                }
            }

            self.framed_write.send(Reply::ack(keep_alive)).await?;

            if !keep_alive {
                debug!(remote_addr = %self.remote_addr, "client asked to close connection");
                return Ok(());
            }
        }
    }

    async fn capture(
        &mut self,
        header: RequestHeader,
        payload_size: PayloadSize,
        logger: &RequestLogger,
    ) -> Result<(), HttpError> {
        let body = self.read_body(payload_size).await?;
        info!(remote_addr = %self.remote_addr, method = %header.method(), path = header.target(), "captured request");

        let request = CapturedRequest::new(self.remote_addr, header, body);
        logger.log_request(&request).map_err(HttpError::log)
    }

    async fn read_body(&mut self, payload_size: PayloadSize) -> Result<Body, ParseError> {
        let mut bytes = Vec::new();
        let mut malformed_size = None;

        loop {
            match self.next_message().await? {
                Some(Message::Payload(PayloadItem::Chunk(chunk))) => bytes.extend_from_slice(&chunk),
                Some(Message::Payload(PayloadItem::Eof)) => break,
                Some(Message::Payload(PayloadItem::Truncated(line))) => {
                    let token = String::from_utf8_lossy(&line).into_owned();
                    warn!(remote_addr = %self.remote_addr, token = %token, "invalid chunk size, body truncated");
                    malformed_size = Some(token);
                    break;
                }
                Some(Message::Header(_)) => return Err(ParseError::invalid_body("receive request head while reading body")),
                None => return Err(ParseError::invalid_body("connection closed before the body was complete")),
            }
        }

        let text = String::from_utf8(bytes).map_err(|e| ParseError::invalid_body(format!("body is not valid utf-8: {e}")))?;

        Ok(match payload_size {
            PayloadSize::Empty => Body::Empty,
            PayloadSize::Length(_) => Body::Length(text),
            PayloadSize::Chunked => Body::Chunked { text, malformed_size },
        })
    }

    async fn next_message(&mut self) -> Result<Option<RequestMessage>, ParseError> {
        let next = match self.read_timeout {
            Some(read_timeout) => match tokio::time::timeout(read_timeout, self.framed_read.next()).await {
                Ok(next) => next,
                Err(_elapsed) => {
                    debug!(remote_addr = %self.remote_addr, ?read_timeout, "read timed out");
                    return Err(ParseError::ReadTimeout);
                }
            },
            None => self.framed_read.next().await,
        };

        next.transpose()
    }

    /// Records the failure and makes a best-effort attempt to answer `500`.
    async fn fail(&mut self, e: &HttpError, logger: &RequestLogger) {
        error!(remote_addr = %self.remote_addr, cause = %e, "handle request error");

        if let Err(log_error) = logger.error(format_args!("Error while handling request: {e}")) {
            warn!(cause = %log_error, "can't write error to request log");
        }

        if let Err(send_error) = self.framed_write.send(Reply::internal_error(e)).await {
            debug!(cause = %send_error, "can't send error response");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    struct Outcome {
        response: String,
        log: String,
        result: Result<(), HttpError>,
    }

    /// Sends `request`, half-closes the client side and collects everything.
    async fn exchange(request: &[u8]) -> Outcome {
        let sink = SharedBuf::default();
        let logger = Arc::new(RequestLogger::new(sink.clone()));

        let (mut client, server) = tokio::io::duplex(64 * 1024);
        let (reader, writer) = tokio::io::split(server);
        let remote_addr: SocketAddr = "192.168.1.20:40000".parse().unwrap();

        let task_logger = Arc::clone(&logger);
        let task = tokio::spawn(async move {
            let connection = HttpConnection::new(reader, writer, remote_addr);
            connection.process(&task_logger).await
        });

        client.write_all(request).await.unwrap();
        client.shutdown().await.unwrap();

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        let result = task.await.unwrap();

        Outcome { response: String::from_utf8(response).unwrap(), log: sink.contents(), result }
    }

    #[tokio::test]
    async fn ping() {
        let outcome = exchange(b"GET /ping HTTP/1.1\r\nHost: x\r\n\r\n").await;

        assert!(outcome.result.is_ok());
        assert!(outcome.response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(outcome.response.contains("server: CustomHTTP/1.0\r\n"));
        assert_eq!(outcome.response.matches("HTTP/1.1").count(), 1);

        assert!(outcome.log.contains("Client IP: 192.168.1.20, Method: GET, Path: /ping\n"));
        assert!(outcome.log.contains(" - Headers:\nHost: x\n\n"));
        assert!(outcome.log.contains(" - No body content\n"));
    }

    #[tokio::test]
    async fn content_length_body() {
        let outcome = exchange("POST /form HTTP/1.1\r\nContent-Length: 15\r\n\r\nname=zażółć".as_bytes()).await;

        assert!(outcome.response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(outcome.log.contains(" - Body:\nname=zażółć\n"));
    }

    #[tokio::test]
    async fn chunked_body() {
        let outcome = exchange(b"POST /up HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n4\r\ntest\r\n0\r\n\r\n").await;

        assert!(outcome.result.is_ok());
        assert!(outcome.response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(outcome.log.contains(" - Reading chunked body.\n"));
        assert!(outcome.log.contains(" - Body (chunked):\ntest\n"));
    }

    #[tokio::test]
    async fn chunked_body_many_chunks() {
        let outcome = exchange(
            b"POST /up HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n1\r\na\r\n3\r\nbcd\r\nA\r\nefghijklmn\r\n0\r\n\r\n",
        )
        .await;

        assert!(outcome.log.contains(" - Body (chunked):\nabcdefghijklmn\n"));
    }

    #[tokio::test]
    async fn zero_chunk_logs_empty_body() {
        let outcome = exchange(b"POST /up HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n0\r\n\r\n").await;

        assert!(outcome.response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(outcome.log.contains(" - Body (chunked):\n\n"));
    }

    #[tokio::test]
    async fn invalid_chunk_size_still_acknowledged() {
        let outcome = exchange(b"POST /up HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n4\r\ntest\r\nxyz\r\n").await;

        assert!(outcome.result.is_ok());
        assert!(outcome.response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(outcome.log.contains(" - ERROR - Invalid chunk size: xyz\n"));
        assert!(outcome.log.contains(" - Body (chunked):\ntest\n"));
    }

    #[tokio::test]
    async fn two_requests_on_one_connection() {
        let outcome = exchange(
            b"POST /first HTTP/1.1\r\nContent-Length: 5\r\n\r\nalphaPOST /second HTTP/1.1\r\nContent-Length: 4\r\n\r\nbeta",
        )
        .await;

        assert_eq!(outcome.response.matches("HTTP/1.1 200 OK\r\n").count(), 2);

        let first = outcome.log.find("Path: /first").unwrap();
        let second = outcome.log.find("Path: /second").unwrap();
        assert!(first < second);

        let (first_entry, second_entry) = outcome.log.split_at(second);
        assert!(first_entry.contains("Body:\nalpha\n"));
        assert!(!first_entry.contains("beta"));
        assert!(second_entry.contains("Body:\nbeta\n"));
        assert!(!second_entry.contains("alpha"));
    }

    #[tokio::test]
    async fn connection_close_stops_after_reply() {
        let outcome = exchange(b"GET /a HTTP/1.1\r\nConnection: close\r\n\r\nGET /b HTTP/1.1\r\n\r\n").await;

        assert_eq!(outcome.response.matches("HTTP/1.1 200 OK").count(), 1);
        assert!(outcome.response.contains("connection: close\r\n"));
        assert!(outcome.log.contains("Path: /a"));
        assert!(!outcome.log.contains("Path: /b"));
    }

    #[tokio::test]
    async fn malformed_request_gets_no_response() {
        let outcome = exchange(b"complete garbage here\r\n\r\n").await;

        assert!(outcome.result.is_ok());
        assert!(outcome.response.is_empty());
        assert!(outcome.log.is_empty());
    }

    #[tokio::test]
    async fn empty_connection() {
        let outcome = exchange(b"").await;

        assert!(outcome.result.is_ok());
        assert!(outcome.response.is_empty());
        assert!(outcome.log.is_empty());
    }

    #[tokio::test]
    async fn invalid_utf8_body_answers_500() {
        let outcome = exchange(b"POST /bin HTTP/1.1\r\nContent-Length: 2\r\n\r\n\xff\xfe").await;

        assert!(matches!(outcome.result, Err(HttpError::RequestError { source: ParseError::InvalidBody { .. } })));
        assert!(outcome.response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(outcome.response.contains("Internal Server Error: request error: invalid body: body is not valid utf-8"));
        assert!(outcome.log.contains(" - ERROR - Error while handling request: request error: invalid body"));
        assert!(!outcome.log.contains("Path: /bin"));
    }

    #[tokio::test]
    async fn truncated_body_answers_500() {
        let outcome = exchange(b"POST /short HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc").await;

        assert!(outcome.result.is_err());
        assert!(outcome.response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(outcome.response.contains("connection closed before the body was complete"));
    }

    #[tokio::test]
    async fn large_cookie_is_captured() {
        let cookie = "c".repeat(9000);
        let request = format!("GET /big HTTP/1.1\r\nCookie: {cookie}\r\n\r\n");
        let outcome = exchange(request.as_bytes()).await;

        assert!(outcome.response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(outcome.log.contains("Method: GET, Path: /big\n"));
        assert!(outcome.log.contains(&format!("Cookie: {cookie}\n")));
    }

    #[tokio::test]
    async fn seventy_headers_are_captured() {
        let mut request = String::from("GET /many HTTP/1.1\r\n");
        for n in 0..70 {
            request.push_str(&format!("X-H{n}: {n}\r\n"));
        }
        request.push_str("\r\n");
        let outcome = exchange(request.as_bytes()).await;

        assert!(outcome.response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(outcome.log.contains("Path: /many\n"));
        assert!(outcome.log.contains("X-H0: 0\n"));
        assert!(outcome.log.contains("X-H69: 69\n"));
    }

    #[tokio::test]
    async fn unusual_target_is_logged_as_sent() {
        let outcome = exchange(b"GET /a`b HTTP/1.1\r\nHost: x\r\n\r\n").await;

        assert!(outcome.response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(outcome.log.contains("Method: GET, Path: /a`b\n"));
    }

    #[tokio::test]
    async fn timeout_inside_body_closes_silently() {
        let sink = SharedBuf::default();
        let logger = RequestLogger::new(sink.clone());

        let (mut client, server) = tokio::io::duplex(1024);
        client.write_all(b"POST /slow HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc").await.unwrap();

        let (reader, writer) = tokio::io::split(server);
        let connection = HttpConnection::new(reader, writer, "127.0.0.1:1".parse().unwrap())
            .with_read_timeout(Some(Duration::from_millis(20)));
        assert!(connection.process(&logger).await.is_ok());

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        assert!(response.is_empty());
        assert!(sink.contents().is_empty());
    }

    #[tokio::test]
    async fn silent_client_times_out() {
        let sink = SharedBuf::default();
        let logger = RequestLogger::new(sink.clone());

        let (_client, server) = tokio::io::duplex(1024);
        let (reader, writer) = tokio::io::split(server);
        let connection = HttpConnection::new(reader, writer, "127.0.0.1:1".parse().unwrap())
            .with_read_timeout(Some(Duration::from_millis(20)));

        assert!(connection.process(&logger).await.is_ok());
        assert!(sink.contents().is_empty());
    }
}
