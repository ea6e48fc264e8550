//! Append-only request log.
//!
//! [`RequestLogger`] turns a [`CapturedRequest`] into one log entry made of
//! several records, each prefixed with a local timestamp:
//!
//! ```text
//! 2026-10-14 09:12:01,004 - Client IP: 10.0.0.7, Method: GET, Path: /ping
//! 2026-10-14 09:12:01,004 - Headers:
//! Host: x
//!
//! 2026-10-14 09:12:01,004 - No body content
//! 2026-10-14 09:12:01,004 -
//! ----------------------------------------
//!
//! ```
//!
//! The whole entry is written with a single call while holding the sink lock,
//! so entries coming from concurrent connections never interleave. Rotation
//! and durability belong to the sink handed to [`RequestLogger::new`].

use std::fmt::{self, Display, Write as _};
use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Local;
use tracing::trace;

use crate::protocol::{Body, CapturedRequest};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

const SEPARATOR_WIDTH: usize = 40;

/// Writes request log entries to a shared sink.
pub struct RequestLogger {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl fmt::Debug for RequestLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestLogger").finish_non_exhaustive()
    }
}

impl RequestLogger {
    pub fn new<W>(sink: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self { sink: Mutex::new(Box::new(sink)) }
    }

    /// Appends the entry for one captured request.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the entry could not be written.
    pub fn log_request(&self, request: &CapturedRequest) -> io::Result<()> {
        let entry = format_entry(request, &timestamp());
        trace!(len = entry.len(), "write request log entry");
        self.write(entry.as_bytes())
    }

    /// Appends a standalone error record.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the record could not be written.
    pub fn error<D: Display>(&self, message: D) -> io::Result<()> {
        let mut entry = Entry::new(timestamp());
        entry.error(message);
        self.write(entry.finish().as_bytes())
    }

    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        let mut sink = self.sink.lock().map_err(|_e| io::Error::other("request log sink poisoned"))?;
        sink.write_all(bytes)?;
        sink.flush()
    }
}

fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Accumulates the records of one entry, all sharing one timestamp.
struct Entry {
    timestamp: String,
    buf: String,
}

impl Entry {
    fn new(timestamp: String) -> Self {
        Self { timestamp, buf: String::new() }
    }

    fn info<D: Display>(&mut self, message: D) {
        let _ = writeln!(self.buf, "{} - {message}", self.timestamp);
    }

    fn error<D: Display>(&mut self, message: D) {
        let _ = writeln!(self.buf, "{} - ERROR - {message}", self.timestamp);
    }

    fn finish(self) -> String {
        self.buf
    }
}

fn format_entry(request: &CapturedRequest, timestamp: &str) -> String {
    let header = request.header();
    let mut entry = Entry::new(timestamp.to_owned());

    entry.info(format_args!(
        "Client IP: {}, Method: {}, Path: {}",
        request.remote_addr().ip(),
        header.method(),
        header.target()
    ));

    let mut headers = String::from("Headers:\n");
    for line in String::from_utf8_lossy(header.raw_headers()).lines().filter(|line| !line.is_empty()) {
        headers.push_str(line);
        headers.push('\n');
    }
    entry.info(headers);

    match request.body() {
        Body::Empty => entry.info("No body content"),
        Body::Length(text) => entry.info(format_args!("Body:\n{text}")),
        Body::Chunked { text, malformed_size } => {
            entry.info("Reading chunked body.");
            if let Some(token) = malformed_size {
                entry.error(format_args!("Invalid chunk size: {token}"));
            }
            entry.info(format_args!("Body (chunked):\n{text}"));
        }
    }

    entry.info(format_args!("\n{}\n", "-".repeat(SEPARATOR_WIDTH)));
    entry.finish()
}
