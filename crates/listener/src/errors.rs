use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::rolling::InitError;

/// Failures that keep the listener from starting.
#[derive(Error, Debug)]
pub enum ListenerError {
    #[error("can't create log directory {}: {source}", path.display())]
    CreateLogDir { path: PathBuf, source: io::Error },

    #[error("can't open request log: {source}")]
    LogAppender {
        #[from]
        source: InitError,
    },

    #[error("can't bind {address}: {source}")]
    Bind { address: SocketAddr, source: io::Error },
}
