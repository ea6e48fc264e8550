use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use probe_http::connection::HttpConnection;
use probe_http::logger::RequestLogger;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::ListenerConfig;
use crate::errors::ListenerError;

/// Accepts connections and serves each one on its own task.
#[derive(Debug)]
pub struct Server {
    tcp_listener: TcpListener,
    logger: Arc<RequestLogger>,
    read_timeout: Option<Duration>,
}

impl Server {
    /// Binds the listening socket.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Bind`] when the address can't be bound.
    pub async fn bind(config: &ListenerConfig, logger: Arc<RequestLogger>) -> Result<Self, ListenerError> {
        let tcp_listener = TcpListener::bind(config.address)
            .await
            .map_err(|source| ListenerError::Bind { address: config.address, source })?;

        info!(address = %config.address, "start listening");
        Ok(Self { tcp_listener, logger, read_timeout: config.read_timeout })
    }

    /// The bound address, useful when binding port 0.
    ///
    /// # Errors
    ///
    /// Returns the socket error if the address can't be read.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.tcp_listener.local_addr()
    }

    /// Serves connections until `shutdown` completes.
    ///
    /// Connections already being served keep running on their tasks.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let (tcp_stream, remote_addr) = tokio::select! {
                () = &mut shutdown => {
                    info!("stop accepting connections");
                    return;
                }
                accepted = self.tcp_listener.accept() => match accepted {
                    Ok(stream_and_addr) => stream_and_addr,
                    Err(e) => {
                        warn!(cause = %e, "failed to accept");
                        continue;
                    }
                },
            };

            let logger = Arc::clone(&self.logger);
            let read_timeout = self.read_timeout;

            tokio::spawn(async move {
                let (reader, writer) = tcp_stream.into_split();
                let connection = HttpConnection::new(reader, writer, remote_addr).with_read_timeout(read_timeout);
                match connection.process(&logger).await {
                    Ok(()) => {
                        debug!(%remote_addr, "finished process, connection shutdown");
                    }
                    Err(e) => {
                        error!(%remote_addr, "service has error, cause {}, connection shutdown", e);
                    }
                }
            });
        }
    }
}

/// Completes on SIGINT, or on SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(cause = %e, "can't listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(cause = %e, "can't listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!("shutdown signal received");
}
