use std::process::ExitCode;
use std::sync::Arc;

use http_listener::args::Args;
use http_listener::config::ListenerConfig;
use http_listener::errors::ListenerError;
use http_listener::logging;
use http_listener::server::{self, Server};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args: Args = argh::from_env();
    logging::init_diagnostics();

    match run(ListenerConfig::from(args)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(cause = %e, "listener failed to start");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ListenerConfig) -> Result<(), ListenerError> {
    // dropping the guard flushes entries still queued for the log file
    let (logger, _guard) = logging::open_request_log(&config)?;

    let server = Server::bind(&config, Arc::new(logger)).await?;
    println!("Server listening on port {}...", config.port());

    server.run_until(server::shutdown_signal()).await;
    info!("listener stopped");
    Ok(())
}
