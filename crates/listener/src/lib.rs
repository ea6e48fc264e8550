//! A passive HTTP listener that records every request it receives.
//!
//! The binary wires [`probe_http`] to a TCP socket:
//! - [`args`]: the command line
//! - [`config`]: runtime settings resolved from the command line
//! - [`logging`]: diagnostics and the daily rotated request log
//! - [`server`]: the accept loop and shutdown handling

pub mod args;
pub mod config;
pub mod errors;
pub mod logging;
pub mod server;
