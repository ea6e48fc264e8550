use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::args::Args;

pub const LOG_DIR: &str = "logs";
pub const LOG_FILE_NAME: &str = "http_requests.log";

/// Runtime settings of the listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    pub address: SocketAddr,
    pub log_dir: PathBuf,
    /// Prefix of the rotated log files, each one suffixed with its date.
    pub log_file_name: String,
    pub read_timeout: Option<Duration>,
}

impl ListenerConfig {
    pub fn port(&self) -> u16 {
        self.address.port()
    }
}

impl From<Args> for ListenerConfig {
    fn from(args: Args) -> Self {
        Self {
            address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, args.port)),
            log_dir: PathBuf::from(LOG_DIR),
            log_file_name: LOG_FILE_NAME.to_owned(),
            read_timeout: args.read_timeout.map(Duration::from_secs),
        }
    }
}
