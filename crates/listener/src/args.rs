use argh::FromArgs;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(FromArgs, Debug)]
/// Log every HTTP request received and answer 200 OK
pub struct Args {
    /// port to listen on, all interfaces
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    pub port: u16,
    /// close a connection after this many seconds without input
    #[argh(option)]
    pub read_timeout: Option<u64>,
}
