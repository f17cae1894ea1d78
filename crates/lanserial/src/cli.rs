//! Command-line surface.
//!
//! ```text
//! lanserial <listen-port> <device>
//! lanserial -c [<host>] <port> <device>
//! ```

use std::path::PathBuf;

use clap::Parser;
use lanserial_core::config::DEFAULT_CONNECT_HOST;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "lanserial")]
#[command(
    version,
    about = "Bridge a serial device and a TCP connection",
    override_usage = "lanserial <LISTEN_PORT> <DEVICE>\n       lanserial -c [HOST] <PORT> <DEVICE>"
)]
pub struct Args {
    /// Connect to a server instead of listening for one.
    #[arg(short = 'c', long = "connect")]
    pub connect: bool,

    /// `<listen-port> <device>`, or with -c `[<host>] <port> <device>`.
    #[arg(value_name = "ARGS", required = true, num_args = 2..=3)]
    pub positionals: Vec<String>,

    /// Log level filter (e.g. "info", "debug", "trace").
    #[arg(long, default_value = "info", env = "LANSERIAL_LOG_LEVEL")]
    pub log_level: String,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, env = "LANSERIAL_LOG_JSON")]
    pub log_json: bool,
}

/// How the TCP side of the bridge is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Bind on all interfaces and accept a single peer.
    Listen { port: u16 },
    /// Connect out to `host:port`.
    Connect { host: String, port: u16 },
}

/// A fully resolved invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub mode: Mode,
    pub device: PathBuf,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("invalid port number: {0}")]
    InvalidPort(String),

    #[error("expected <listen-port> <device>, got {0} arguments")]
    ListenArity(usize),

    #[error("expected -c [<host>] <port> <device>, got {0} arguments")]
    ConnectArity(usize),
}

impl Invocation {
    pub fn from_args(connect: bool, positionals: &[String]) -> Result<Self, UsageError> {
        match (connect, positionals) {
            (false, [port, device]) => Ok(Self {
                mode: Mode::Listen {
                    port: parse_port(port)?,
                },
                device: PathBuf::from(device),
            }),
            (false, other) => Err(UsageError::ListenArity(other.len())),
            (true, [port, device]) => Ok(Self {
                mode: Mode::Connect {
                    host: DEFAULT_CONNECT_HOST.to_string(),
                    port: parse_port(port)?,
                },
                device: PathBuf::from(device),
            }),
            (true, [host, port, device]) => Ok(Self {
                mode: Mode::Connect {
                    host: host.clone(),
                    port: parse_port(port)?,
                },
                device: PathBuf::from(device),
            }),
            (true, other) => Err(UsageError::ConnectArity(other.len())),
        }
    }
}

fn parse_port(text: &str) -> Result<u16, UsageError> {
    text.parse()
        .map_err(|_| UsageError::InvalidPort(text.to_string()))
}
