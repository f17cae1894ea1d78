//! Error types for the lanserial core library.

use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

/// Result type alias using the lanserial core Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for serial endpoint and bridge operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The serial device could not be opened
    #[error("Failed to open serial device {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The opened descriptor does not refer to a terminal
    #[error("{} is not a terminal device", .0.display())]
    NotATerminal(PathBuf),

    /// Reading or applying terminal attributes failed
    #[error("Failed to configure serial device {}: {source}", path.display())]
    Configuration {
        path: PathBuf,
        #[source]
        source: Errno,
    },

    /// Modem control query or update failed
    #[error("Modem control error: {0}")]
    Modem(#[source] Errno),

    /// Both relay threads went away without reporting an exit
    #[error("Relay threads exited without reporting")]
    RelayAborted,

    /// I/O error, e.g. a relay thread failed to start
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
