//! Fixed operating point of the bridge.
//!
//! There is no configuration file: the serial line runs at a single
//! hardcoded speed and the relay buffers are a fixed size. The binary only
//! chooses how the TCP connection is made.

use nix::sys::termios::BaudRate;

/// Bytes moved per relay iteration.
pub const TRANSFER_BUFFER_SIZE: usize = 1024;

/// Maximum number of descriptors whose original attributes are kept.
pub const RESTORE_TABLE_CAPACITY: usize = 16;

/// Output speed applied when the serial device is put into raw mode.
pub const OPERATING_BAUD: BaudRate = BaudRate::B9600;

/// Host used by client mode when none is given.
pub const DEFAULT_CONNECT_HOST: &str = "127.0.0.1";

/// Pending-connection backlog for server mode. Only one peer is ever served.
pub const LISTEN_BACKLOG: u32 = 1;

/// Bridge tuning carried into the relay threads.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Transfer buffer size for each relay loop.
    pub buffer_size: usize,
    /// Capacity of the terminal attribute restoration table.
    pub restore_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            buffer_size: TRANSFER_BUFFER_SIZE,
            restore_capacity: RESTORE_TABLE_CAPACITY,
        }
    }
}
