//! lanserial Core Library
//!
//! Everything needed to bridge a serial device and a TCP connection:
//! - Serial endpoint control (raw mode, RTS/CTS, attribute restoration)
//! - Flow-controlled writes with RTS assertion toward the serial side
//! - The two relay loops and the bridge context that runs them
//! - Common error types and tracing setup

pub mod bridge;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod relay;
pub mod serial;
pub mod tracing_init;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_support;

pub use bridge::{Bridge, RunningBridge};
pub use config::BridgeConfig;
pub use endpoint::{Endpoint, EndpointKind, NetworkEndpoint, Readiness};
pub use error::{Error, Result};
pub use relay::{Direction, ExitReason, RelayExit};
pub use serial::{RestoreTable, SerialPort};
pub use writer::{WriteError, write_all};
