//! Bridge context: the two endpoints plus the threads that relay between
//! them.
//!
//! The endpoints are fixed for the life of the bridge and shared read-only
//! by both relay threads. Nothing else crosses between the threads except
//! the exit report of whichever loop stops first.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use tracing::{debug, error, info};

use crate::config::BridgeConfig;
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::relay::{self, Direction, RelayExit};

pub struct Bridge<N, S> {
    network: N,
    serial: S,
    config: BridgeConfig,
}

impl<N, S> Bridge<N, S>
where
    N: Endpoint + 'static,
    S: Endpoint + 'static,
{
    pub fn new(network: N, serial: S, config: BridgeConfig) -> Self {
        Self {
            network,
            serial,
            config,
        }
    }

    pub const fn network(&self) -> &N {
        &self.network
    }

    pub const fn serial(&self) -> &S {
        &self.serial
    }

    /// Start both relay loops on their own threads.
    ///
    /// The threads are never joined; they run until their loop hits a fatal
    /// condition, and the caller is expected to end the process once
    /// [`RunningBridge::wait`] returns.
    pub fn spawn(self: &Arc<Self>) -> Result<RunningBridge> {
        let (tx, rx) = mpsc::channel();

        for direction in [Direction::NetworkToSerial, Direction::SerialToNetwork] {
            let bridge = Arc::clone(self);
            let tx = tx.clone();
            let handle = thread::Builder::new()
                .name(direction.thread_name().to_string())
                .spawn(move || {
                    let exit = bridge.relay(direction);
                    // The receiver is gone once the first exit was handled.
                    let _ = tx.send(exit);
                })?;
            debug!(thread = ?handle.thread().name(), %direction, "Relay thread spawned");
        }

        info!(buffer_size = self.config.buffer_size, "Relay threads started");
        Ok(RunningBridge { exits: rx })
    }

    /// Run one direction on the calling thread until it stops.
    pub fn relay(&self, direction: Direction) -> RelayExit {
        let buffer_size = self.config.buffer_size;
        let span = tracing::info_span!("relay", %direction);
        let _guard = span.enter();
        match direction {
            Direction::NetworkToSerial => {
                relay::run(direction, &self.network, &self.serial, buffer_size)
            }
            Direction::SerialToNetwork => {
                relay::run(direction, &self.serial, &self.network, buffer_size)
            }
        }
    }
}

/// Handle on a bridge whose relay threads are running.
pub struct RunningBridge {
    exits: Receiver<RelayExit>,
}

impl RunningBridge {
    /// Block until the first relay loop stops and return its report.
    pub fn wait(self) -> Result<RelayExit> {
        self.exits.recv().map_err(|_| {
            error!("Relay threads ended without an exit report");
            Error::RelayAborted
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::relay::ExitReason;
    use crate::test_support::{ReadStep, ScriptedEndpoint};

    #[test]
    fn relay_picks_source_and_destination_by_direction() {
        let network =
            ScriptedEndpoint::network().with_reads([ReadStep::Data(b"to serial".to_vec())]);
        let serial =
            ScriptedEndpoint::serial().with_reads([ReadStep::Data(b"to network".to_vec())]);
        let bridge = Bridge::new(network, serial, BridgeConfig::default());

        bridge.relay(Direction::NetworkToSerial);
        bridge.relay(Direction::SerialToNetwork);

        assert_eq!(bridge.serial().written(), b"to serial");
        assert_eq!(bridge.network().written(), b"to network");
    }

    #[test]
    fn wait_returns_first_fatal_exit() {
        let network = ScriptedEndpoint::network().with_reads([ReadStep::Data(b"x".to_vec())]);
        let serial = ScriptedEndpoint::serial().with_reads([ReadStep::HangUp]);
        let bridge = Arc::new(Bridge::new(network, serial, BridgeConfig::default()));

        let exit = bridge.spawn().unwrap().wait().unwrap();

        match exit.direction {
            Direction::NetworkToSerial => assert!(matches!(exit.reason, ExitReason::EndOfStream)),
            Direction::SerialToNetwork => assert!(matches!(exit.reason, ExitReason::HangUp)),
        }
    }

    #[test]
    fn small_buffer_config_is_honoured() {
        let network = ScriptedEndpoint::network().with_reads([ReadStep::Data(vec![7; 10])]);
        let serial = ScriptedEndpoint::serial();
        let config = BridgeConfig {
            buffer_size: 4,
            ..BridgeConfig::default()
        };
        let bridge = Bridge::new(network, serial, config);

        let exit = bridge.relay(Direction::NetworkToSerial);

        assert_eq!(exit.forwarded, 10);
        assert_eq!(bridge.serial().written(), vec![7; 10]);
    }
}
