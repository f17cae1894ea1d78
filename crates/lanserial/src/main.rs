//! lanserial
//!
//! Bridges a serial device and a single TCP connection, moving raw bytes in
//! both directions until either side goes away.

mod cli;
mod net;

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error, info, warn};

use lanserial_core::tracing_init::{default_filter, init_tracing};
use lanserial_core::{Bridge, BridgeConfig, NetworkEndpoint, RestoreTable, SerialPort};

use crate::cli::{Args, Invocation, Mode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&default_filter(&args.log_level), args.log_json);

    let invocation = Invocation::from_args(args.connect, &args.positionals)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = ?invocation.mode,
        device = %invocation.device.display(),
        "Starting lanserial"
    );

    let stream = match &invocation.mode {
        Mode::Listen { port } => {
            let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, *port));
            let listener = net::bind(addr).with_context(|| format!("Couldn't bind {addr}"))?;
            info!(%addr, "Waiting for a connection");
            let (stream, _) = net::accept_one(listener).await.context("accept failed")?;
            stream
        }
        Mode::Connect { host, port } => net::connect(host, *port)
            .await
            .with_context(|| format!("connect() on {host}:{port} failed"))?,
    };

    let config = BridgeConfig::default();
    let restore = RestoreTable::new(config.restore_capacity);
    let serial = SerialPort::open(&invocation.device, &restore)?;
    debug!(cts = serial.cts_asserted(), "Serial line status");

    let network = NetworkEndpoint::new(stream);
    if let Ok(peer) = network.peer_addr() {
        info!(%peer, device = %serial.path().display(), "Bridging");
    }

    let bridge = Arc::new(Bridge::new(network, serial, config));
    let running = bridge.spawn().context("failed to start relay threads")?;

    // The relay threads block in the kernel and cannot be cancelled; the
    // process ends as soon as one of them reports, or on Ctrl-C.
    let code = tokio::select! {
        exit = tokio::task::spawn_blocking(move || running.wait()) => {
            match exit {
                Ok(Ok(exit)) => error!(
                    direction = %exit.direction,
                    forwarded = exit.forwarded,
                    reason = %exit.reason,
                    "Bridge stopped"
                ),
                Ok(Err(e)) => error!(error = %e, "Bridge stopped"),
                Err(e) => error!(error = %e, "Relay watcher failed"),
            }
            1
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
            0
        }
    };

    match bridge.serial().restore_attributes() {
        Ok(true) => debug!("Original terminal attributes restored"),
        Ok(false) => {}
        Err(e) => warn!(error = %e, "Failed to restore terminal attributes"),
    }

    std::process::exit(code);
}
