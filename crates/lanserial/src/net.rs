//! TCP connection establishment.
//!
//! Both modes hand the bridge a plain blocking `std::net::TcpStream`; the
//! relay threads do their own readiness waits.

use std::io;
use std::net::SocketAddr;

use lanserial_core::config::LISTEN_BACKLOG;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::info;

/// Bind `addr` with address reuse and a backlog of one.
pub fn bind(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(LISTEN_BACKLOG)
}

/// Accept exactly one peer. The listener is dropped afterwards so no
/// further connections are queued.
pub async fn accept_one(listener: TcpListener) -> io::Result<(std::net::TcpStream, SocketAddr)> {
    let (stream, peer) = listener.accept().await?;
    info!(%peer, "Connection accepted");
    Ok((into_blocking(stream)?, peer))
}

/// Resolve `host` and connect to it.
pub async fn connect(host: &str, port: u16) -> io::Result<std::net::TcpStream> {
    let stream = TcpStream::connect((host, port)).await?;
    info!(host, port, peer = %stream.peer_addr()?, "Connected to server");
    into_blocking(stream)
}

fn into_blocking(stream: TcpStream) -> io::Result<std::net::TcpStream> {
    let stream = stream.into_std()?;
    stream.set_nonblocking(false)?;
    Ok(stream)
}
