//! The two byte channels the bridge moves data between.
//!
//! Both endpoints are used through shared references from two threads at
//! once: one thread only ever reads an endpoint while the other only ever
//! writes it.

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::os::fd::{AsFd, BorrowedFd};

use nix::poll::{PollFd, PollFlags, PollTimeout, poll};

/// Which side of the bridge an endpoint sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    Network,
    Serial,
}

impl EndpointKind {
    /// Whether a write that accepts no bytes is a failure.
    ///
    /// A socket write returning zero means the connection is unusable; the
    /// serial write helper returns zero when its readiness wait woke early,
    /// which is simply retried.
    pub const fn zero_write_is_failure(self) -> bool {
        matches!(self, Self::Network)
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::Serial => write!(f, "serial"),
        }
    }
}

/// Outcome of blocking until a descriptor is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Data can be transferred. `hang_up` is set when the descriptor also
    /// reported a hang-up or error condition alongside readiness.
    Ready { hang_up: bool },
    /// The descriptor reported hang-up or error and nothing to transfer.
    HungUp,
    /// The wait returned without the descriptor being ready.
    Spurious,
}

/// A bidirectional byte channel the relay loops drive.
pub trait Endpoint: Send + Sync {
    fn kind(&self) -> EndpointKind;

    /// Block, with no timeout, until data can be read.
    fn wait_readable(&self) -> io::Result<Readiness>;

    /// Read up to `buf.len()` bytes. `Ok(0)` is end of stream.
    fn read(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// One underlying write attempt.
    fn write(&self, buf: &[u8]) -> io::Result<usize>;

    /// Raise the hardware request-to-send line. Only meaningful for serial
    /// endpoints; failures are reported by the implementation and never
    /// abort a transfer.
    fn request_to_send(&self) {}
}

/// Block until `fd` reports one of `interest`, without a timeout.
pub(crate) fn wait_for(fd: BorrowedFd<'_>, interest: PollFlags) -> io::Result<Readiness> {
    let mut fds = [PollFd::new(fd, interest)];
    poll(&mut fds, PollTimeout::NONE).map_err(io::Error::from)?;
    let revents = fds[0].revents().unwrap_or_else(PollFlags::empty);
    Ok(classify(revents, interest))
}

fn classify(revents: PollFlags, interest: PollFlags) -> Readiness {
    let hang_up = revents.intersects(PollFlags::POLLHUP | PollFlags::POLLERR | PollFlags::POLLNVAL);
    if revents.intersects(interest) {
        Readiness::Ready { hang_up }
    } else if hang_up {
        Readiness::HungUp
    } else {
        Readiness::Spurious
    }
}

/// The connected TCP peer.
///
/// Holds a blocking socket; the relay only reads after `poll` reported data.
#[derive(Debug)]
pub struct NetworkEndpoint {
    stream: TcpStream,
}

impl NetworkEndpoint {
    pub const fn new(stream: TcpStream) -> Self {
        Self { stream }
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.stream.peer_addr()
    }
}

impl From<TcpStream> for NetworkEndpoint {
    fn from(stream: TcpStream) -> Self {
        Self::new(stream)
    }
}

impl Endpoint for NetworkEndpoint {
    fn kind(&self) -> EndpointKind {
        EndpointKind::Network
    }

    fn wait_readable(&self) -> io::Result<Readiness> {
        wait_for(self.stream.as_fd(), PollFlags::POLLIN)
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        (&self.stream).read(buf)
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        (&self.stream).write(buf)
    }
}
