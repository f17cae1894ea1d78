//! One-directional forwarding loop.
//!
//! A loop blocks only on its source, reads up to one buffer, and hands the
//! bytes to the flow-controlled writer. Read and write failures end the
//! iteration, not the loop. The loop returns only on a condition that must
//! take the whole bridge down.

use std::fmt;
use std::io;

use tracing::{debug, error, trace, warn};

use crate::endpoint::{Endpoint, Readiness};
use crate::writer::write_all;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    NetworkToSerial,
    SerialToNetwork,
}

impl Direction {
    /// Thread name used for the loop carrying this direction.
    pub const fn thread_name(self) -> &'static str {
        match self {
            Self::NetworkToSerial => "lan2serial",
            Self::SerialToNetwork => "serial2lan",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkToSerial => write!(f, "network->serial"),
            Self::SerialToNetwork => write!(f, "serial->network"),
        }
    }
}

/// Why a relay loop stopped.
#[derive(Debug)]
pub enum ExitReason {
    /// The source returned a zero-length read after reporting data.
    EndOfStream,
    /// The source reported hang-up with nothing left to read, or a read
    /// failed on a descriptor that had also reported hang-up.
    HangUp,
    /// Waiting on the source failed for a reason other than interruption.
    WaitFailed(io::Error),
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfStream => write!(f, "end of stream"),
            Self::HangUp => write!(f, "hang-up"),
            Self::WaitFailed(e) => write!(f, "wait failed: {e}"),
        }
    }
}

/// Final report of a relay loop.
#[derive(Debug)]
pub struct RelayExit {
    pub direction: Direction,
    pub reason: ExitReason,
    /// Bytes successfully handed to the destination before the exit.
    pub forwarded: u64,
}

impl fmt::Display for RelayExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} relay stopped after {} bytes: {}",
            self.direction, self.forwarded, self.reason
        )
    }
}

/// Forward bytes from `source` to `dest` until a fatal condition.
///
/// The transfer buffer is zeroed before each read so a short read never
/// carries stale bytes from the previous iteration. A `buffer_size` of zero
/// is treated as one byte.
pub fn run<S, D>(direction: Direction, source: &S, dest: &D, buffer_size: usize) -> RelayExit
where
    S: Endpoint + ?Sized,
    D: Endpoint + ?Sized,
{
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut forwarded: u64 = 0;
    let exit = |reason: ExitReason, forwarded: u64| RelayExit {
        direction,
        reason,
        forwarded,
    };

    loop {
        buf.fill(0);

        let hang_up = match source.wait_readable() {
            Ok(Readiness::Ready { hang_up }) => hang_up,
            Ok(Readiness::Spurious) => {
                debug!(%direction, "source woke without data");
                continue;
            }
            Ok(Readiness::HungUp) => {
                error!(%direction, "source hung up");
                return exit(ExitReason::HangUp, forwarded);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                error!(%direction, error = %e, "waiting on source failed");
                return exit(ExitReason::WaitFailed(e), forwarded);
            }
        };

        let count = match source.read(&mut buf) {
            Ok(0) => {
                error!(%direction, "EOF received from {}", source.kind());
                return exit(ExitReason::EndOfStream, forwarded);
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if hang_up => {
                error!(%direction, error = %e, "read failed after hang-up");
                return exit(ExitReason::HangUp, forwarded);
            }
            Err(e) => {
                warn!(%direction, error = %e, "read failed");
                continue;
            }
        };

        match write_all(dest, &buf[..count]) {
            Ok(()) => {
                forwarded += count as u64;
                trace!(%direction, bytes = count, "forwarded");
            }
            Err(e) => warn!(%direction, error = %e, bytes = count, "dropping chunk"),
        }
    }
}
