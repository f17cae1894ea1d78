//! Flow-controlled writer shared by both relay loops.
//!
//! Each loop writes only to its own destination, so the two callers never
//! touch the same endpoint concurrently.

use std::io;

use thiserror::Error;
use tracing::trace;

use crate::endpoint::{Endpoint, EndpointKind};

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Write to {endpoint} endpoint failed: {source}")]
    WriteFailed {
        endpoint: EndpointKind,
        #[source]
        source: io::Error,
    },

    #[error("{0} endpoint accepted zero bytes")]
    WriteZero(EndpointKind),
}

/// Write all of `bytes` to `dest`, looping over partial writes.
///
/// Toward a serial endpoint RTS is raised before every underlying write
/// attempt. Interrupted attempts are retried immediately with no backoff.
pub fn write_all<E: Endpoint + ?Sized>(dest: &E, mut bytes: &[u8]) -> Result<(), WriteError> {
    let kind = dest.kind();
    while !bytes.is_empty() {
        if kind == EndpointKind::Serial {
            dest.request_to_send();
        }
        match dest.write(bytes) {
            Ok(0) if kind.zero_write_is_failure() => return Err(WriteError::WriteZero(kind)),
            Ok(n) => {
                trace!(endpoint = %kind, written = n, remaining = bytes.len() - n, "write");
                bytes = &bytes[n..];
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(source) => {
                return Err(WriteError::WriteFailed {
                    endpoint: kind,
                    source,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::test_support::{Event, ScriptedEndpoint, WriteStep};

    #[test]
    fn partial_writes_are_continued_until_done() {
        let dest = ScriptedEndpoint::serial().with_max_write(3);
        write_all(&dest, b"0123456789").unwrap();
        assert_eq!(dest.written(), b"0123456789");
        assert_eq!(
            dest.events(),
            vec![
                Event::Rts,
                Event::Write(3),
                Event::Rts,
                Event::Write(3),
                Event::Rts,
                Event::Write(3),
                Event::Rts,
                Event::Write(1),
            ]
        );
    }

    #[test]
    fn network_writes_never_raise_rts() {
        let dest = ScriptedEndpoint::network().with_max_write(4);
        write_all(&dest, b"abcdefgh").unwrap();
        assert_eq!(dest.written(), b"abcdefgh");
        assert!(!dest.events().contains(&Event::Rts));
    }

    #[test]
    fn interrupted_write_is_retried() {
        let dest = ScriptedEndpoint::serial().with_write_steps([
            WriteStep::Fail(io::ErrorKind::Interrupted),
            WriteStep::Fail(io::ErrorKind::Interrupted),
        ]);
        write_all(&dest, b"PING\n").unwrap();
        assert_eq!(dest.written(), b"PING\n");
        // One RTS per attempt, including the interrupted ones.
        assert_eq!(
            dest.events(),
            vec![Event::Rts, Event::Rts, Event::Rts, Event::Write(5)]
        );
    }

    #[test]
    fn zero_write_to_serial_is_retried() {
        let dest = ScriptedEndpoint::serial().with_write_steps([WriteStep::Zero]);
        write_all(&dest, b"xyz").unwrap();
        assert_eq!(dest.written(), b"xyz");
    }

    #[test]
    fn zero_write_to_network_fails() {
        let dest = ScriptedEndpoint::network().with_write_steps([WriteStep::Zero]);
        let err = write_all(&dest, b"xyz").unwrap_err();
        assert!(matches!(err, WriteError::WriteZero(EndpointKind::Network)));
        assert!(dest.written().is_empty());
    }

    #[test]
    fn hard_error_aborts_with_write_failed() {
        let dest = ScriptedEndpoint::serial()
            .with_max_write(2)
            .with_write_steps([WriteStep::Pass, WriteStep::Fail(io::ErrorKind::BrokenPipe)]);
        let err = write_all(&dest, b"abcdef").unwrap_err();
        match err {
            WriteError::WriteFailed { endpoint, source } => {
                assert_eq!(endpoint, EndpointKind::Serial);
                assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(dest.written(), b"ab");
    }

    #[test]
    fn empty_buffer_writes_nothing() {
        let dest = ScriptedEndpoint::serial();
        write_all(&dest, b"").unwrap();
        assert!(dest.events().is_empty());
    }
}
