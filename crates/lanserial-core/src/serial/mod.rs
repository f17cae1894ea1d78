//! Serial endpoint controller.
//!
//! Opens a terminal device in raw 8-bit mode with RTS/CTS flow control and
//! exposes the read/write helpers the relay uses, plus RTS control and CTS
//! sensing through the modem control ioctls.

mod modem;
pub mod raw;
mod restore;

use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal, Read, Write};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use nix::poll::PollFlags;
use nix::sys::termios::{SetArg, tcgetattr, tcsetattr};
use tracing::{debug, info, warn};

use crate::endpoint::{self, Endpoint, EndpointKind, Readiness};
use crate::error::{Error, Result};

pub use restore::RestoreTable;

/// An open serial device in raw mode.
///
/// The descriptor is blocking; every read and write is preceded by a
/// readiness wait with no timeout. Dropping the port restores the original
/// attributes and frees its restoration slot.
#[derive(Debug)]
pub struct SerialPort {
    file: File,
    path: PathBuf,
    /// Table holding this descriptor's snapshot, if one was recorded.
    restore: Option<RestoreTable>,
}

impl SerialPort {
    /// Open `path` for reading and writing without making it the
    /// controlling terminal, snapshot its attributes into `restore` and
    /// switch it to raw mode.
    pub fn open(path: impl AsRef<Path>, restore: &RestoreTable) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(&path)
            .map_err(|source| Error::Open {
                path: path.clone(),
                source,
            })?;

        if !file.is_terminal() {
            return Err(Error::NotATerminal(path));
        }

        let config_err = |source| Error::Configuration {
            path: path.clone(),
            source,
        };
        let fd = file.as_raw_fd();
        let mut attrs = tcgetattr(&file).map_err(config_err)?;
        let recorded = restore.record(fd, &attrs);
        if !recorded {
            debug!(path = %path.display(), "Original attributes not recorded");
        }
        let applied = raw::make_raw(&mut attrs)
            .and_then(|()| tcsetattr(&file, SetArg::TCSAFLUSH, &attrs));
        if let Err(source) = applied {
            if recorded {
                restore.take(fd);
            }
            return Err(config_err(source));
        }

        info!(path = %path.display(), "Serial device configured in raw mode");
        Ok(Self {
            file,
            path,
            restore: recorded.then(|| restore.clone()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raise the RTS line.
    pub fn assert_rts(&self) -> Result<()> {
        modem::update(self.file.as_fd(), modem::RTS, true).map_err(Error::Modem)
    }

    /// Drop the RTS line.
    pub fn deassert_rts(&self) -> Result<()> {
        modem::update(self.file.as_fd(), modem::RTS, false).map_err(Error::Modem)
    }

    /// Whether the attached device currently asserts CTS. A failed query
    /// reads as not asserted.
    pub fn cts_asserted(&self) -> bool {
        match modem::get(self.file.as_fd()) {
            Ok(bits) => bits & modem::CTS != 0,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read modem status");
                false
            }
        }
    }

    /// Re-apply the attributes captured when this port was opened.
    ///
    /// Returns `Ok(false)` when no snapshot exists for this descriptor.
    pub fn restore_attributes(&self) -> Result<bool> {
        let fd = self.file.as_raw_fd();
        let Some(original) = self.restore.as_ref().and_then(|table| table.get(fd)) else {
            return Ok(false);
        };
        tcsetattr(&self.file, SetArg::TCSANOW, &original).map_err(|source| {
            Error::Configuration {
                path: self.path.clone(),
                source,
            }
        })?;
        Ok(true)
    }

    /// Drop RTS, then release the port: the original attributes are
    /// restored, the restoration slot freed and the descriptor closed.
    pub fn close(self) {
        if let Err(e) = self.deassert_rts() {
            debug!(path = %self.path.display(), error = %e, "RTS not dropped on close");
        }
    }
}

impl Drop for SerialPort {
    fn drop(&mut self) {
        if let Err(e) = self.restore_attributes() {
            warn!(path = %self.path.display(), error = %e, "Failed to restore attributes");
        }
        if let Some(table) = self.restore.take() {
            table.take(self.file.as_raw_fd());
        }
        debug!(path = %self.path.display(), "Serial device closed");
    }
}

impl AsFd for SerialPort {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

impl Endpoint for SerialPort {
    fn kind(&self) -> EndpointKind {
        EndpointKind::Serial
    }

    fn wait_readable(&self) -> io::Result<Readiness> {
        endpoint::wait_for(self.file.as_fd(), PollFlags::POLLIN)
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        (&self.file).read(buf)
    }

    /// Waits for the device to accept data first; a wake without
    /// writability reports zero progress so the writer tries again.
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        match endpoint::wait_for(self.file.as_fd(), PollFlags::POLLOUT)? {
            Readiness::Spurious => {
                debug!(path = %self.path.display(), "Not ready for write");
                Ok(0)
            }
            Readiness::Ready { .. } | Readiness::HungUp => (&self.file).write(buf),
        }
    }

    fn request_to_send(&self) {
        if let Err(e) = self.assert_rts() {
            warn!(path = %self.path.display(), error = %e, "Failed to assert RTS");
        }
    }
}
