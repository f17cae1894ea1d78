//! Modem control line access (TIOCMGET / TIOCMSET).

use std::os::fd::{AsRawFd, BorrowedFd};

use libc::c_int;

#[allow(unsafe_code)]
mod ioctl {
    nix::ioctl_read_bad!(tiocmget, libc::TIOCMGET, libc::c_int);
    nix::ioctl_write_ptr_bad!(tiocmset, libc::TIOCMSET, libc::c_int);
}

pub const RTS: c_int = libc::TIOCM_RTS;
pub const CTS: c_int = libc::TIOCM_CTS;

/// Current modem status bits.
#[allow(unsafe_code)]
pub fn get(fd: BorrowedFd<'_>) -> nix::Result<c_int> {
    let mut bits: c_int = 0;
    // SAFETY: the descriptor is borrowed for the duration of the call and
    // `bits` is a valid, writable c_int.
    unsafe { ioctl::tiocmget(fd.as_raw_fd(), &raw mut bits) }?;
    Ok(bits)
}

/// Replace the modem status bits.
#[allow(unsafe_code)]
pub fn set(fd: BorrowedFd<'_>, bits: c_int) -> nix::Result<()> {
    // SAFETY: the descriptor is borrowed for the duration of the call and
    // `bits` lives on the stack until the ioctl returns.
    unsafe { ioctl::tiocmset(fd.as_raw_fd(), &raw const bits) }?;
    Ok(())
}

/// Read-modify-write: OR in `mask` when `on`, mask it out otherwise.
pub fn update(fd: BorrowedFd<'_>, mask: c_int, on: bool) -> nix::Result<()> {
    let bits = get(fd)?;
    let bits = if on { bits | mask } else { bits & !mask };
    set(fd, bits)
}
