//! Bounded table of terminal attributes to put back on release.

use std::fmt;
use std::os::fd::RawFd;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use nix::sys::termios::Termios;
use tracing::warn;

/// Original attributes of each opened serial descriptor, captured once
/// before any change is made. At most one slot exists per descriptor.
///
/// Clones share the same slots. A slot lives only as long as the descriptor
/// it was recorded for, so a reused descriptor number never inherits a
/// previous device's attributes.
#[derive(Clone)]
pub struct RestoreTable {
    inner: Arc<Slots>,
}

struct Slots {
    capacity: usize,
    entries: Mutex<Vec<(RawFd, Termios)>>,
}

impl RestoreTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Slots {
                capacity,
                entries: Mutex::new(Vec::with_capacity(capacity)),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Store the original attributes of `fd`.
    ///
    /// Returns `false` without storing when `fd` already has a snapshot or
    /// the table is full; the latter means the device will not be restored.
    pub fn record(&self, fd: RawFd, attrs: &Termios) -> bool {
        let mut slots = self.lock();
        if slots.iter().any(|(slot_fd, _)| *slot_fd == fd) {
            return false;
        }
        if slots.len() >= self.inner.capacity {
            warn!(
                fd,
                capacity = self.inner.capacity,
                "Restore table full, original terminal attributes will not be restored"
            );
            return false;
        }
        slots.push((fd, attrs.clone()));
        true
    }

    /// Snapshot for `fd`, if one was recorded.
    pub fn get(&self, fd: RawFd) -> Option<Termios> {
        self.lock()
            .iter()
            .find(|(slot_fd, _)| *slot_fd == fd)
            .map(|(_, attrs)| attrs.clone())
    }

    /// Remove and return the snapshot for `fd`, freeing its slot.
    pub fn take(&self, fd: RawFd) -> Option<Termios> {
        let mut slots = self.lock();
        let idx = slots.iter().position(|(slot_fd, _)| *slot_fd == fd)?;
        Some(slots.swap_remove(idx).1)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(RawFd, Termios)>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for RestoreTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestoreTable")
            .field("capacity", &self.inner.capacity)
            .field("len", &self.len())
            .finish()
    }
}

impl Default for RestoreTable {
    fn default() -> Self {
        Self::new(crate::config::RESTORE_TABLE_CAPACITY)
    }
}
