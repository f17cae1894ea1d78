//! Scripted in-memory endpoints for relay and writer tests.

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use crate::endpoint::{Endpoint, EndpointKind, Readiness};

/// One step of a scripted read side.
#[derive(Debug, Clone)]
pub enum ReadStep {
    /// Data handed out across as many reads as the buffer size requires.
    Data(Vec<u8>),
    /// The read itself fails.
    Fail(io::ErrorKind),
    /// The readiness wait reports hang-up together with data; the read fails.
    FailWithHangUp(io::ErrorKind),
    /// The readiness wait itself fails.
    WaitFail(io::ErrorKind),
    /// The readiness wait returns without data.
    Spurious,
    /// The readiness wait reports hang-up with nothing to read.
    HangUp,
}

/// One step of a scripted write side. Once the script is exhausted every
/// write passes.
#[derive(Debug, Clone, Copy)]
pub enum WriteStep {
    Pass,
    Zero,
    Fail(io::ErrorKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Rts,
    Read(usize),
    Write(usize),
}

pub struct ScriptedEndpoint {
    kind: EndpointKind,
    max_write: usize,
    reads: Mutex<VecDeque<ReadStep>>,
    writes: Mutex<VecDeque<WriteStep>>,
    written: Mutex<Vec<u8>>,
    events: Mutex<Vec<Event>>,
}

impl ScriptedEndpoint {
    fn new(kind: EndpointKind) -> Self {
        Self {
            kind,
            max_write: usize::MAX,
            reads: Mutex::new(VecDeque::new()),
            writes: Mutex::new(VecDeque::new()),
            written: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn serial() -> Self {
        Self::new(EndpointKind::Serial)
    }

    pub fn network() -> Self {
        Self::new(EndpointKind::Network)
    }

    pub fn with_max_write(mut self, max_write: usize) -> Self {
        self.max_write = max_write;
        self
    }

    pub fn with_reads(self, steps: impl IntoIterator<Item = ReadStep>) -> Self {
        lock(&self.reads).extend(steps);
        self
    }

    pub fn with_write_steps(self, steps: impl IntoIterator<Item = WriteStep>) -> Self {
        lock(&self.writes).extend(steps);
        self
    }

    pub fn written(&self) -> Vec<u8> {
        lock(&self.written).clone()
    }

    pub fn events(&self) -> Vec<Event> {
        lock(&self.events).clone()
    }

    fn record(&self, event: Event) {
        lock(&self.events).push(event);
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl Endpoint for ScriptedEndpoint {
    fn kind(&self) -> EndpointKind {
        self.kind
    }

    fn wait_readable(&self) -> io::Result<Readiness> {
        let mut reads = lock(&self.reads);
        match reads.front() {
            Some(ReadStep::Spurious) => {
                reads.pop_front();
                Ok(Readiness::Spurious)
            }
            Some(ReadStep::WaitFail(kind)) => {
                let kind = *kind;
                reads.pop_front();
                Err(kind.into())
            }
            Some(ReadStep::HangUp) => Ok(Readiness::HungUp),
            Some(ReadStep::FailWithHangUp(_)) => Ok(Readiness::Ready { hang_up: true }),
            _ => Ok(Readiness::Ready { hang_up: false }),
        }
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut reads = lock(&self.reads);
        let n = match reads.pop_front() {
            Some(ReadStep::Data(mut data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    reads.push_front(ReadStep::Data(data.split_off(n)));
                }
                n
            }
            Some(ReadStep::Fail(kind) | ReadStep::FailWithHangUp(kind)) => {
                return Err(kind.into());
            }
            _ => 0,
        };
        drop(reads);
        self.record(Event::Read(n));
        Ok(n)
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        let step = lock(&self.writes).pop_front().unwrap_or(WriteStep::Pass);
        match step {
            WriteStep::Zero => Ok(0),
            WriteStep::Fail(kind) => Err(kind.into()),
            WriteStep::Pass => {
                let n = buf.len().min(self.max_write);
                lock(&self.written).extend_from_slice(&buf[..n]);
                self.record(Event::Write(n));
                Ok(n)
            }
        }
    }

    fn request_to_send(&self) {
        self.record(Event::Rts);
    }
}
