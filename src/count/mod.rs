use std::fmt;
use std::io;
use std::os::fd::RawFd;
use std::sync::Arc;

use crate::arch::{Arch, ControlOp};
use crate::backend::{Backend, Kernel};
use crate::config::{attr, Target};
use crate::error::{Error, ReadError, Result};
use crate::event;
use crate::ffi::Attr;

pub mod batch;

pub use batch::*;

/// Lifecycle of a [`CounterSession`].
///
/// `Closed` and `Errored` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Unopened,
    Opened,
    Reset,
    Enabled,
    Disabled,
    Closed,
    Errored,
}

/// One counter and the kernel handle it exclusively owns.
///
/// Dropping a session that still owns a handle closes it.
///
/// # Examples
///
/// ```rust,no_run
/// use perfevents::count::CounterSession;
///
/// let mut session = CounterSession::with_kernel("instructions").unwrap();
/// session.start_counting().unwrap();
///
/// std::hint::black_box((0..1000).sum::<u64>());
///
/// let instrs = session.read().unwrap();
/// session.close().unwrap();
/// println!("{} instructions retired", instrs);
/// ```
pub struct CounterSession {
    name: String,
    arch: Arch,
    backend: Arc<dyn Backend>,
    fd: Option<RawFd>,
    state: State,
    value: u64,
}

impl CounterSession {
    pub fn new(name: impl Into<String>, arch: Arch, backend: Arc<dyn Backend>) -> Self {
        Self {
            name: name.into(),
            arch,
            backend,
            fd: None,
            state: State::Unopened,
            value: 0,
        }
    }

    /// Session on the host architecture, talking to the real kernel.
    pub fn with_kernel(name: impl Into<String>) -> Result<Self> {
        Ok(Self::new(name, Arch::host()?, Arc::new(Kernel)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn handle(&self) -> Option<RawFd> {
        self.fd
    }

    /// Last successful reading, 0 before the first one.
    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn open(&mut self, attr: &Attr, target: impl Into<Target>) -> Result<()> {
        match self.state {
            State::Unopened => (),
            State::Closed | State::Errored => return Err(Error::InvalidHandle),
            _ => return Err(Error::AlreadyOpen),
        }

        let target = target.into();
        let result = self.backend.open(
            self.arch.open_syscall,
            attr,
            target.pid,
            target.cpu,
            target.group_fd,
            target.open_flags(),
        );
        match result {
            Ok(fd) if fd >= 0 => {
                tracing::debug!(event = %self.name, fd, "counter opened");
                self.fd = Some(fd);
                self.state = State::Opened;
                Ok(())
            }
            Ok(fd) => {
                self.state = State::Errored;
                let e = io::Error::other(format!("kernel returned handle {}", fd));
                Err(Error::Open(e))
            }
            Err(e) => {
                self.state = State::Errored;
                Err(Error::Open(e))
            }
        }
    }

    pub fn reset(&mut self) -> Result<()> {
        self.control(ControlOp::Reset)
    }

    pub fn enable(&mut self) -> Result<()> {
        self.control(ControlOp::Enable)
    }

    pub fn disable(&mut self) -> Result<()> {
        self.control(ControlOp::Disable)
    }

    // A failed control op leaves the state as it was.
    fn control(&mut self, op: ControlOp) -> Result<()> {
        let fd = self.fd.ok_or(Error::InvalidHandle)?;
        self.backend
            .control(fd, self.arch.op(op), 0)
            .map_err(|source| Error::Control { op, source })?;

        self.state = match (op, self.state) {
            (ControlOp::Reset, State::Opened) => State::Reset,
            (ControlOp::Reset, state) => state,
            (ControlOp::Enable, _) => State::Enabled,
            (ControlOp::Disable, _) => State::Disabled,
        };
        Ok(())
    }

    /// Reads the current count.
    ///
    /// On failure the previous [value][Self::value] is kept.
    pub fn read(&mut self) -> Result<u64> {
        let fd = self.fd.ok_or(Error::InvalidHandle)?;

        let mut buf = [0; size_of::<u64>()];
        match self.backend.read(fd, &mut buf) {
            Ok(n) if n == buf.len() => {
                self.value = u64::from_le_bytes(buf);
                Ok(self.value)
            }
            Ok(n) => Err(Error::Read(ReadError::Short(n))),
            Err(e) => Err(Error::Read(ReadError::Io(e))),
        }
    }

    /// Disables the counter and releases the handle.
    ///
    /// A failed disable does not prevent the close, both failures are returned.
    /// Check [`state`][Self::state] to tell whether the handle was released.
    pub fn close(&mut self) -> Result<()> {
        let fd = self.fd.ok_or(Error::InvalidHandle)?;

        let mut errs = vec![];
        if let Err(e) = self.disable() {
            tracing::warn!(event = %self.name, fd, error = %e, "disable before close failed");
            errs.push(e);
        }

        // Linux releases the descriptor even when `close` fails, so the
        // handle is dropped either way to never close a reused number.
        self.fd = None;
        match self.backend.close(fd) {
            Ok(()) => {
                tracing::debug!(event = %self.name, fd, "counter closed");
                self.state = State::Closed;
            }
            Err(e) => {
                self.state = State::Errored;
                errs.push(Error::Close(e));
            }
        }

        Error::from_steps(errs)
    }

    /// Opens the catalog event named like this session for the calling
    /// process on any CPU, then resets and enables it.
    pub fn start_counting(&mut self) -> Result<()> {
        let entry = event::lookup(&self.name)?;
        self.start_counting_with(&attr::build(entry), Target::default())
    }

    /// Open, reset and enable.
    ///
    /// Every step runs even if an earlier one failed, all failures are returned.
    pub fn start_counting_with(&mut self, attr: &Attr, target: impl Into<Target>) -> Result<()> {
        let results = [self.open(attr, target), self.reset(), self.enable()];

        let mut errs = vec![];
        for e in results.into_iter().filter_map(Result::err) {
            tracing::warn!(event = %self.name, error = %e, "counter start step failed");
            errs.push(e);
        }
        Error::from_steps(errs)
    }
}

impl Drop for CounterSession {
    fn drop(&mut self) {
        if let Some(fd) = self.fd.take() {
            if let Err(e) = self.backend.close(fd) {
                tracing::warn!(
                    event = %self.name,
                    fd,
                    error = %e,
                    "failed to close dropped counter"
                );
            }
        }
    }
}

impl fmt::Debug for CounterSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CounterSession")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("fd", &self.fd)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}
