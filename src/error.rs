use std::io;

use thiserror::Error;

use crate::arch::ControlOp;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by counter sessions and the event catalog.
#[derive(Debug, Error)]
pub enum Error {
    /// The event name is not in the [catalog][crate::event::CATALOG].
    #[error("unsupported event: {0:?}")]
    UnsupportedEvent(String),

    /// The host machine has no known syscall number or control codes.
    #[error("unsupported architecture: {0:?}")]
    UnsupportedArchitecture(String),

    /// `open` was called on a session that already owns a handle.
    #[error("counter is already open")]
    AlreadyOpen,

    /// The session does not own a usable handle (never opened, closed, or failed to open).
    #[error("counter handle is invalid")]
    InvalidHandle,

    #[error("failed to open counter")]
    Open(#[source] io::Error),

    #[error("failed to {op} counter")]
    Control {
        op: ControlOp,
        #[source]
        source: io::Error,
    },

    #[error("failed to read counter")]
    Read(#[source] ReadError),

    #[error("failed to close counter")]
    Close(#[source] io::Error),

    /// More than one step of a composite operation failed, in the order attempted.
    #[error("{} steps failed: {}", .0.len(), join(.0))]
    Steps(Vec<Error>),
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("short read: got {0} of 8 bytes")]
    Short(usize),
}

impl Error {
    /// Collapses the failures of a composite operation into a single result.
    pub(crate) fn from_steps(mut errs: Vec<Error>) -> Result<()> {
        match errs.len() {
            0 => Ok(()),
            1 => Err(errs.remove(0)),
            _ => Err(Error::Steps(errs)),
        }
    }
}

fn join(errs: &[Error]) -> String {
    errs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
