use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use arrayvec::ArrayVec;

use super::CounterSession;
use crate::arch::Arch;
use crate::backend::{Backend, Kernel};
use crate::config::{attr, Target};
use crate::error::{Error, Result};
use crate::event::{self, EVENT_COUNT};

/// Counter value of one event.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    pub name: String,
    pub value: u64,
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.value)
    }
}

/// A requested event that could not be opened, read or closed.
#[derive(Debug)]
pub struct Failure {
    pub name: String,
    pub error: Error,
}

/// Some counters of a batch failed, the rest succeeded.
#[derive(Debug, thiserror::Error)]
#[error("counters failed: {}", failed_names(.failed))]
pub struct BatchError {
    pub failed: Vec<Failure>,
    /// Readings of the counters that did not fail, empty for `close_all`.
    pub readings: Vec<Reading>,
}

impl BatchError {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.failed.iter().map(|it| it.name.as_str())
    }
}

fn failed_names(failed: &[Failure]) -> String {
    failed
        .iter()
        .map(|it| it.name.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Counters opened together, with the names that could not be opened.
///
/// Every distinct requested name ends up either in [`sessions`][Self::sessions]
/// or in [`failures`][Self::failures], never both.
///
/// # Examples
///
/// ```rust,no_run
/// use perfevents::count::SessionBatch;
///
/// let mut batch = SessionBatch::open_all(["cpu-cycles", "instructions", "bogus"]).unwrap();
/// assert_eq!(batch.unsupported().collect::<Vec<_>>(), ["bogus"]);
///
/// std::hint::black_box((0..1000).sum::<u64>());
///
/// for reading in batch.read_all().unwrap() {
///     println!("{}", reading);
/// }
/// batch.close_all().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct SessionBatch {
    // Names are de-duplicated and only catalog events open, so there is at
    // most one session per catalog entry.
    opened: ArrayVec<CounterSession, EVENT_COUNT>,
    failed: Vec<Failure>,
}

impl SessionBatch {
    /// Opens counters for the calling process on the host architecture.
    pub fn open_all<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let arch = Arch::host()?;
        Ok(Self::open_all_with(names, arch, Arc::new(Kernel)))
    }

    pub fn open_all_with<I, S>(names: I, arch: Arch, backend: Arc<dyn Backend>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut batch = Self::default();
        let mut seen = HashSet::new();

        for name in names {
            let name = name.as_ref();
            if !seen.insert(name.to_owned()) {
                continue;
            }

            let entry = match event::lookup(name) {
                Ok(it) => it,
                Err(error) => {
                    batch.fail(name, error);
                    continue;
                }
            };

            let mut session = CounterSession::new(name, arch, Arc::clone(&backend));
            match session.start_counting_with(&attr::build(entry), Target::default()) {
                Ok(()) => batch.opened.push(session),
                // Dropping the session releases a handle that opened but
                // could not be reset or enabled.
                Err(error) => batch.fail(name, error),
            }
        }

        tracing::debug!(
            opened = batch.opened.len(),
            failed = batch.failed.len(),
            "counter batch opened"
        );
        batch
    }

    fn fail(&mut self, name: &str, error: Error) {
        self.failed.push(Failure {
            name: name.to_owned(),
            error,
        });
    }

    pub fn sessions(&self) -> &[CounterSession] {
        &self.opened
    }

    pub fn sessions_mut(&mut self) -> &mut [CounterSession] {
        &mut self.opened
    }

    pub fn session_mut(&mut self, name: &str) -> Option<&mut CounterSession> {
        self.opened.iter_mut().find(|it| it.name() == name)
    }

    /// Names that were requested but are not counting, in request order.
    pub fn unsupported(&self) -> impl Iterator<Item = &str> {
        self.failed.iter().map(|it| it.name.as_str())
    }

    /// Why each [unsupported][Self::unsupported] name failed.
    pub fn failures(&self) -> &[Failure] {
        &self.failed
    }

    pub fn is_empty(&self) -> bool {
        self.opened.is_empty()
    }

    pub fn read_all(&mut self) -> std::result::Result<Vec<Reading>, BatchError> {
        read_all(&mut self.opened)
    }

    pub fn close_all(&mut self) -> std::result::Result<(), BatchError> {
        close_all(&mut self.opened)
    }
}

/// Reads every session, a failed read does not stop the others.
pub fn read_all(sessions: &mut [CounterSession]) -> std::result::Result<Vec<Reading>, BatchError> {
    let mut readings = Vec::with_capacity(sessions.len());
    let mut failed = vec![];

    for session in sessions.iter_mut() {
        match session.read() {
            Ok(value) => readings.push(Reading {
                name: session.name().to_owned(),
                value,
            }),
            Err(error) => failed.push(Failure {
                name: session.name().to_owned(),
                error,
            }),
        }
    }

    if failed.is_empty() {
        Ok(readings)
    } else {
        Err(BatchError { failed, readings })
    }
}

/// Disables and closes every session, a failure does not stop the others.
pub fn close_all(sessions: &mut [CounterSession]) -> std::result::Result<(), BatchError> {
    let mut failed = vec![];

    for session in sessions.iter_mut() {
        if let Err(error) = session.close() {
            failed.push(Failure {
                name: session.name().to_owned(),
                error,
            });
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(BatchError {
            failed,
            readings: vec![],
        })
    }
}
