use std::collections::{HashMap, HashSet};
use std::io::{Error, Result};
use std::os::fd::RawFd;
use std::sync::{Arc, Mutex, MutexGuard};

use super::Backend;
use crate::ffi::Attr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Open { syscall: i64, config: u64, flags: u64 },
    Control { fd: RawFd, op: u64 },
    Read { fd: RawFd, len: usize },
    Close { fd: RawFd },
}

/// Simulated kernel: every open handle holds a counter value.
#[derive(Default)]
pub struct Mock {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_fd: RawFd,
    values: HashMap<RawFd, u64>,
    refuse_config: HashSet<u64>,
    fail_op: HashSet<u64>,
    fail_read: bool,
    short_read: Option<usize>,
    fail_close: bool,
    calls: Vec<Call>,
}

impl Mock {
    pub fn new() -> Arc<Self> {
        let mock = Self::default();
        mock.lock().next_fd = 3;
        Arc::new(mock)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn refuse(&self, config: u64) {
        self.lock().refuse_config.insert(config);
    }

    pub fn fail_op(&self, op: u64) {
        self.lock().fail_op.insert(op);
    }

    pub fn fail_read(&self) {
        self.lock().fail_read = true;
    }

    pub fn short_read(&self, len: usize) {
        self.lock().short_read = Some(len);
    }

    pub fn fail_close(&self) {
        self.lock().fail_close = true;
    }

    pub fn set_value(&self, fd: RawFd, value: u64) {
        self.lock().values.insert(fd, value);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn open_fds(&self) -> usize {
        self.lock().values.len()
    }
}

impl Backend for Mock {
    fn open(
        &self,
        syscall: i64,
        attr: &Attr,
        _pid: i32,
        _cpu: i32,
        _group_fd: i32,
        flags: u64,
    ) -> Result<RawFd> {
        let mut inner = self.lock();
        inner.calls.push(Call::Open {
            syscall,
            config: attr.config,
            flags,
        });
        if inner.refuse_config.contains(&attr.config) {
            return Err(Error::from_raw_os_error(libc::ENOENT));
        }
        let fd = inner.next_fd;
        inner.next_fd += 1;
        inner.values.insert(fd, 0);
        Ok(fd)
    }

    fn control(&self, fd: RawFd, op: u64, _arg: u64) -> Result<()> {
        let mut inner = self.lock();
        inner.calls.push(Call::Control { fd, op });
        if !inner.values.contains_key(&fd) {
            return Err(Error::from_raw_os_error(libc::EBADF));
        }
        if inner.fail_op.contains(&op) {
            return Err(Error::from_raw_os_error(libc::EINVAL));
        }
        Ok(())
    }

    fn read(&self, fd: RawFd, buf: &mut [u8]) -> Result<usize> {
        let mut inner = self.lock();
        inner.calls.push(Call::Read { fd, len: buf.len() });
        let Some(value) = inner.values.get(&fd).copied() else {
            return Err(Error::from_raw_os_error(libc::EBADF));
        };
        if inner.fail_read {
            return Err(Error::other("read failed"));
        }
        let bytes = value.to_le_bytes();
        let len = inner.short_read.unwrap_or(bytes.len()).min(buf.len());
        buf[..len].copy_from_slice(&bytes[..len]);
        Ok(len)
    }

    fn close(&self, fd: RawFd) -> Result<()> {
        let mut inner = self.lock();
        inner.calls.push(Call::Close { fd });
        if inner.fail_close {
            return Err(Error::from_raw_os_error(libc::EIO));
        }
        match inner.values.remove(&fd) {
            Some(_) => Ok(()),
            None => Err(Error::from_raw_os_error(libc::EBADF)),
        }
    }
}
