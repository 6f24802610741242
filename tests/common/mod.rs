#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Error, Result};
use std::os::fd::RawFd;
use std::sync::{Arc, Mutex};

use perfevents::backend::Backend;
use perfevents::config::attr::Attr;

/// Counts up by `step` on every read of an enabled counter.
pub struct Fake {
    step: u64,
    enable_op: u64,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    next_fd: RawFd,
    counters: HashMap<RawFd, (bool, u64)>,
    refused: Vec<u64>,
}

impl Fake {
    pub fn new(step: u64, enable_op: u64) -> Arc<Self> {
        Arc::new(Self {
            step,
            enable_op,
            state: Mutex::new(State {
                next_fd: 10,
                ..Default::default()
            }),
        })
    }

    pub fn refuse(&self, config: u64) {
        self.state.lock().unwrap().refused.push(config);
    }

    pub fn open_count(&self) -> usize {
        self.state.lock().unwrap().counters.len()
    }
}

impl Backend for Fake {
    fn open(
        &self,
        _syscall: i64,
        attr: &Attr,
        _pid: i32,
        _cpu: i32,
        _group_fd: i32,
        _flags: u64,
    ) -> Result<RawFd> {
        let mut state = self.state.lock().unwrap();
        if state.refused.contains(&attr.config) {
            return Err(Error::from_raw_os_error(libc::ENOENT));
        }
        let fd = state.next_fd;
        state.next_fd += 1;
        state.counters.insert(fd, (false, 0));
        Ok(fd)
    }

    fn control(&self, fd: RawFd, op: u64, _arg: u64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let Some(counter) = state.counters.get_mut(&fd) else {
            return Err(Error::from_raw_os_error(libc::EBADF));
        };
        if op == self.enable_op {
            counter.0 = true;
        }
        Ok(())
    }

    fn read(&self, fd: RawFd, buf: &mut [u8]) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        let Some(counter) = state.counters.get_mut(&fd) else {
            return Err(Error::from_raw_os_error(libc::EBADF));
        };
        if counter.0 {
            counter.1 += self.step;
        }
        let bytes = counter.1.to_le_bytes();
        buf[..bytes.len()].copy_from_slice(&bytes);
        Ok(bytes.len())
    }

    fn close(&self, fd: RawFd) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.counters.remove(&fd) {
            Some(_) => Ok(()),
            None => Err(Error::from_raw_os_error(libc::EBADF)),
        }
    }
}
