//! The four kernel primitives a counter session needs.
//!
//! [`CounterSession`][crate::count::CounterSession] only talks to the kernel
//! through [`Backend`], [`Kernel`] is the real thing.

#[cfg(test)]
pub(crate) mod mock;

use std::io::Result;
use std::os::fd::RawFd;

use crate::ffi::{syscall, Attr};

pub trait Backend: Send + Sync {
    /// `perf_event_open(2)` through the given syscall number, returns the new handle.
    fn open(
        &self,
        syscall: i64,
        attr: &Attr,
        pid: i32,
        cpu: i32,
        group_fd: i32,
        flags: u64,
    ) -> Result<RawFd>;

    /// `ioctl(2)` with a control code.
    fn control(&self, fd: RawFd, op: u64, arg: u64) -> Result<()>;

    /// `read(2)`, returns the number of bytes read.
    fn read(&self, fd: RawFd, buf: &mut [u8]) -> Result<usize>;

    fn close(&self, fd: RawFd) -> Result<()>;
}

/// Issues real syscalls.
#[derive(Clone, Copy, Debug, Default)]
pub struct Kernel;

impl Backend for Kernel {
    fn open(
        &self,
        num: i64,
        attr: &Attr,
        pid: i32,
        cpu: i32,
        group_fd: i32,
        flags: u64,
    ) -> Result<RawFd> {
        syscall!(perf_event_open, num, attr, pid, cpu, group_fd, flags)
    }

    fn control(&self, fd: RawFd, op: u64, arg: u64) -> Result<()> {
        let _: i32 = syscall!(ioctl, fd, op, arg)?;
        Ok(())
    }

    fn read(&self, fd: RawFd, buf: &mut [u8]) -> Result<usize> {
        syscall!(read, fd, buf)
    }

    fn close(&self, fd: RawFd) -> Result<()> {
        syscall!(close, fd)
    }
}
