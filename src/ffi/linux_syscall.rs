use std::ffi::CStr;
use std::io::{Error, ErrorKind, Result};
use std::mem::MaybeUninit;
use std::os::fd::RawFd;

use super::Attr;

pub fn perf_event_open(
    num: i64,
    attr: &Attr,
    pid: i32,
    cpu: i32,
    group_fd: i32,
    flags: u64,
) -> Result<RawFd> {
    let attr = attr as *const Attr;
    let fd = unsafe { libc::syscall(num as _, attr, pid, cpu, group_fd, flags) };
    if fd >= 0 {
        Ok(fd as _)
    } else {
        Err(Error::last_os_error())
    }
}

pub fn ioctl(fd: RawFd, op: u64, arg: u64) -> Result<i32> {
    let result = unsafe { libc::ioctl(fd, op as _, arg) };
    if result >= 0 {
        Ok(result)
    } else {
        Err(Error::last_os_error())
    }
}

pub fn read(fd: RawFd, buf: &mut [u8]) -> Result<usize> {
    let count = buf.len();
    let buf = buf.as_mut_ptr() as _;
    let bytes = unsafe { libc::read(fd, buf, count) };
    if bytes >= 0 {
        Ok(bytes as _)
    } else {
        Err(Error::last_os_error())
    }
}

pub fn close(fd: RawFd) -> Result<()> {
    let result = unsafe { libc::close(fd) };
    if result == 0 {
        Ok(())
    } else {
        Err(Error::last_os_error())
    }
}

pub fn uname_machine() -> Result<String> {
    let mut buf = MaybeUninit::<libc::utsname>::zeroed();
    let result = unsafe { libc::uname(buf.as_mut_ptr()) };
    if result != 0 {
        return Err(Error::last_os_error());
    }
    // `uname` filled the struct, every field is a NUL-terminated string.
    let buf = unsafe { buf.assume_init() };
    let machine = unsafe { CStr::from_ptr(buf.machine.as_ptr()) };
    machine
        .to_str()
        .map(str::to_owned)
        .map_err(|e| Error::new(ErrorKind::InvalidData, e))
}
