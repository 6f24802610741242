//! Per-architecture numbers needed to talk to the kernel counter facility.
//!
//! The `perf_event_open` syscall number and the `PERF_EVENT_IOC_*` request
//! codes differ between architectures. Only the machines listed in
//! [`PROFILES`] are supported, anything else is rejected instead of
//! guessing.


use std::fmt;
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::ffi::syscall;

/// Control operations issued against an open counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlOp {
    Reset,
    Enable,
    Disable,
}

impl fmt::Display for ControlOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Reset => "reset",
            Self::Enable => "enable",
            Self::Disable => "disable",
        };
        f.write_str(name)
    }
}

/// Syscall number and control codes of one architecture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arch {
    pub open_syscall: i64,
    pub reset: u64,
    pub enable: u64,
    pub disable: u64,
}

impl Arch {
    // arch/x86/entry/syscalls/syscall_64.tbl, _IO('$', n) with _IOC_NONE = 0
    pub const X86_64: Arch = Arch {
        open_syscall: 298,
        reset: 0x2403,
        enable: 0x2400,
        disable: 0x2401,
    };

    // arch/powerpc/kernel/syscalls/syscall.tbl, _IOC_NONE = 1 << 29 on powerpc
    pub const PPC64LE: Arch = Arch {
        open_syscall: 319,
        reset: 0x20002403,
        enable: 0x20002400,
        disable: 0x20002401,
    };

    /// Looks up the profile for a machine identifier as reported by `uname -m`.
    pub fn for_machine(machine: &str) -> Result<Arch> {
        PROFILES
            .iter()
            .find(|(name, _)| *name == machine)
            .map(|(_, arch)| *arch)
            .ok_or_else(|| Error::UnsupportedArchitecture(machine.to_owned()))
    }

    /// Profile of the running host, resolved once per process.
    pub fn host() -> Result<Arch> {
        HOST.as_ref()
            .copied()
            .map_err(|machine| Error::UnsupportedArchitecture(machine.clone()))
    }

    pub fn op(&self, op: ControlOp) -> u64 {
        match op {
            ControlOp::Reset => self.reset,
            ControlOp::Enable => self.enable,
            ControlOp::Disable => self.disable,
        }
    }
}

/// Known machine identifiers. `amd64` is how some runtimes spell `x86_64`.
pub static PROFILES: [(&str, Arch); 3] = [
    ("x86_64", Arch::X86_64),
    ("amd64", Arch::X86_64),
    ("ppc64le", Arch::PPC64LE),
];

// The error side keeps the offending identifier (or why it could not be read)
// so every later lookup reports the same thing.
static HOST: LazyLock<std::result::Result<Arch, String>> = LazyLock::new(|| {
    let machine: String =
        syscall!(uname_machine,).map_err(|e| format!("<uname failed: {}>", e))?;
    let arch = Arch::for_machine(&machine).map_err(|_| machine.clone());
    match &arch {
        Ok(_) => tracing::debug!(machine = %machine, "resolved architecture profile"),
        Err(_) => tracing::warn!(machine = %machine, "no architecture profile for host"),
    }
    arch
});
