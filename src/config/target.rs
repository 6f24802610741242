use crate::ffi::bindings as b;

#[derive(Clone, Copy, Debug)]
pub struct All;

#[derive(Clone, Copy, Debug)]
pub struct Cpu(pub u32);

impl Cpu {
    pub const ALL: All = All;
}

#[derive(Clone, Copy, Debug)]
pub struct Proc(pub u32);

impl Proc {
    pub const CURRENT: Proc = Proc(0);
}

/// Arguments of `perf_event_open` besides the attribute.
///
/// Defaults to the calling process on any CPU, without a group leader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub pid: i32,
    pub cpu: i32,
    pub group_fd: i32,
    pub flags: u64,
}

impl Target {
    pub const SELF_ANY_CPU: Target = Target {
        pid: 0,
        cpu: -1,
        group_fd: -1,
        flags: 0,
    };

    /// Flags actually passed to the kernel, handles are never inherited by `execve`.
    pub fn open_flags(&self) -> u64 {
        self.flags | b::PERF_FLAG_FD_CLOEXEC
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::SELF_ANY_CPU
    }
}

macro_rules! into_target {
    ($ty: ty, $destruct: tt, $pid: expr, $cpu: expr) => {
        impl From<$ty> for Target {
            fn from($destruct: $ty) -> Self {
                Target {
                    pid: $pid as _,
                    cpu: $cpu as _,
                    ..Target::SELF_ANY_CPU
                }
            }
        }
    };
}

into_target!((Proc, Cpu), (Proc(pid), Cpu(cpu)), pid, cpu);
into_target!((Cpu, Proc), (Cpu(cpu), Proc(pid)), pid, cpu);

into_target!((Proc, All), (Proc(pid), _), pid, -1);
into_target!((All, Proc), (_, Proc(pid)), pid, -1);

// No `(Cpu, All)`: `pid == -1` counts every task on that CPU, not a process.
