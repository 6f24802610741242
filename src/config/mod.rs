pub mod attr;
mod target;

use std::fmt;

pub use target::*;

// https://github.com/torvalds/linux/blob/v6.13/include/uapi/linux/perf_event.h#L414
/// Bit positions of the single-bit attribute flags.
///
/// `PreciseIp0`/`PreciseIp1` are the two bits of the `precise_ip` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Flag {
    Disabled = 0,
    Inherit = 1,
    Pinned = 2,
    Exclusive = 3,
    ExcludeUser = 4,
    ExcludeKernel = 5,
    ExcludeHv = 6,
    ExcludeIdle = 7,
    Mmap = 8,
    Comm = 9,
    Freq = 10,
    InheritStat = 11,
    EnableOnExec = 12,
    Task = 13,
    Watermark = 14,
    PreciseIp0 = 15,
    PreciseIp1 = 16,
    MmapData = 17,
    SampleIdAll = 18,
    ExcludeHost = 19,
    ExcludeGuest = 20,
    ExcludeCallchainKernel = 21,
    ExcludeCallchainUser = 22,
    Mmap2 = 23,
    CommExec = 24,
    UseClockid = 25,
    ContextSwitch = 26,
    WriteBackward = 27,
}

impl Flag {
    pub const fn pos(self) -> u8 {
        self as u8
    }
}

/// Sets the bit at `pos`, leaving every other bit as it was.
pub const fn set_bit(bits: u64, pos: u8) -> u64 {
    bits | (1 << pos)
}

/// The `flags` bitset of the attribute.
///
/// Bits are only ever added, there is no way to clear one.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags(u64);

impl Flags {
    /// `Disabled`, `ExcludeKernel` and `ExcludeHv`.
    ///
    /// Counters start disabled so `reset` + `enable` decide when counting
    /// begins, and only user space is counted so no extra privilege is needed.
    pub const DEFAULT: Flags = Flags::empty()
        .with(Flag::Disabled)
        .with(Flag::ExcludeKernel)
        .with(Flag::ExcludeHv);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn with(self, flag: Flag) -> Self {
        Self(set_bit(self.0, flag.pos()))
    }

    pub fn set(&mut self, flag: Flag) {
        self.0 = set_bit(self.0, flag.pos());
    }

    pub const fn union(self, other: Flags) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(&self, flag: Flag) -> bool {
        self.0 & (1 << flag.pos()) != 0
    }

    pub const fn bits(&self) -> u64 {
        self.0
    }
}

impl From<Flag> for Flags {
    fn from(value: Flag) -> Self {
        Flags::empty().with(value)
    }
}

impl FromIterator<Flag> for Flags {
    fn from_iter<T: IntoIterator<Item = Flag>>(iter: T) -> Self {
        let mut flags = Flags::empty();
        iter.into_iter().for_each(|it| flags.set(it));
        flags
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Flags({:#x})", self.0)
    }
}

/// Counter options.
///
/// [`Flags::DEFAULT`] is always applied, `extra` can only add to it.
#[derive(Clone, Debug, Default)]
pub struct Opts {
    pub extra: Flags,
}
