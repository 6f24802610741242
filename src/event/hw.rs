use std::fmt;
use std::str::FromStr;

use super::{Entry, Kind};
use crate::error::Error;
use crate::ffi::bindings as b;

/// The generic hardware events understood by the kernel on every PMU.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Hardware {
    CpuCycle,
    Instr,

    CacheAccess,
    CacheMiss,

    BranchInstr,
    BranchMiss,

    BusCycle,
}

impl Hardware {
    pub const ALL: [Hardware; 7] = [
        Hardware::CpuCycle,
        Hardware::Instr,
        Hardware::CacheAccess,
        Hardware::CacheMiss,
        Hardware::BranchInstr,
        Hardware::BranchMiss,
        Hardware::BusCycle,
    ];

    /// Name used in tags and batch requests, same as `perf list`.
    pub const fn name(&self) -> &'static str {
        match self {
            Hardware::CpuCycle => "cpu-cycles",
            Hardware::Instr => "instructions",
            Hardware::CacheAccess => "cache-references",
            Hardware::CacheMiss => "cache-misses",
            Hardware::BranchInstr => "branch-instructions",
            Hardware::BranchMiss => "branch-misses",
            Hardware::BusCycle => "bus-cycles",
        }
    }

    pub const fn config(&self) -> u64 {
        match self {
            Hardware::CpuCycle => b::PERF_COUNT_HW_CPU_CYCLES,
            Hardware::Instr => b::PERF_COUNT_HW_INSTRUCTIONS,
            Hardware::CacheAccess => b::PERF_COUNT_HW_CACHE_REFERENCES,
            Hardware::CacheMiss => b::PERF_COUNT_HW_CACHE_MISSES,
            Hardware::BranchInstr => b::PERF_COUNT_HW_BRANCH_INSTRUCTIONS,
            Hardware::BranchMiss => b::PERF_COUNT_HW_BRANCH_MISSES,
            Hardware::BusCycle => b::PERF_COUNT_HW_BUS_CYCLES,
        }
    }

    pub(super) const fn entry(self) -> Entry {
        Entry {
            name: self.name(),
            kind: Kind::Hardware,
            config: self.config(),
        }
    }
}

impl fmt::Display for Hardware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Hardware {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hardware::ALL
            .into_iter()
            .find(|hw| hw.name() == s)
            .ok_or_else(|| Error::UnsupportedEvent(s.to_owned()))
    }
}

impl From<Hardware> for Entry {
    fn from(value: Hardware) -> Self {
        value.entry()
    }
}
