//! Symbolic event names and the counter type/config pairs they stand for.

pub mod hw;

use crate::error::{Error, Result};
use crate::ffi::bindings as b;

pub use hw::Hardware;

/// Counter type, the `type` field of the attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Kind {
    Hardware,
    Software,
}

impl Kind {
    pub const fn type_id(self) -> u32 {
        match self {
            Kind::Hardware => b::PERF_TYPE_HARDWARE,
            Kind::Software => b::PERF_TYPE_SOFTWARE,
        }
    }
}

/// One row of the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Entry {
    pub name: &'static str,
    pub kind: Kind,
    pub config: u64,
}

pub const EVENT_COUNT: usize = Hardware::ALL.len();

/// Every supported event, in `perf_hw_id` order.
pub static CATALOG: [Entry; EVENT_COUNT] = [
    Hardware::CpuCycle.entry(),
    Hardware::Instr.entry(),
    Hardware::CacheAccess.entry(),
    Hardware::CacheMiss.entry(),
    Hardware::BranchInstr.entry(),
    Hardware::BranchMiss.entry(),
    Hardware::BusCycle.entry(),
];

pub fn lookup(name: &str) -> Result<&'static Entry> {
    CATALOG
        .iter()
        .find(|it| it.name == name)
        .ok_or_else(|| Error::UnsupportedEvent(name.to_owned()))
}

pub fn names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|it| it.name)
}
