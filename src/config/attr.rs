use super::{Flags, Opts};
use crate::event::Entry;
use crate::ffi::bindings as b;
pub use crate::ffi::Attr;

/// Builds the attribute for a catalog entry with default options.
pub fn build(entry: &Entry) -> Attr {
    from(entry, &Opts::default())
}

pub fn from(entry: &Entry, opts: &Opts) -> Attr {
    let mut attr = Attr {
        size: b::PERF_ATTR_SIZE_VER5,
        ..Default::default()
    };

    attr.type_ = entry.kind.type_id();
    attr.config = entry.config;

    let flags = Flags::DEFAULT.union(opts.extra);
    attr.flags |= flags.bits();

    attr
}
