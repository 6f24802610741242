//! Attaching counters to the lifetime of a tracing span.
//!
//! [`SpanAdapter`] only deals in strings and readings: a comma-separated
//! list of event names goes in when a span starts, `(name, value)` pairs come
//! out when it finishes. With the `subscriber` feature, [`PerfEventsLayer`]
//! wires it into `tracing-subscriber`.

#[cfg(feature = "subscriber")]
mod layer;

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

#[cfg(feature = "subscriber")]
pub use layer::PerfEventsLayer;

use crate::arch::Arch;
use crate::backend::{Backend, Kernel};
use crate::count::{Reading, SessionBatch};

/// Span field holding the event list.
pub const DEFAULT_TAG_KEY: &str = "perfevents";

/// Splits a tag value into distinct event names, keeping their first-seen order.
///
/// Whitespace around names and empty segments are ignored.
pub fn parse_event_list(tag: &str) -> Vec<&str> {
    let mut seen = HashSet::new();
    tag.split(',')
        .map(str::trim)
        .filter(|it| !it.is_empty() && seen.insert(*it))
        .collect()
}

/// Counters started for one span.
#[derive(Debug, Default)]
pub struct SpanCounters {
    batch: SessionBatch,
}

impl SpanCounters {
    /// Requested names that are not counting.
    pub fn unsupported(&self) -> impl Iterator<Item = &str> {
        self.batch.unsupported()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }
}

#[derive(Clone)]
pub struct SpanAdapter {
    key: Cow<'static, str>,
    // `None` if the host architecture is unsupported, every span then gets
    // empty counters.
    arch: Option<Arch>,
    backend: Arc<dyn Backend>,
}

impl SpanAdapter {
    pub fn new() -> Self {
        let arch = Arch::host()
            .inspect_err(|e| tracing::warn!(error = %e, "span counters disabled"))
            .ok();
        Self {
            key: Cow::Borrowed(DEFAULT_TAG_KEY),
            arch,
            backend: Arc::new(Kernel),
        }
    }

    pub fn with_backend(arch: Arch, backend: Arc<dyn Backend>) -> Self {
        Self {
            key: Cow::Borrowed(DEFAULT_TAG_KEY),
            arch: Some(arch),
            backend,
        }
    }

    pub fn with_tag_key(mut self, key: impl Into<Cow<'static, str>>) -> Self {
        self.key = key.into();
        self
    }

    pub fn tag_key(&self) -> &str {
        &self.key
    }

    /// Opens and enables the counters named in `tag`.
    ///
    /// Names that fail are logged and skipped, the result may be empty.
    pub fn on_span_start(&self, tag: &str) -> SpanCounters {
        let Some(arch) = self.arch else {
            return SpanCounters::default();
        };

        let names = parse_event_list(tag);
        let batch = SessionBatch::open_all_with(names, arch, Arc::clone(&self.backend));
        for failure in batch.failures() {
            tracing::warn!(
                event = %failure.name,
                error = %failure.error,
                "span counter not available"
            );
        }
        SpanCounters { batch }
    }

    /// Reads then closes the counters.
    ///
    /// Counters that fail to read are left out of the result.
    pub fn on_span_finish(&self, counters: SpanCounters) -> Vec<Reading> {
        let SpanCounters { mut batch } = counters;

        // Read before closing so the teardown is not counted.
        let readings = match batch.read_all() {
            Ok(readings) => readings,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read span counters");
                e.readings
            }
        };
        if let Err(e) = batch.close_all() {
            tracing::warn!(error = %e, "failed to close span counters");
        }

        readings
    }
}

impl Default for SpanAdapter {
    fn default() -> Self {
        Self::new()
    }
}
