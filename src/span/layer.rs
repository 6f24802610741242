use std::fmt;

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use super::{SpanAdapter, SpanCounters};

/// Counts hardware events for spans carrying the tag field.
///
/// When a span is created (or the field is recorded later) with e.g.
/// `perfevents = "cpu-cycles,instructions"`, the named counters start. When the
/// span closes, one `info` event per reading is emitted under the `perfevents`
/// target, with `span`, `event` and `value` fields.
///
/// ```rust,no_run
/// use perfevents::span::PerfEventsLayer;
/// use tracing_subscriber::layer::SubscriberExt;
///
/// let subscriber = tracing_subscriber::registry().with(PerfEventsLayer::new());
/// tracing::subscriber::with_default(subscriber, || {
///     let _span = tracing::info_span!("work", perfevents = "instructions").entered();
///     std::hint::black_box((0..1000).sum::<u64>());
/// });
/// ```
pub struct PerfEventsLayer {
    adapter: SpanAdapter,
}

impl PerfEventsLayer {
    pub fn new() -> Self {
        Self::with_adapter(SpanAdapter::new())
    }

    pub fn with_adapter(adapter: SpanAdapter) -> Self {
        Self { adapter }
    }

    fn attach<S>(&self, id: &Id, tag: &str, ctx: &Context<'_, S>)
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let Some(span) = ctx.span(id) else {
            return;
        };
        // A tag recorded again later does not restart the counters.
        if span.extensions().get::<SpanCounters>().is_some() {
            return;
        }
        // Opening and closing counters may log, keep the extensions
        // unlocked meanwhile.
        let counters = self.adapter.on_span_start(tag);
        let previous = span.extensions_mut().replace(counters);
        drop(previous);
    }
}

impl Default for PerfEventsLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for PerfEventsLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut visitor = TagVisitor::new(self.adapter.tag_key());
        attrs.record(&mut visitor);
        if let Some(tag) = visitor.tag {
            self.attach(id, &tag, &ctx);
        }
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let mut visitor = TagVisitor::new(self.adapter.tag_key());
        values.record(&mut visitor);
        if let Some(tag) = visitor.tag {
            self.attach(id, &tag, &ctx);
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        let counters = span.extensions_mut().remove::<SpanCounters>();
        let Some(counters) = counters else {
            return;
        };

        let name = span.name();
        for reading in self.adapter.on_span_finish(counters) {
            tracing::info!(
                target: "perfevents",
                span = name,
                event = %reading.name,
                value = reading.value,
                "{}",
                reading
            );
        }
    }
}

struct TagVisitor<'a> {
    key: &'a str,
    tag: Option<String>,
}

impl<'a> TagVisitor<'a> {
    fn new(key: &'a str) -> Self {
        Self { key, tag: None }
    }
}

impl Visit for TagVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == self.key {
            self.tag = Some(value.to_owned());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == self.key {
            let value = format!("{:?}", value);
            self.tag = Some(value.trim_matches('"').to_owned());
        }
    }
}
