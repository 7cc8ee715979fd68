use crate::context::Context;
use crate::handler::Handler;
use crate::level::Level;
use crate::record::Record;
use crate::value::Attr;
use chrono::Utc;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio_util::task::TaskTracker;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context as LayerContext, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Events from this crate are never fed back into the handler, otherwise a
/// store that logs while inserting would archive its own logs forever.
const OWN_TARGET: &str = "log_archive_sink";

fn is_own_target(target: &str) -> bool {
    target == OWN_TARGET
        || target
            .strip_prefix(OWN_TARGET)
            .map_or(false, |rest| rest.starts_with("::"))
}

/// `tracing_subscriber` layer that turns events into [`Record`]s and hands
/// them to a [`Handler`].
///
/// Each enabled event is dispatched as one `handle` call on the current
/// tokio runtime. The calls are tracked, so a [`Drain`] obtained from
/// [`HandlerLayer::drain`] can wait for all of them before shutdown. With
/// [`HandlerLayer::with_max_in_flight`] set, events arriving while that
/// many calls are still running are dropped and counted as failed rather
/// than queued.
pub struct HandlerLayer {
    handler: Arc<dyn Handler>,
    tracker: TaskTracker,
    max_in_flight: Option<usize>,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Events handed to the handler.
    pub dispatched_events: Arc<AtomicU64>,
    /// Events whose handling failed or could not be started.
    pub failed_events: Arc<AtomicU64>,
}

impl HandlerLayer {
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self {
            handler,
            tracker: TaskTracker::new(),
            max_in_flight: None,
            total_events: Arc::new(AtomicU64::new(0)),
            dispatched_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Limit the number of `handle` calls running at once.
    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = Some(max);
        self
    }

    /// Handle for waiting on the records this layer has dispatched. Take it
    /// before the layer is moved into a subscriber.
    pub fn drain(&self) -> Drain {
        Drain {
            tracker: self.tracker.clone(),
        }
    }

    fn dispatch(&self, record: Record) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                self.failed_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("no tokio runtime available, dropping log record");
                return;
            }
        };

        if let Some(max) = self.max_in_flight {
            if self.tracker.len() >= max {
                self.failed_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("{} log records in flight, dropping log record", max);
                return;
            }
        }

        self.dispatched_events.fetch_add(1, Ordering::Relaxed);
        let handler = Arc::clone(&self.handler);
        let failed_events = Arc::clone(&self.failed_events);
        self.tracker.spawn_on(
            async move {
                if let Err(e) = handler.handle(&Context::background(), &record).await {
                    failed_events.fetch_add(1, Ordering::Relaxed);
                    eprintln!("error handling log record: {}", e);
                }
            },
            &runtime,
        );
    }
}

/// Waits for the `handle` calls started by a [`HandlerLayer`].
#[derive(Clone, Debug)]
pub struct Drain {
    tracker: TaskTracker,
}

impl Drain {
    /// Number of records still being handled.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every dispatched record has been handled. Records
    /// dispatched while waiting are waited for as well.
    pub async fn wait(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

impl<S> Layer<S> for HandlerLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: LayerContext<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let meta = event.metadata();
        if is_own_target(meta.target()) {
            return;
        }
        let level = Level::from(*meta.level());
        if !self.handler.enabled(&Context::background(), level) {
            return;
        }

        let mut attrs = Vec::new();
        let mut message: Option<String> = None;
        event.record(&mut FieldVisitor {
            attrs: &mut attrs,
            message: &mut message,
        });

        let record = Record::new(Some(Utc::now()), level, message.unwrap_or_default()).with_attrs(attrs);
        self.dispatch(record);
    }
}

/// Collects event fields as typed attributes, in declaration order.
pub struct FieldVisitor<'a> {
    pub attrs: &'a mut Vec<Attr>,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.attrs.push(Attr::string(field.name(), value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.attrs.push(Attr::int64(field.name(), value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.attrs.push(Attr::uint64(field.name(), value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.attrs.push(Attr::float64(field.name(), value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.attrs.push(Attr::bool(field.name(), value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.attrs.push(Attr::string(field.name(), value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.attrs.push(Attr::string(field.name(), format!("{:?}", value)));
        }
    }
}
