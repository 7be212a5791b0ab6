//! In-memory event capture for logging assertions in tests.
//!
//! [`init_test_capture`] installs a process-global subscriber on first use;
//! every caller shares the same event log, so assertions must filter on an
//! op name or field value unique to the calling test.

use geoatlas_core_types::schema::{FIELD_EVENT, FIELD_OP};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded event, with every field rendered as text
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub op: Option<String>,
    pub event: Option<String>,
    pub fields: HashMap<String, String>,
}

#[derive(Default)]
struct TextFields(HashMap<String, String>);

impl Visit for TextFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

type EventLog = Arc<Mutex<Vec<CapturedEvent>>>;

struct CaptureLayer(EventLog);

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = TextFields::default();
        event.record(&mut fields);
        let fields = fields.0;
        let captured = CapturedEvent {
            level: *event.metadata().level(),
            op: fields.get(FIELD_OP).cloned(),
            event: fields.get(FIELD_EVENT).cloned(),
            fields,
        };
        if let Ok(mut log) = self.0.lock() {
            log.push(captured);
        }
    }
}

/// Shared handle onto the captured event log
#[derive(Clone)]
pub struct TestCapture {
    log: EventLog,
}

impl TestCapture {
    fn snapshot(&self) -> Vec<CapturedEvent> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Events emitted for `op`, in emission order
    pub fn events_for(&self, op: &str) -> Vec<CapturedEvent> {
        self.snapshot()
            .into_iter()
            .filter(|e| e.op.as_deref() == Some(op))
            .collect()
    }

    pub fn count_events(&self, predicate: impl Fn(&CapturedEvent) -> bool) -> usize {
        self.snapshot().iter().filter(|e| predicate(e)).count()
    }

    /// # Panics
    ///
    /// Panics unless some `op` event of type `event` was captured.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events_for(op);
        assert!(
            events.iter().any(|e| e.event.as_deref() == Some(event)),
            "no {event} event for op {op} among {} captured for it",
            events.len()
        );
    }

    /// # Panics
    ///
    /// Panics unless some `op`/`event` pair was captured with `field = value`.
    pub fn assert_event_field(&self, op: &str, event: &str, field: &str, value: &str) {
        let found = self.events_for(op).iter().any(|e| {
            e.event.as_deref() == Some(event)
                && e.fields.get(field).map(String::as_str) == Some(value)
        });
        assert!(found, "no {event} event for op {op} with {field}={value}");
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture subscriber once and return a handle to it.
///
/// ```
/// use geoatlas_core::logging_facility::test_capture::init_test_capture;
/// use geoatlas_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_capture_op");
/// capture.assert_event_exists("doc_capture_op", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let log = EventLog::default();
            tracing_subscriber::registry()
                .with(CaptureLayer(Arc::clone(&log)))
                .init();
            TestCapture { log }
        })
        .clone()
}
