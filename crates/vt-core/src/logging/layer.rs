//! Custom tracing layer for JSONL output.
//!
//! This layer produces machine-parseable JSONL logs on stderr while
//! keeping stdout clean for command payloads.

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Utc;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use super::events::{Level, LogEvent};

/// Correlation fields recorded on a span.
#[derive(Debug, Clone, Default)]
struct SpanContext {
    run_id: Option<String>,
    session_id: Option<String>,
    stage: Option<String>,
}

/// Extracts event fields into a JSON map.
struct JsonFieldVisitor {
    fields: serde_json::Map<String, serde_json::Value>,
    message: Option<String>,
}

impl JsonFieldVisitor {
    fn new() -> Self {
        JsonFieldVisitor {
            fields: serde_json::Map::new(),
            message: None,
        }
    }

    fn insert(&mut self, field: &Field, value: serde_json::Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for JsonFieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.insert(field, serde_json::Value::String(value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(s);
        } else {
            self.insert(field, serde_json::Value::String(s));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, serde_json::Value::Number(value.into()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, serde_json::Value::Number(value.into()));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Some(n) = serde_json::Number::from_f64(value) {
            self.insert(field, serde_json::Value::Number(n));
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, serde_json::Value::Bool(value));
    }
}

/// Picks correlation fields off span attributes.
struct SpanContextVisitor {
    context: SpanContext,
}

impl SpanContextVisitor {
    fn slot(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "run_id" => Some(&mut self.context.run_id),
            "session_id" => Some(&mut self.context.session_id),
            "stage" => Some(&mut self.context.stage),
            _ => None,
        }
    }
}

impl Visit for SpanContextVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if let Some(slot) = self.slot(field.name()) {
            *slot = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        // `%value` fields arrive here already formatted with Display.
        if let Some(slot) = self.slot(field.name()) {
            *slot = Some(format!("{:?}", value));
        }
    }
}

/// JSONL tracing layer, stderr by default.
pub struct JsonlLayer<W = io::Stderr> {
    writer: Mutex<W>,
}

impl JsonlLayer<io::Stderr> {
    pub fn stderr() -> Self {
        JsonlLayer {
            writer: Mutex::new(io::stderr()),
        }
    }
}

impl<W: Write> JsonlLayer<W> {
    /// Create a new JSONL layer with a custom writer.
    pub fn new(writer: W) -> Self {
        JsonlLayer {
            writer: Mutex::new(writer),
        }
    }
}

impl<S, W> Layer<S> for JsonlLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: Write + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut visitor = SpanContextVisitor {
            context: SpanContext::default(),
        };
        attrs.record(&mut visitor);

        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(visitor.context);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let ts = Utc::now();

        // Innermost span wins for each correlation field
        let mut merged = SpanContext::default();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope {
                if let Some(span_ctx) = span.extensions().get::<SpanContext>() {
                    if merged.run_id.is_none() {
                        merged.run_id.clone_from(&span_ctx.run_id);
                    }
                    if merged.session_id.is_none() {
                        merged.session_id.clone_from(&span_ctx.session_id);
                    }
                    if merged.stage.is_none() {
                        merged.stage.clone_from(&span_ctx.stage);
                    }
                }
            }
        }

        let mut visitor = JsonFieldVisitor::new();
        event.record(&mut visitor);

        // Fields on the event itself override span context
        for (key, slot) in [
            ("run_id", &mut merged.run_id),
            ("session_id", &mut merged.session_id),
            ("stage", &mut merged.stage),
        ] {
            if let Some(serde_json::Value::String(v)) = visitor.fields.remove(key) {
                *slot = Some(v);
            }
        }

        let record = LogEvent {
            ts,
            level: Level::from(*event.metadata().level()),
            event: event.metadata().target().to_string(),
            run_id: merged.run_id,
            session_id: merged.session_id,
            stage: merged.stage,
            message: visitor.message,
            fields: visitor.fields,
        };
        let json = record.to_jsonl();
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", json);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tracing_subscriber::layer::SubscriberExt;

    struct BufWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for BufWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce()) -> Vec<serde_json::Value> {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let layer = JsonlLayer::new(BufWriter(buffer.clone()));
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, f);

        let output = buffer.lock().unwrap();
        String::from_utf8_lossy(&output)
            .lines()
            .map(|line| serde_json::from_str(line).expect("valid JSON line"))
            .collect()
    }

    #[test]
    fn layer_writes_one_json_object_per_event() {
        let lines = capture(|| {
            tracing::info!(target: "session.started", message = "first");
            tracing::warn!(target: "catalog.lint", message = "second");
        });
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "session.started");
        assert_eq!(lines[0]["level"], "info");
        assert_eq!(lines[1]["level"], "warn");
        assert!(lines[0]["ts"].is_string());
    }

    #[test]
    fn layer_records_extra_fields() {
        let lines = capture(|| {
            tracing::info!(target: "score.computed", score = 10u32, refer = true, band = "urgent", message = "hi");
        });
        assert_eq!(lines[0]["fields"]["score"], 10);
        assert_eq!(lines[0]["fields"]["refer"], true);
        assert_eq!(lines[0]["fields"]["band"], "urgent");
        assert_eq!(lines[0]["message"], "hi");
    }

    #[test]
    fn layer_lifts_span_context() {
        let lines = capture(|| {
            let span = tracing::info_span!("run", run_id = "run-abc", stage = "ask");
            let _enter = span.enter();
            tracing::debug!(target: "session.advanced", session_id = "vt-1", step = 2u64);
        });
        assert_eq!(lines[0]["run_id"], "run-abc");
        assert_eq!(lines[0]["stage"], "ask");
        assert_eq!(lines[0]["session_id"], "vt-1");
        assert_eq!(lines[0]["fields"]["step"], 2);
        assert!(lines[0]["fields"].get("session_id").is_none());
    }

    #[test]
    fn layer_formats_display_fields() {
        let lines = capture(|| {
            let stage = crate::logging::Stage::Score;
            tracing::info!(target: "score.computed", stage = %stage);
        });
        assert_eq!(lines[0]["stage"], "score");
    }

    #[test]
    fn log_event_stamps_context_ids() {
        use crate::logging::{event_names, LogContext, Stage};

        let ctx = LogContext::new("run-0123456789ab").with_session_id("vt-20260115-143022-a7xq");
        let bare = LogContext::new("run-ba5e");
        let lines = capture(|| {
            crate::log_event!(ctx, INFO, event_names::SESSION_CANCELLED, Stage::Ask, "assessment cancelled",
                answered = 2u64);
            crate::log_event!(bare, ERROR, event_names::CATALOG_ERROR, Stage::Catalog, "bad file");
        });
        assert_eq!(lines[0]["event"], "session.cancelled");
        assert_eq!(lines[0]["level"], "info");
        assert_eq!(lines[0]["run_id"], "run-0123456789ab");
        assert_eq!(lines[0]["session_id"], "vt-20260115-143022-a7xq");
        assert_eq!(lines[0]["stage"], "ask");
        assert_eq!(lines[0]["message"], "assessment cancelled");
        assert_eq!(lines[0]["fields"]["answered"], 2);

        assert_eq!(lines[1]["level"], "error");
        assert!(lines[1].get("session_id").is_none());
    }
}
