//! Structured logging for vt-core.
//!
//! Two line formats share one filter: `fmt` output for people at a
//! terminal, and JSONL from [`JsonlLayer`] for wrappers that parse stderr.
//!
//! # Usage
//!
//! ```ignore
//! use vt_core::logging::{init_logging, LogConfig, LogContext, Stage, event_names};
//!
//! let config = LogConfig::from_env(None, None);
//! init_logging(&config);
//!
//! let ctx = LogContext::new(generate_run_id()).with_session_id("vt-20260115-143022-a7xq");
//! vt_core::log_event!(ctx, INFO, event_names::RUN_STARTED, Stage::Init, "Starting assessment");
//! ```
//!
//! stdout is reserved for command payloads; every log line goes to stderr.
//! Tracing targets are event names (`session.advanced`), so filter
//! directives select events rather than modules.

pub mod config;
pub mod events;
pub mod layer;

pub use config::{verbosity_filter, LogConfig, LogFormat};
pub use events::{event_names, Level, LogContext, LogEvent, Stage};
pub use layer::JsonlLayer;

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber described by `config`.
///
/// A second call leaves the first subscriber in place.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_new(config.filter_directive())
        .unwrap_or_else(|_| EnvFilter::default().add_directive(config.level.into()));

    match config.format {
        LogFormat::Human => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(std::io::stderr().is_terminal());
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init();
        }
        LogFormat::Jsonl => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(JsonlLayer::stderr())
                .try_init();
        }
    }
}

/// `run-` followed by 12 hex digits.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("run-{}", &uuid.simple().to_string()[..12])
}

/// Emit an event at target `$event` carrying the run and session ids of
/// `$ctx`. `$level` is a `tracing::Level` constant name.
///
/// ```ignore
/// log_event!(ctx, DEBUG, event_names::CATALOG_LOADED, Stage::Catalog, "catalog loaded",
///     categories = 5);
/// ```
#[macro_export]
macro_rules! log_event {
    ($ctx:expr, $level:ident, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::event!(
            target: $event,
            tracing::Level::$level,
            run_id = %$ctx.run_id,
            session_id = $ctx.session_id.as_deref(),
            stage = %$stage,
            message = $msg,
            $($key = $val,)*
        )
    };
}
