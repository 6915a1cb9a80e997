//! Event vocabulary: stages, event names and the JSONL record.
//!
//! Event names double as tracing targets, so `VT_LOG=session.advanced=trace`
//! selects a single kind of event.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Level as written in the `level` field of a JSONL line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Where in a run an event happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and logging setup.
    Init,
    /// Catalog resolution, loading and validation.
    Catalog,
    /// Question-by-question answer collection.
    Ask,
    /// Score aggregation and band classification.
    Score,
    /// Chat and vet finder handoffs.
    Handoff,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stage::Init => "init",
            Stage::Catalog => "catalog",
            Stage::Ask => "ask",
            Stage::Score => "score",
            Stage::Handoff => "handoff",
        })
    }
}

/// Standard event names used as tracing targets.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    // Catalog stage
    pub const CATALOG_LOADED: &str = "catalog.loaded";
    pub const CATALOG_PRESET_USED: &str = "catalog.preset_used";
    pub const CATALOG_LINT: &str = "catalog.lint";
    pub const CATALOG_ERROR: &str = "catalog.error";

    // Ask stage
    pub const SESSION_STARTED: &str = "session.started";
    pub const SESSION_ANSWER_RECORDED: &str = "session.answer_recorded";
    pub const SESSION_ANSWER_REJECTED: &str = "session.answer_rejected";
    pub const SESSION_ADVANCED: &str = "session.advanced";
    pub const SESSION_ADVANCE_CANCELLED: &str = "session.advance_cancelled";
    pub const SESSION_ADVANCE_STALE: &str = "session.advance_stale";
    pub const SESSION_WENT_BACK: &str = "session.went_back";
    pub const SESSION_RESET: &str = "session.reset";
    pub const SESSION_COMPLETED: &str = "session.completed";
    pub const SESSION_CANCELLED: &str = "session.cancelled";

    // Score stage
    pub const SCORE_COMPUTED: &str = "score.computed";

    // Handoff stage
    pub const HANDOFF_CHAT: &str = "handoff.chat";
    pub const HANDOFF_VET_FINDER: &str = "handoff.vet_finder";
}

/// One JSONL line as written by [`JsonlLayer`](super::JsonlLayer).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    pub ts: DateTime<Utc>,
    pub level: Level,
    /// Tracing target, e.g. `session.advanced`.
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl LogEvent {
    pub fn to_jsonl(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            serde_json::json!({ "event": self.event, "error": "serialization_failed" }).to_string()
        })
    }
}

/// Correlation ids stamped on every event by `log_event!`.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
    pub session_id: Option<String>,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            session_id: None,
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}
