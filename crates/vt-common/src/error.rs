//! Error types for Vet Triage.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - A programming-error flag separating caller misuse from runtime faults
//! - Remediation hints for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Invalid Option
//!   Reason: option 'vomiting' does not belong to category 'breathing'
//!   Fix: Render options only from the displayed category of the catalog.
//! ```
//!
//! # Machine-Facing Output
//!
//! ```json
//! {
//!   "code": 31,
//!   "category": "engine",
//!   "message": "option 'vomiting' does not belong to category 'breathing'",
//!   "programming_error": true,
//!   "context": { "category": "breathing", "option": "vomiting" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::id::{CategoryId, OptionId};

/// Result type alias for Vet Triage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Catalog loading and validation errors.
    Config,
    /// Misuse of the catalog or assessment session by calling code.
    Engine,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Engine => write!(f, "engine"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for Vet Triage.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    /// `code` is the validation code of the underlying catalog error (40-49).
    #[error("invalid catalog: {message}")]
    InvalidCatalog { code: u32, message: String },

    // Engine errors (30-39)
    #[error("category index {index} out of range (catalog has {count} categories)")]
    OutOfRange { index: usize, count: usize },

    #[error("option '{option}' does not belong to category '{category}'")]
    InvalidOption {
        category: CategoryId,
        option: OptionId,
    },

    #[error("category '{requested}' is not the displayed category '{expected}'")]
    CategoryMismatch {
        expected: CategoryId,
        requested: CategoryId,
    },

    #[error("session {session_id} is completed; only reset is allowed")]
    SessionCompleted { session_id: String },

    #[error("session {session_id} is incomplete: {answered} of {total} categories answered")]
    IncompleteSession {
        session_id: String,
        answered: usize,
        total: usize,
    },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 30-39: Engine misuse
    /// - 60-69: I/O errors
    ///
    /// Catalog validation has its own range (40-49), reported as
    /// `validation_code` in [`StructuredError`] context.
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidCatalog { .. } => 11,
            Error::OutOfRange { .. } => 30,
            Error::InvalidOption { .. } => 31,
            Error::CategoryMismatch { .. } => 32,
            Error::SessionCompleted { .. } => 33,
            Error::IncompleteSession { .. } => 34,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidCatalog { .. } => ErrorCategory::Config,

            Error::OutOfRange { .. }
            | Error::InvalidOption { .. }
            | Error::CategoryMismatch { .. }
            | Error::SessionCompleted { .. }
            | Error::IncompleteSession { .. } => ErrorCategory::Engine,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Whether this error can only arise from a defect in the calling code.
    ///
    /// Engine errors are precondition failures: the option set and the
    /// displayed category are rendered from the catalog, so a correct caller
    /// never produces them. They must never be shown to an end user.
    pub fn is_programming_error(&self) -> bool {
        self.category() == ErrorCategory::Engine
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::InvalidCatalog { .. } => {
                "Run 'vt-core catalog validate <file>', or remove the file to fall back to the built-in preset."
            }
            Error::OutOfRange { .. } => "Bound category lookups by the catalog's category count.",
            Error::InvalidOption { .. } => {
                "Render options only from the displayed category of the catalog."
            }
            Error::CategoryMismatch { .. } => {
                "Answer the category returned by the session's current_category()."
            }
            Error::SessionCompleted { .. } => "Call reset() to start a new assessment.",
            Error::IncompleteSession { .. } => {
                "Answer every category before requesting a score, or use partial_score()."
            }
            Error::Io(_) => "Check that the file exists and is readable.",
            Error::Json(_) => "Invalid JSON. Check syntax with 'jq . <file>'.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::InvalidCatalog { .. } => "Invalid Catalog",
            Error::OutOfRange { .. } => "Category Out Of Range",
            Error::InvalidOption { .. } => "Invalid Option",
            Error::CategoryMismatch { .. } => "Wrong Category",
            Error::SessionCompleted { .. } => "Session Already Completed",
            Error::IncompleteSession { .. } => "Incomplete Session",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Error",
        }
    }
}

/// Structured error for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error indicates a defect in the caller.
    pub programming_error: bool,

    /// Additional structured context (e.g., category and option ids).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::InvalidCatalog { code, .. } => {
                context.insert("validation_code".to_string(), serde_json::json!(code));
            }
            Error::OutOfRange { index, count } => {
                context.insert("index".to_string(), serde_json::json!(index));
                context.insert("count".to_string(), serde_json::json!(count));
            }
            Error::InvalidOption { category, option } => {
                context.insert("category".to_string(), serde_json::json!(category));
                context.insert("option".to_string(), serde_json::json!(option));
            }
            Error::CategoryMismatch {
                expected,
                requested,
            } => {
                context.insert("expected".to_string(), serde_json::json!(expected));
                context.insert("requested".to_string(), serde_json::json!(requested));
            }
            Error::SessionCompleted { session_id } => {
                context.insert("session_id".to_string(), serde_json::json!(session_id));
            }
            Error::IncompleteSession {
                session_id,
                answered,
                total,
            } => {
                context.insert("session_id".to_string(), serde_json::json!(session_id));
                context.insert("answered".to_string(), serde_json::json!(answered));
                context.insert("total".to_string(), serde_json::json!(total));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            programming_error: err.is_programming_error(),
            context,
        }
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}
