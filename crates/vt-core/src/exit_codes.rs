//! Exit codes for the vt-core CLI.
//!
//! Exit codes communicate the outcome without requiring output parsing.
//!
//! Exit code ranges:
//! - 0-9: Assessment outcomes
//! - 10-19: User/environment errors (recoverable by user action)
//! - 20-29: Internal errors (bugs, should be reported)

/// Exit codes for vt-core operations.
///
/// These codes are a stable contract for scripts wrapping the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    // ========================================================================
    // Assessment Outcomes (0-9)
    // ========================================================================
    /// Success: command finished, no vet visit indicated
    Clean = 0,

    /// Assessment finished at or above the referral band
    ReferralAdvised = 1,

    /// Assessment stopped before a result (quit or closed input)
    Cancelled = 2,

    // ========================================================================
    // User / Environment Errors (10-19)
    // ========================================================================
    /// Invalid arguments or answers
    ArgsError = 10,

    /// Catalog missing, unparseable or invalid
    ConfigError = 11,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::ReferralAdvised => "OK_REFERRAL",
            ExitCode::Cancelled => "OK_CANCELLED",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Map an engine error to the exit code a CLI run should end with.
    pub fn from_error(err: &vt_common::Error) -> Self {
        use vt_common::ErrorCategory;
        match err.category() {
            ErrorCategory::Config => ExitCode::ConfigError,
            ErrorCategory::Io => ExitCode::IoError,
            ErrorCategory::Engine => match err {
                vt_common::Error::InvalidOption { .. }
                | vt_common::Error::CategoryMismatch { .. } => ExitCode::ArgsError,
                _ => ExitCode::InternalError,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vt_common::{CategoryId, Error};

    #[test]
    fn test_cancelled_is_an_outcome_not_an_error() {
        assert_eq!(ExitCode::Cancelled.as_i32(), 2);
        assert_eq!(ExitCode::Cancelled.code_name(), "OK_CANCELLED");
        assert_ne!(ExitCode::Cancelled, ExitCode::ArgsError);
    }

    #[test]
    fn test_from_error() {
        let mismatch = Error::CategoryMismatch {
            expected: CategoryId::from("eating"),
            requested: CategoryId::from("energy"),
        };
        assert_eq!(ExitCode::from_error(&mismatch), ExitCode::ArgsError);

        let incomplete = Error::IncompleteSession {
            session_id: "s".into(),
            answered: 1,
            total: 5,
        };
        assert_eq!(ExitCode::from_error(&incomplete), ExitCode::InternalError);
        let invalid = Error::InvalidCatalog {
            code: 45,
            message: "x".into(),
        };
        assert_eq!(ExitCode::from_error(&invalid), ExitCode::ConfigError);
    }
}
