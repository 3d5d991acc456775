//! Structured configuration issues.
//!
//! Config loaders report problems as a list of [`ConfigIssue`]s instead of
//! failing on the first one, so the CLI can print every warning at once.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A numeric field is outside its allowed range.
    OutOfRange { field: String },
    /// A duration field is zero.
    ZeroTimeout { field: String },
    /// A string enum field holds an unknown value.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
    /// Two workers share the same identity.
    DuplicateWorker { id: String },
    /// A tool name is empty.
    EmptyToolName { worker: String },
}

/// A detected configuration issue.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: IssueSeverity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }
}
