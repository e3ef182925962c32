//! Error types for stage execution
//!
//! Every failure an operator can hit carries enough context to print what
//! failed and what to do next. Remediation text is surfaced through
//! [`StageError::remediation`] rather than buried in log output.

use thiserror::Error;

/// Error type for stage actions
#[derive(Debug, Error)]
pub enum StageError {
    /// An external command exited non-zero or could not be spawned
    #[error("command failed: {command}: {detail}")]
    CommandFailed {
        command: String,
        detail: String,
        remediation: Option<String>,
    },

    /// Required operator input was empty or missing
    #[error("missing required input: {what}")]
    MissingInput {
        what: String,
        remediation: Option<String>,
    },

    /// No release asset matched the platform pattern
    #[error("no asset matching `{pattern}` in release {release}")]
    AssetNotFound { release: String, pattern: String },

    /// A service health endpoint never became ready within the polling budget
    #[error("{service} did not report healthy after {attempts} attempts")]
    NeverHealthy {
        service: String,
        attempts: u32,
        remediation: Option<String>,
    },

    /// Stage precondition not satisfied
    #[error("not ready: {reason}")]
    NotReady {
        reason: String,
        remediation: Option<String>,
    },

    /// I/O error during stage execution
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error talking to an external API
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl StageError {
    /// Build a command failure with no specific remediation.
    pub fn command(command: impl Into<String>, detail: impl Into<String>) -> Self {
        StageError::CommandFailed {
            command: command.into(),
            detail: detail.into(),
            remediation: None,
        }
    }

    /// The concrete next step the operator should take, if one is known.
    pub fn remediation(&self) -> Option<&str> {
        match self {
            StageError::CommandFailed { remediation, .. }
            | StageError::MissingInput { remediation, .. }
            | StageError::NeverHealthy { remediation, .. }
            | StageError::NotReady { remediation, .. } => remediation.as_deref(),
            StageError::AssetNotFound { .. } => {
                Some("check the release page for a matching build, then re-run this stage")
            }
            StageError::Io(_) | StageError::Http(_) => None,
        }
    }
}

/// Result type for stage operations
pub type Result<T> = std::result::Result<T, StageError>;
