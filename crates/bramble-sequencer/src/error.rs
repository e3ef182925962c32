//! Error types for the sequencer

use bramble_stages::StageError;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for sequencer operations
#[derive(Debug, Error)]
pub enum SequencerError {
    /// The saved-position store could not be read or written.
    ///
    /// Fatal for the invocation: without a trustworthy position the
    /// sequencer cannot safely run anything.
    #[error("state store error at {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Selection outside the catalog bounds
    #[error("stage {selected} does not exist; valid stages are 0..={max}")]
    InvalidSelection { selected: usize, max: usize },

    /// Operator input that was not a stage number
    #[error("`{input}` is not a stage number")]
    UnparseableSelection { input: String },

    /// A stage's readiness gate failed; nothing was executed
    #[error("stage {index} ({name}) is not ready: {source}")]
    NotReady {
        index: usize,
        name: String,
        #[source]
        source: StageError,
    },

    /// A stage action failed; the saved position is unchanged
    #[error("stage {index} ({name}) failed: {source}")]
    StageFailed {
        index: usize,
        name: String,
        #[source]
        source: StageError,
    },

    /// I/O error reading operator input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SequencerError {
    /// The concrete next step for the operator, where one is known.
    pub fn remediation(&self) -> Option<&str> {
        match self {
            SequencerError::NotReady { source, .. }
            | SequencerError::StageFailed { source, .. } => source.remediation(),
            SequencerError::InvalidSelection { .. }
            | SequencerError::UnparseableSelection { .. } => {
                Some("enter one of the stage numbers shown in the list, or press Enter for the default")
            }
            SequencerError::Store { .. } | SequencerError::Io(_) => None,
        }
    }
}

/// Result type for sequencer operations
pub type Result<T> = std::result::Result<T, SequencerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SequencerError::InvalidSelection { selected: 99, max: 11 };
        assert_eq!(
            err.to_string(),
            "stage 99 does not exist; valid stages are 0..=11"
        );

        let err = SequencerError::UnparseableSelection { input: "abc".to_string() };
        assert_eq!(err.to_string(), "`abc` is not a stage number");
    }

    #[test]
    fn test_remediation_delegates_to_stage_error() {
        let err = SequencerError::StageFailed {
            index: 7,
            name: "portainer".to_string(),
            source: StageError::NotReady {
                reason: "no socket access".to_string(),
                remediation: Some("log out and back in".to_string()),
            },
        };
        assert_eq!(err.remediation(), Some("log out and back in"));
    }

    #[test]
    fn test_selection_errors_have_remediation() {
        let err = SequencerError::InvalidSelection { selected: 12, max: 11 };
        assert!(err.remediation().is_some());
    }
}
