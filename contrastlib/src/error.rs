//! Error types for contrastlib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while contrasting two commits
#[derive(Error, Debug)]
pub enum ContrastError {
    /// Unresolvable commit range, unreadable repository or invalid options.
    /// Raised before any file is linted.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Git operation error after the range was resolved
    #[error("git error: {0}")]
    Git(String),

    /// External linter missing, or its report could not be parsed
    #[error("{linter} failed on '{path}': {message}")]
    LintToolFailure {
        linter: String,
        path: PathBuf,
        message: String,
    },

    /// Temporary file or checkout failure for a single file
    #[error("resource error for '{path}': {message}")]
    Resource { path: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContrastError {
    pub(crate) fn lint_failure(
        linter: &str,
        path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        ContrastError::LintToolFailure {
            linter: linter.to_string(),
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn resource(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ContrastError::Resource {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error only concerns a single file.
    ///
    /// Per-file errors can be absorbed by [`FailurePolicy::Degrade`](crate::FailurePolicy);
    /// everything else always aborts the run.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            ContrastError::LintToolFailure { .. } | ContrastError::Resource { .. }
        )
    }
}
