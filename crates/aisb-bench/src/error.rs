//! Error types for the evaluation pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for evaluation pipeline operations
pub type BenchResult<T> = Result<T, BenchError>;

/// How an evaluator execution failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionErrorKind {
    /// The evaluator exceeded the configured execution timeout
    Timeout,
    /// A subprocess spawned by the evaluator crashed or was killed
    ProcessCrash,
    /// The caller cancelled the run
    Cancelled,
    /// The evaluator reported a failure itself
    Failed,
}

impl std::fmt::Display for ExecutionErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExecutionErrorKind::Timeout => "timeout",
            ExecutionErrorKind::ProcessCrash => "process_crash",
            ExecutionErrorKind::Cancelled => "cancelled",
            ExecutionErrorKind::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Main error type for the evaluation pipeline
///
/// Faults from resolution (catalog lookup, integrity check, registry
/// lookup) are structural, non-retryable, and returned to the caller as-is.
/// The runner never retries anything itself.
#[derive(Error, Debug)]
pub enum BenchError {
    /// Malformed or duplicate task records; fatal at catalog load time
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The requested task is not registered in the catalog
    #[error("task '{task_id}' not found in catalog")]
    TaskNotFound { task_id: String },

    /// An expected artifact (evaluator code, evaluation log) is missing
    #[error("artifact not found at '{path}'")]
    ArtifactNotFound { path: PathBuf },

    /// The evaluator artifact no longer matches its pinned hash
    ///
    /// Always aborts the run. Treated as a security incident, never
    /// downgraded to a warning; both digests are carried for audit logging.
    #[error(
        "integrity check failed for '{path}': expected {expected}, got {actual}"
    )]
    Integrity {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// The task's evaluator binding names no registered implementation
    #[error("no evaluator registered under '{name}' (version {version})")]
    UnknownEvaluator { name: String, version: String },

    /// The payload kind carries nothing a trusted evaluator can score
    #[error("research type '{0}' is not evaluable")]
    NotEvaluable(String),

    /// The evaluator itself failed, crashed, timed out, or was cancelled
    #[error("evaluator execution failed ({kind}): {message}")]
    Execution {
        kind: ExecutionErrorKind,
        message: String,
        /// Log written before the failure, if any; kept for debugging
        partial_log: Option<PathBuf>,
    },

    /// Filesystem errors outside the taxonomy above
    #[error("io error: {0}")]
    Io(String),
}

impl BenchError {
    /// Shorthand for an execution fault without a partial log
    pub fn execution(kind: ExecutionErrorKind, message: impl Into<String>) -> Self {
        BenchError::Execution {
            kind,
            message: message.into(),
            partial_log: None,
        }
    }

    /// Whether retrying the same request could possibly succeed
    ///
    /// Retry policy itself lives with the caller; this only classifies.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BenchError::Execution {
                kind: ExecutionErrorKind::Timeout | ExecutionErrorKind::ProcessCrash,
                ..
            }
        )
    }
}

impl From<std::io::Error> for BenchError {
    fn from(err: std::io::Error) -> Self {
        BenchError::Io(err.to_string())
    }
}
