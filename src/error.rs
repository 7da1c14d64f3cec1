//! Error types for netheat operations.

use thiserror::Error;

/// Result type alias for netheat operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while aggregating benchmarks or computing fields.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// External tool output does not match the expected schema for its
    /// backend variant. Recoverable: triggers the bounded retry inside the
    /// benchmark session.
    #[error("Parse error ({backend}): {reason}")]
    Parse {
        /// Backend variant whose output failed to parse.
        backend: String,
        /// Reason for the failure, including the tool's own error payload
        /// where one was present.
        reason: String,
    },

    /// External tool invocation failed, timed out, or kept producing
    /// malformed output after all retries. Fatal to the current point's
    /// benchmark run.
    #[error("External error ({tool}): {message}")]
    External {
        /// Tool or backend identifier.
        tool: String,
        /// Message, carrying the original tool's error payload where
        /// available.
        message: String,
    },

    /// A requested metric is absent from a point's results at render time.
    /// Fatal to that single metric's plot, not to the whole batch.
    #[error("Metric {metric} missing from results of point {point}")]
    MissingMetric {
        /// Name of the missing canonical metric.
        metric: String,
        /// Identifier of the point lacking the metric.
        point: String,
    },

    /// Not enough benchmarked points to request a plot.
    #[error("Not enough benchmarked points: have {actual}, need at least {needed}")]
    TooFewPoints {
        /// Minimum number of benchmarked points required.
        needed: usize,
        /// Number of benchmarked points present.
        actual: usize,
    },

    /// The interpolant could not be fit (no measured samples, or a
    /// numerically singular system).
    #[error("Interpolation failed: {0}")]
    Interpolation(String),

    /// The survey document is missing, unreadable, or structurally invalid.
    /// Fatal before any measurement or rendering begins.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
