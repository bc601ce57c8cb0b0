//! Sink-specific error types.

use thiserror::Error;

/// Errors that can occur when writing or rendering gauges.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Registry rejected a family or a label set.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    /// No family with this name was registered.
    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    /// Labeled write to an unlabeled family, or the reverse.
    #[error("label mismatch for {name}: expected {expected} label(s), got {got}")]
    LabelMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    /// Text exposition could not be rendered.
    #[error("failed to encode metrics: {0}")]
    Encode(String),
}
