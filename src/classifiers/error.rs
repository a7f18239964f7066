use thiserror::Error;

/// Failures local to a single classifier operation. Both are recoverable by
/// the caller: fix the input, or add examples before predicting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    /// The feature vector's length disagrees with the established
    /// dimensionality. An integration error, surfaced immediately.
    #[error("feature vector has {found} values, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    /// `predict` was called before any example was added.
    #[error("classifier holds no examples")]
    NoExamples,
}
