//! Selection error types

use thiserror::Error;

use crate::split::SplitError;
use crate::tracking::TrackingError;

/// Errors from the nested selection protocol
#[derive(Debug, Error)]
pub enum SelectError {
    /// The selection loop never recorded a best checkpoint for this metric
    #[error("no candidate model was ever checkpointed for metric '{0}'")]
    NoCandidateModel(String),

    #[error(transparent)]
    Split(#[from] SplitError),

    /// Fatal failure propagated from the model collaborator
    #[error("model failure: {0}")]
    Model(String),

    #[error("checkpoint I/O failure: {0}")]
    Checkpoint(#[from] std::io::Error),

    #[error("artifact serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("tracking failure: {0}")]
    Tracking(#[from] TrackingError),
}

/// Result type for selection operations
pub type Result<T> = std::result::Result<T, SelectError>;
