//! Split error types

use thiserror::Error;

/// Errors from label encoding and fold splitting
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("length mismatch between parallel arrays: {left} vs {right}")]
    ShapeMismatch { left: usize, right: usize },

    #[error("invalid split count: {n_splits} splits for {n_groups} groups")]
    InvalidSplitCount { n_splits: usize, n_groups: usize },
}

/// Result type for split operations
pub type Result<T> = std::result::Result<T, SplitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_error_display() {
        let err = SplitError::ShapeMismatch { left: 3, right: 5 };
        assert!(format!("{}", err).contains("length mismatch"));
        assert!(format!("{}", err).contains('3'));

        let err = SplitError::InvalidSplitCount { n_splits: 1, n_groups: 10 };
        assert!(format!("{}", err).contains("invalid split count"));
        assert!(format!("{}", err).contains("10 groups"));
    }
}
