//! Error types for the engine
//!
//! Only validation and mandatory-commit failures reach the user as
//! notifications; fetch and template failures degrade to last-good or
//! default values inside the pipeline, and best-effort provisioning
//! failures are logged and swallowed.

use crate::services::ServiceError;
use crate::transaction::TransactionState;

/// Errors produced by the space-creation transaction
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// No usable logged-in user; no remote collaborator was contacted
    #[error("invalid user for \"{space}\"")]
    InvalidUser {
        /// Display name of the space that was being created
        space: String,
    },

    /// The mandatory create phase was rejected
    #[error("failed to create \"{space}\": {source}")]
    CreateFailed {
        /// Display name of the space that was being created
        space: String,
        /// Rejection from the space collaborator
        #[source]
        source: ServiceError,
    },

    /// A submission is already in flight
    #[error("a submission is already in flight")]
    Busy,

    /// Internal transition-table violation
    #[error("illegal state transition: {from:?} -> {to:?}")]
    IllegalTransition {
        /// State the engine was in
        from: TransactionState,
        /// State that was requested
        to: TransactionState,
    },
}

impl TransactionError {
    /// Whether the user may retry the submission
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::InvalidUser { .. } | Self::CreateFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_space() {
        let err = TransactionError::CreateFailed {
            space: "My Space".to_string(),
            source: ServiceError::Unavailable,
        };
        assert!(err.to_string().contains("My Space"));
    }

    #[test]
    fn retryability() {
        assert!(TransactionError::InvalidUser {
            space: "s".to_string()
        }
        .is_retryable());
        assert!(!TransactionError::Busy.is_retryable());
    }
}
