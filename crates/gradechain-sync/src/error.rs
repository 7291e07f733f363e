//! Sync engine error types.

use thiserror::Error;

use crate::staging::StagingError;
use gradechain_ledger::LedgerError;

/// Errors that can occur during a synchronization pass or restore.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Ledger client error.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Staging store error.
    #[error("Staging error: {0}")]
    Staging(#[from] StagingError),

    /// A fanned-out merge task could not be joined.
    #[error("Merge task failed: {message}")]
    Join { message: String },

    /// Internal error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SyncError {
    /// Create a join error.
    pub fn join(message: impl Into<String>) -> Self {
        Self::Join {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error is retryable on a later pass.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Ledger(e) => e.is_transient(),
            SyncError::Staging(_) => true,
            SyncError::Join { .. } | SyncError::Internal { .. } => false,
        }
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SyncError::join("task panicked");
        assert!(err.to_string().contains("task panicked"));

        let err: SyncError = LedgerError::unavailable("down").into();
        assert!(err.to_string().contains("down"));
    }

    #[test]
    fn test_is_retryable() {
        assert!(SyncError::from(LedgerError::unavailable("down")).is_retryable());
        assert!(!SyncError::from(LedgerError::internal("bug")).is_retryable());
        assert!(SyncError::from(StagingError::commit("deadlock")).is_retryable());
        assert!(!SyncError::internal("bug").is_retryable());
    }
}
