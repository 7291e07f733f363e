//! Ledger client error types
//!
//! Error definitions with transient/permanent classification for retry logic.

use thiserror::Error;

/// Error that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // Connection errors (usually transient)
    /// Failed to establish connection to the ledger network.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A ledger call timed out.
    #[error("ledger call timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The ledger network is temporarily unavailable.
    #[error("ledger unavailable: {message}")]
    Unavailable { message: String },

    // Gateway errors
    /// The gateway rejected or failed a call.
    #[error("gateway error: {message}")]
    Gateway {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The client has not been started.
    #[error("ledger client not started")]
    NotStarted,

    // Data errors (permanent)
    /// Failed to marshal or unmarshal a ledger payload.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl LedgerError {
    /// Check if this error is transient and the operation should be retried.
    ///
    /// Transient errors are those caused by temporary conditions that may
    /// resolve themselves, such as network issues or ledger unavailability.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LedgerError::ConnectionFailed { .. }
                | LedgerError::Timeout { .. }
                | LedgerError::Unavailable { .. }
                | LedgerError::Gateway { .. }
        )
    }

    /// Check if this error is permanent and retry won't help.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    // Convenience constructors

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        LedgerError::ConnectionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LedgerError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        LedgerError::Unavailable {
            message: message.into(),
        }
    }

    /// Create a gateway error.
    pub fn gateway(message: impl Into<String>) -> Self {
        LedgerError::Gateway {
            message: message.into(),
            source: None,
        }
    }

    /// Create a gateway error with source.
    pub fn gateway_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LedgerError::Gateway {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        LedgerError::Internal {
            message: message.into(),
        }
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        let transient_errors = vec![
            LedgerError::connection_failed("test"),
            LedgerError::Timeout { timeout_secs: 30 },
            LedgerError::unavailable("test"),
            LedgerError::gateway("test"),
        ];

        for err in transient_errors {
            assert!(err.is_transient(), "Expected {err} to be transient");
            assert!(!err.is_permanent(), "Expected {err} to not be permanent");
        }
    }

    #[test]
    fn test_permanent_errors() {
        assert!(LedgerError::NotStarted.is_permanent());
        assert!(LedgerError::internal("test").is_permanent());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::Timeout { timeout_secs: 30 };
        assert_eq!(err.to_string(), "ledger call timed out after 30 seconds");

        let err = LedgerError::gateway("endorsement failed");
        assert_eq!(err.to_string(), "gateway error: endorsement failed");
    }

    #[test]
    fn test_error_with_source() {
        let source_err = std::io::Error::new(std::io::ErrorKind::Other, "underlying error");
        let err = LedgerError::connection_failed_with_source("failed", source_err);

        assert!(err.is_transient());
        if let LedgerError::ConnectionFailed { source, .. } = &err {
            assert!(source.is_some());
        } else {
            panic!("Expected ConnectionFailed variant");
        }
    }
}
