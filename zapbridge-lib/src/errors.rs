//! Error types for bridge operations.
//!
//! The façade is the last classification point: everything it returns is one
//! of these kinds, and HTTP consumers only map kind to status code.

/// Comprehensive error type for bridge operations.
#[derive(thiserror::Error, Debug)]
pub enum BridgeError {
    /// The payee identifier failed to decode.
    #[error("invalid identity: {reason}")]
    InvalidIdentity {
        /// Why the identifier was rejected
        reason: String,
    },

    /// Missing, non-numeric or out-of-range amount.
    #[error("invalid amount: {reason}")]
    InvalidAmount {
        /// Why the amount was rejected
        reason: String,
    },

    /// Handshake with the remote wallet failed.
    #[error("connection to {target} failed: {reason}")]
    ConnectionFailed {
        /// Remote identity we tried to reach
        target: String,
        /// Underlying cause
        reason: String,
    },

    /// The remote reply does not match the expected envelope shape.
    #[error("malformed {tool} response: {reason}")]
    MalformedResponse {
        /// Tool whose reply failed to parse
        tool: String,
        /// What was wrong with the reply
        reason: String,
    },

    /// Transport-level failure during an in-flight call.
    #[error("{operation} failed: {reason}")]
    RemoteUnavailable {
        /// Operation that failed (tool name and identity)
        operation: String,
        /// Underlying cause
        reason: String,
    },

    /// A bounded await expired.
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        /// Operation that timed out
        operation: String,
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// Internal/unexpected error. Never forwarded verbatim to end users.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Create an invalid identity error.
    pub fn invalid_identity(reason: impl Into<String>) -> Self {
        Self::InvalidIdentity {
            reason: reason.into(),
        }
    }

    /// Create an invalid amount error.
    pub fn invalid_amount(reason: impl Into<String>) -> Self {
        Self::InvalidAmount {
            reason: reason.into(),
        }
    }

    /// Create a malformed response error for the given tool.
    pub fn malformed(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if a fresh request may succeed where this one failed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::RemoteUnavailable { .. } | Self::Timeout { .. }
        )
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("serialization error: {err}"))
    }
}
