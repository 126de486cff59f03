//! Authentication error types.

/// Errors that can occur while talking to the identity directory.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The directory could not be reached or answered with an error.
    #[error("Identity provider error: {message}")]
    Upstream {
        /// Description of the upstream failure.
        message: String,
    },

    /// The directory rejected the session credentials.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The OIDC session has expired.
    #[error("Session expired")]
    SessionExpired,

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Create a new upstream error.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Result type for directory operations.
pub type AuthResult<T> = Result<T, AuthError>;
