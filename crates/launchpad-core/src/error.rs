use thiserror::Error;

/// Core error types for Launchpad domain values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid member name: {0}")]
    InvalidMemberName(String),

    #[error("Invalid seat id: {0}")]
    InvalidSeatId(u32),
}

impl CoreError {
    /// Create a new InvalidMemberName error
    pub fn invalid_member_name(message: impl Into<String>) -> Self {
        Self::InvalidMemberName(message.into())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
