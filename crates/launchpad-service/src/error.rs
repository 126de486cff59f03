//! Service error types.

use std::time::Duration;

use launchpad_auth::AuthError;
use launchpad_core::CoreError;
use thiserror::Error;

use crate::cache::StoreError;
use crate::repository::RepositoryError;

/// Errors surfaced to callers of the domain services.
///
/// Cache failures never appear here: they are absorbed by the services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to get user info: {0}")]
    Directory(#[from] AuthError),

    #[error("directory returned an invalid member: {0}")]
    InvalidMember(#[from] CoreError),

    #[error("seat repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("upstream call cancelled")]
    Cancelled,

    #[error("upstream call timed out after {0:?}")]
    Timeout(Duration),

    #[error("OIDC session expired")]
    SessionExpired,

    #[error("invalid seat status")]
    InvalidSeatStatus,

    #[error("no such seat")]
    NoSeat,
}

impl ServiceError {
    /// Whether the error came from (or while waiting on) an upstream system.
    pub fn is_upstream_failure(&self) -> bool {
        matches!(
            self,
            Self::Directory(_)
                | Self::InvalidMember(_)
                | Self::Repository(_)
                | Self::Cancelled
                | Self::Timeout(_)
        )
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Fatal errors while wiring the services at startup.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
