//! Cache error types.

use thiserror::Error;

use super::CacheKind;

/// Errors returned by cache adapters.
///
/// None of these are fatal for a request: callers fall back to the
/// authoritative source or drop the write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// No live entry for the key. Expected; not worth an error log.
    #[error("cache miss: {cache}")]
    Miss { cache: CacheKind },

    /// A stored value did not have the expected shape.
    #[error("corrupt entry in {cache} cache: {detail}")]
    CorruptEntry { cache: CacheKind, detail: String },

    /// The store declined the write.
    #[error("{cache} cache rejected the entry")]
    AdmissionRejected { cache: CacheKind },
}

impl CacheError {
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::Miss { .. })
    }

    pub fn cache(&self) -> CacheKind {
        match self {
            CacheError::Miss { cache }
            | CacheError::CorruptEntry { cache, .. }
            | CacheError::AdmissionRejected { cache } => *cache,
        }
    }
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Errors raised while constructing a store. Only occurs at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("invalid configuration for cache store {name}: {message}")]
    InvalidConfig { name: String, message: String },
}
