//! Domain services.
//!
//! Each lookup follows the same cache-aside protocol:
//!
//! 1. Read the cache; a hit is returned without contacting the source.
//! 2. On a miss or any cache error, call the authoritative source.
//! 3. On success, offer the value to the cache. A failed fill is logged
//!    and ignored.
//! 4. On failure, return the error and leave the cache untouched.
//!
//! Concurrent misses for the same key are not collapsed; each caller goes
//! to the source on its own.

pub mod seat;
pub mod user;

pub use seat::SeatService;
pub use user::UserService;

use crate::cache::{CacheError, CacheResult};

/// Take a cached value, treating every cache error as a miss.
fn from_cache<T>(result: CacheResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(CacheError::Miss { cache }) => {
            tracing::debug!(%cache, "cache miss");
            None
        }
        Err(err) => {
            tracing::warn!(cache = %err.cache(), error = %err, "failed to read cache, falling back to source");
            None
        }
    }
}

/// Absorb the outcome of a cache fill.
fn fill_result(result: CacheResult<()>) {
    match result {
        Ok(()) => {}
        Err(err @ CacheError::AdmissionRejected { .. }) => {
            tracing::debug!(cache = %err.cache(), "cache declined entry");
        }
        Err(err) => {
            tracing::warn!(cache = %err.cache(), error = %err, "failed to populate cache");
        }
    }
}
