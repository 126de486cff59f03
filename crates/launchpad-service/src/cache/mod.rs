//! Identity and seat caching.
//!
//! ## Architecture
//!
//! - **Store**: [`TtlStore`], a bounded, strongly typed key/value store with
//!   per-entry expiry and TinyLFU admission (moka)
//! - **Adapters**: [`UserCache`] and [`SeatCache`], typed facades that own
//!   the cache keys, entry costs and TTLs
//!
//! ## Lookup path
//!
//! ```text
//! service → adapter → store ──hit──→ value
//!                        └──miss──→ authoritative source → best-effort fill
//! ```
//!
//! Entries are never invalidated explicitly. They leave the cache by TTL
//! expiry or eviction, so readers may observe data up to one TTL old.

pub mod clock;
pub mod error;
pub mod seat;
pub mod store;
pub mod user;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CacheError, CacheResult, StoreError};
pub use seat::{LocalSeatCache, SeatCache};
pub use store::{CacheStats, TtlStore};
pub use user::{LocalUserCache, UserCache};

/// The caches maintained by the service layer. Used as a metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    /// Per access-token profile of the calling user.
    Me,
    /// Singleton set of all active users.
    ActiveUsers,
    /// Singleton set of active seats.
    ActiveSeats,
}

impl CacheKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKind::Me => "me",
            CacheKind::ActiveUsers => "active_users",
            CacheKind::ActiveSeats => "active_seats",
        }
    }
}

impl std::fmt::Display for CacheKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
