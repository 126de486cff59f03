//! Active seat caching.
//!
//! The active seats are cached as one value under a single key, in a store
//! of their own so that seat traffic never competes with user entries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use launchpad_core::Seat;

use super::CacheKind;
use super::clock::Clock;
use super::error::{CacheError, CacheResult, StoreError};
use super::store::{CacheStats, TtlStore};
use crate::config::StoreSettings;
use crate::metrics::{self, LookupOutcome};

/// Singleton key of the active-seats store.
const ACTIVE_SEATS_KEY: &str = "active_seats";

/// Cost of the active-seats set.
const ACTIVE_SEATS_COST: u32 = 1;

/// Trait for active seat caching.
#[async_trait]
pub trait SeatCache: Send + Sync {
    async fn get_active_seats(&self) -> CacheResult<Arc<[Seat]>>;

    async fn set_active_seats(&self, seats: Arc<[Seat]>) -> CacheResult<()>;
}

/// In-process seat cache backed by a [`TtlStore`].
#[derive(Debug)]
pub struct LocalSeatCache {
    active_seats: TtlStore<&'static str, Arc<[Seat]>>,
    ttl: Duration,
}

impl LocalSeatCache {
    pub fn new(settings: &StoreSettings, clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        Ok(Self {
            active_seats: TtlStore::new(
                CacheKind::ActiveSeats.as_str(),
                settings.num_counters,
                settings.max_cost,
                clock,
            )?,
            ttl: settings.ttl(),
        })
    }

    pub async fn run_pending_tasks(&self) {
        self.active_seats.run_pending_tasks().await;
    }

    pub fn stats(&self) -> CacheStats {
        self.active_seats.stats()
    }
}

#[async_trait]
impl SeatCache for LocalSeatCache {
    async fn get_active_seats(&self) -> CacheResult<Arc<[Seat]>> {
        match self.active_seats.get(&ACTIVE_SEATS_KEY).await {
            Some(seats) => {
                metrics::record_cache_lookup(CacheKind::ActiveSeats, LookupOutcome::Hit);
                Ok(seats)
            }
            None => {
                metrics::record_cache_lookup(CacheKind::ActiveSeats, LookupOutcome::Miss);
                Err(CacheError::Miss {
                    cache: CacheKind::ActiveSeats,
                })
            }
        }
    }

    async fn set_active_seats(&self, seats: Arc<[Seat]>) -> CacheResult<()> {
        // Accepted entries become visible after the store applies the write.
        if self
            .active_seats
            .set(ACTIVE_SEATS_KEY, seats, ACTIVE_SEATS_COST, self.ttl)
            .await
        {
            Ok(())
        } else {
            Err(CacheError::AdmissionRejected {
                cache: CacheKind::ActiveSeats,
            })
        }
    }
}
