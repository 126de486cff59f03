//! Bounded key/value store with per-entry expiry.
//!
//! `TtlStore` wraps a `moka` future cache. Capacity is expressed in cost
//! units: every entry carries a caller-chosen cost and the store keeps the
//! sum of admitted costs at or below `max_cost`. Which entries survive under
//! pressure is decided by moka's TinyLFU policy, so frequently read keys
//! outlive keys that were written once and never read.
//!
//! Writes are advisory. An accepted write becomes visible to `get`, but
//! eviction bookkeeping runs deferred, so the store may briefly hold more
//! than `max_cost` until pending maintenance has run.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;
use moka::ops::compute::Op;

use super::clock::Clock;
use super::error::StoreError;

/// A stored value together with its admission cost and absolute expiry.
#[derive(Clone)]
struct StoredEntry<V> {
    value: V,
    cost: u32,
    ttl: Duration,
    expires_at: Instant,
}

/// Per-entry expiry policy: each write resets the entry's TTL.
struct EntryExpiry;

impl<K, V> Expiry<K, StoredEntry<V>> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &K,
        entry: &StoredEntry<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &K,
        entry: &StoredEntry<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Store statistics for monitoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries currently held (approximate until maintenance runs).
    pub entries: u64,
    /// Sum of the costs of the entries currently held.
    pub weighted_size: u64,
    /// Configured cost capacity.
    pub max_cost: u64,
    /// Number of lookups that returned a live entry.
    pub hits: u64,
    /// Number of lookups that found nothing or an expired entry.
    pub misses: u64,
    /// Number of writes the store declined.
    pub rejections: u64,
}

impl CacheStats {
    /// Calculate hit rate as a percentage.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Bounded, concurrency-safe store with per-entry TTL.
///
/// Safe to share across tasks; all synchronization is internal.
pub struct TtlStore<K, V> {
    name: String,
    inner: Cache<K, StoredEntry<V>>,
    max_cost: u64,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    rejections: AtomicU64,
}

impl<K, V> TtlStore<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a new store.
    ///
    /// # Arguments
    ///
    /// * `name` - Store name used in logs
    /// * `num_counters` - Expected number of distinct keys; sizes the
    ///   initial table
    /// * `max_cost` - Upper bound on the sum of admitted entry costs
    /// * `clock` - Time source used to decide whether an entry has expired
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if `num_counters` or `max_cost`
    /// is zero.
    pub fn new(
        name: impl Into<String>,
        num_counters: u64,
        max_cost: u64,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let name = name.into();
        if num_counters == 0 {
            return Err(StoreError::InvalidConfig {
                name,
                message: "num_counters must be > 0".into(),
            });
        }
        if max_cost == 0 {
            return Err(StoreError::InvalidConfig {
                name,
                message: "max_cost must be > 0".into(),
            });
        }
        let initial_capacity = usize::try_from(num_counters).map_err(|_| {
            StoreError::InvalidConfig {
                name: name.clone(),
                message: format!("num_counters {num_counters} does not fit in memory"),
            }
        })?;

        let inner = Cache::builder()
            .name(&name)
            .max_capacity(max_cost)
            .initial_capacity(initial_capacity)
            .weigher(|_key: &K, entry: &StoredEntry<V>| entry.cost)
            .expire_after(EntryExpiry)
            .build();

        Ok(Self {
            name,
            inner,
            max_cost,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            rejections: AtomicU64::new(0),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_cost(&self) -> u64 {
        self.max_cost
    }

    /// Look up a live entry.
    ///
    /// Never waits on I/O. An entry whose expiry has passed according to the
    /// store's clock is reported as absent and dropped.
    pub async fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ToOwned<Owned = K> + Hash + Eq + ?Sized,
    {
        let Some(entry) = self.inner.get(key).await else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        if self.clock.now() >= entry.expires_at {
            self.remove_if_stale(key, entry.expires_at).await;
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(entry.value)
    }

    /// Drop the entry for `key` only if it is still the one that expired at
    /// `stale_at`. A fresh value written in the meantime is kept.
    async fn remove_if_stale<Q>(&self, key: &Q, stale_at: Instant)
    where
        K: Borrow<Q>,
        Q: ToOwned<Owned = K> + Hash + Eq + ?Sized,
    {
        self.inner
            .entry_by_ref(key)
            .and_compute_with(|current| {
                let op = match current {
                    Some(current) if current.value().expires_at == stale_at => Op::Remove,
                    _ => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;
    }

    /// Offer an entry to the store.
    ///
    /// Returns `false` when the entry is declined: a zero cost, a cost above
    /// the store capacity, or a zero TTL. A declined write is not an error;
    /// the caller simply goes without caching. An existing entry for the same
    /// key is replaced, TTL included.
    pub async fn set(&self, key: K, value: V, cost: u32, ttl: Duration) -> bool {
        let expires_at = self.clock.now().checked_add(ttl);
        let admissible = cost > 0 && u64::from(cost) <= self.max_cost && !ttl.is_zero();

        let Some(expires_at) = expires_at.filter(|_| admissible) else {
            self.rejections.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                store = %self.name,
                cost,
                max_cost = self.max_cost,
                ?ttl,
                "cache store rejected entry"
            );
            return false;
        };

        self.inner
            .insert(
                key,
                StoredEntry {
                    value,
                    cost,
                    ttl,
                    expires_at,
                },
            )
            .await;
        true
    }

    /// Run deferred maintenance (eviction, expiry bookkeeping) now.
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }

    /// Approximate number of entries held.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Get store statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.inner.entry_count(),
            weighted_size: self.inner.weighted_size(),
            max_cost: self.max_cost,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
        }
    }
}

impl<K, V> std::fmt::Debug for TtlStore<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlStore")
            .field("name", &self.name)
            .field("max_cost", &self.max_cost)
            .finish_non_exhaustive()
    }
}
