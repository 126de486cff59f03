//! User information caching.
//!
//! Two independent stores back this adapter:
//!
//! - **me**: the calling user's profile keyed by OIDC access token
//! - **active users**: the full set of active users under a single key
//!
//! A write to one never affects the other; each has its own capacity,
//! TTL and eviction pressure.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use launchpad_auth::{AccessToken, OidcSession};
use launchpad_core::UserInfo;

use super::CacheKind;
use super::clock::Clock;
use super::error::{CacheError, CacheResult, StoreError};
use super::store::{CacheStats, TtlStore};
use crate::config::StoreSettings;
use crate::metrics::{self, LookupOutcome};

/// Singleton key of the active-users store.
const ACTIVE_USERS_KEY: &str = "active_users";

/// Cost of a single cached profile.
const ME_COST: u32 = 8;

/// Cost of the active-users set.
const ACTIVE_USERS_COST: u32 = 1;

/// Trait for user information caching.
///
/// Implementations must be safe to call concurrently from any number of
/// request handlers.
#[async_trait]
pub trait UserCache: Send + Sync {
    /// Get the cached profile for an access token.
    async fn get_me(&self, access_token: &AccessToken) -> CacheResult<UserInfo>;

    /// Cache the profile of the session's user under its access token.
    ///
    /// The entry never outlives the session.
    async fn set_me(&self, session: &OidcSession, user: &UserInfo) -> CacheResult<()>;

    /// Get the cached set of all active users, bots included.
    async fn get_all_active_users(&self) -> CacheResult<Arc<[UserInfo]>>;

    /// Cache the set of all active users.
    async fn set_all_active_users(&self, users: Arc<[UserInfo]>) -> CacheResult<()>;
}

/// In-process user cache backed by two [`TtlStore`]s.
#[derive(Debug)]
pub struct LocalUserCache {
    me: TtlStore<AccessToken, UserInfo>,
    me_ttl: Duration,
    active_users: TtlStore<&'static str, Arc<[UserInfo]>>,
    active_users_ttl: Duration,
}

impl LocalUserCache {
    /// Create a user cache from store settings.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if either store's settings are invalid.
    pub fn new(
        me: &StoreSettings,
        active_users: &StoreSettings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            me: TtlStore::new(
                CacheKind::Me.as_str(),
                me.num_counters,
                me.max_cost,
                Arc::clone(&clock),
            )?,
            me_ttl: me.ttl(),
            active_users: TtlStore::new(
                CacheKind::ActiveUsers.as_str(),
                active_users.num_counters,
                active_users.max_cost,
                clock,
            )?,
            active_users_ttl: active_users.ttl(),
        })
    }

    /// Run deferred maintenance on both stores.
    pub async fn run_pending_tasks(&self) {
        self.me.run_pending_tasks().await;
        self.active_users.run_pending_tasks().await;
    }

    pub fn me_stats(&self) -> CacheStats {
        self.me.stats()
    }

    pub fn active_users_stats(&self) -> CacheStats {
        self.active_users.stats()
    }
}

#[async_trait]
impl UserCache for LocalUserCache {
    async fn get_me(&self, access_token: &AccessToken) -> CacheResult<UserInfo> {
        match self.me.get(access_token).await {
            Some(user) => {
                metrics::record_cache_lookup(CacheKind::Me, LookupOutcome::Hit);
                Ok(user)
            }
            None => {
                metrics::record_cache_lookup(CacheKind::Me, LookupOutcome::Miss);
                Err(CacheError::Miss {
                    cache: CacheKind::Me,
                })
            }
        }
    }

    async fn set_me(&self, session: &OidcSession, user: &UserInfo) -> CacheResult<()> {
        let Some(remaining) = session.remaining() else {
            return Err(CacheError::AdmissionRejected {
                cache: CacheKind::Me,
            });
        };
        let ttl = self.me_ttl.min(remaining);

        if self
            .me
            .set(session.access_token().clone(), user.clone(), ME_COST, ttl)
            .await
        {
            Ok(())
        } else {
            Err(CacheError::AdmissionRejected {
                cache: CacheKind::Me,
            })
        }
    }

    async fn get_all_active_users(&self) -> CacheResult<Arc<[UserInfo]>> {
        match self.active_users.get(&ACTIVE_USERS_KEY).await {
            Some(users) => {
                metrics::record_cache_lookup(CacheKind::ActiveUsers, LookupOutcome::Hit);
                Ok(users)
            }
            None => {
                metrics::record_cache_lookup(CacheKind::ActiveUsers, LookupOutcome::Miss);
                Err(CacheError::Miss {
                    cache: CacheKind::ActiveUsers,
                })
            }
        }
    }

    async fn set_all_active_users(&self, users: Arc<[UserInfo]>) -> CacheResult<()> {
        if self
            .active_users
            .set(
                ACTIVE_USERS_KEY,
                users,
                ACTIVE_USERS_COST,
                self.active_users_ttl,
            )
            .await
        {
            Ok(())
        } else {
            Err(CacheError::AdmissionRejected {
                cache: CacheKind::ActiveUsers,
            })
        }
    }
}
