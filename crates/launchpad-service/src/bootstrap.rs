//! Startup wiring.
//!
//! The caches are created exactly once here and shared by the services for
//! the life of the process.

use std::sync::Arc;
use std::time::Duration;

use launchpad_auth::UserDirectory;

use crate::cache::{CacheKind, CacheStats, Clock, LocalSeatCache, LocalUserCache, SystemClock};
use crate::config::{AppConfig, loader::load_config};
use crate::context::RequestContext;
use crate::error::BootstrapError;
use crate::repository::SeatRepository;
use crate::service::{SeatService, UserService};
use crate::{metrics, observability};

/// Bring the process up: load configuration, install tracing and the
/// metrics recorder, then build the services on the system clock.
///
/// `config_path` falls back to `launchpad.toml` in the working directory.
pub fn init(
    config_path: Option<&str>,
    directory: Arc<dyn UserDirectory>,
    seat_repository: Arc<dyn SeatRepository>,
) -> Result<Services, BootstrapError> {
    let config = load_config(config_path).map_err(BootstrapError::Config)?;

    if !observability::init_tracing(&config.logging) {
        // Someone installed a subscriber already; adjust ours if it is ours.
        observability::apply_logging_level(&config.logging.level);
    }
    tracing::info!(
        path = config_path.unwrap_or("launchpad.toml"),
        level = %config.logging.level,
        "configuration loaded"
    );

    metrics::init_metrics();

    Services::build(&config, directory, seat_repository, Arc::new(SystemClock))
}

/// The wired domain services.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub seats: SeatService,
    upstream_timeout: Option<Duration>,
    user_cache: Arc<LocalUserCache>,
    seat_cache: Arc<LocalSeatCache>,
}

impl Services {
    /// Validate `config`, create the caches and wire the services.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError`] if the configuration is invalid or a cache
    /// store cannot be created. Callers should treat this as fatal.
    pub fn build(
        config: &AppConfig,
        directory: Arc<dyn UserDirectory>,
        seat_repository: Arc<dyn SeatRepository>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BootstrapError> {
        config.validate().map_err(BootstrapError::Config)?;

        let user_cache = Arc::new(LocalUserCache::new(
            &config.cache.me,
            &config.cache.active_users,
            Arc::clone(&clock),
        )?);
        let seat_cache = Arc::new(LocalSeatCache::new(&config.cache.active_seats, clock)?);

        tracing::info!(
            me_ttl_secs = config.cache.me.ttl_secs,
            active_users_ttl_secs = config.cache.active_users.ttl_secs,
            active_seats_ttl_secs = config.cache.active_seats.ttl_secs,
            upstream_timeout_ms = config.upstream.timeout_ms,
            "caches initialized"
        );

        let upstream_timeout = config.upstream_timeout();
        Ok(Self {
            users: UserService::new(directory, user_cache.clone())
                .with_upstream_timeout(upstream_timeout),
            seats: SeatService::new(seat_repository, seat_cache.clone())
                .with_upstream_timeout(upstream_timeout),
            upstream_timeout,
            user_cache,
            seat_cache,
        })
    }

    /// A fresh request context bounded by the configured upstream timeout.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::default().or_timeout(self.upstream_timeout)
    }

    /// Statistics of every cache store.
    pub fn cache_stats(&self) -> Vec<(CacheKind, CacheStats)> {
        vec![
            (CacheKind::Me, self.user_cache.me_stats()),
            (CacheKind::ActiveUsers, self.user_cache.active_users_stats()),
            (CacheKind::ActiveSeats, self.seat_cache.stats()),
        ]
    }

    /// Flush deferred cache maintenance.
    pub async fn run_pending_tasks(&self) {
        self.user_cache.run_pending_tasks().await;
        self.seat_cache.run_pending_tasks().await;
    }
}
