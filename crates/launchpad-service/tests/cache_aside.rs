//! End-to-end cache-aside behavior through [`Services::build`] with the
//! in-process caches.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use launchpad_auth::{AccessToken, AuthError, AuthResult, OidcSession, UserDirectory};
use launchpad_core::{MemberId, MemberName, MemberStatus, Seat, SeatId, SeatStatus, UserInfo};
use launchpad_service::{
    AppConfig, CacheKind, ManualClock, RepositoryError, RepositoryResult, RequestContext,
    SeatRepository, SeatTransaction, ServiceError, Services,
};
use time::OffsetDateTime;
use uuid::Uuid;

// ==================== Fakes ====================

struct MockDirectory {
    users: Mutex<Vec<UserInfo>>,
    down: AtomicBool,
    delay_ms: AtomicU64,
    me_calls: AtomicUsize,
    users_calls: AtomicUsize,
}

impl MockDirectory {
    fn new(users: Vec<UserInfo>) -> Self {
        Self {
            users: Mutex::new(users),
            down: AtomicBool::new(false),
            delay_ms: AtomicU64::new(0),
            me_calls: AtomicUsize::new(0),
            users_calls: AtomicUsize::new(0),
        }
    }

    async fn check(&self) -> AuthResult<()> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.down.load(Ordering::SeqCst) {
            return Err(AuthError::upstream("directory unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for MockDirectory {
    async fn get_me(&self, session: &OidcSession) -> AuthResult<UserInfo> {
        self.me_calls.fetch_add(1, Ordering::SeqCst);
        self.check().await?;
        // The token doubles as the member name.
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.name().as_str() == session.access_token().as_str())
            .cloned()
            .ok_or(AuthError::InvalidCredentials)
    }

    async fn get_all_active_users(&self, _session: &OidcSession) -> AuthResult<Vec<UserInfo>> {
        self.users_calls.fetch_add(1, Ordering::SeqCst);
        self.check().await?;
        Ok(self.users.lock().unwrap().clone())
    }
}

#[derive(Default)]
struct MockSeatRepository {
    seats: Arc<Mutex<Vec<Seat>>>,
    reads: AtomicUsize,
}

#[async_trait]
impl SeatRepository for MockSeatRepository {
    async fn get_active_seats(&self) -> RepositoryResult<Vec<Seat>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .seats
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.is_active())
            .cloned()
            .collect())
    }

    async fn begin_transaction(&self) -> RepositoryResult<Box<dyn SeatTransaction>> {
        let working = self.seats.lock().unwrap().clone();
        Ok(Box::new(MockTransaction {
            table: Arc::clone(&self.seats),
            working,
        }))
    }
}

/// Works on a copy of the table that replaces it on commit.
struct MockTransaction {
    table: Arc<Mutex<Vec<Seat>>>,
    working: Vec<Seat>,
}

#[async_trait]
impl SeatTransaction for MockTransaction {
    async fn get_seats(&mut self) -> RepositoryResult<Vec<Seat>> {
        Ok(self.working.clone())
    }

    async fn get_seat_for_update(&mut self, seat_id: SeatId) -> RepositoryResult<Seat> {
        self.working
            .iter()
            .find(|s| s.id() == seat_id)
            .cloned()
            .ok_or(RepositoryError::RecordNotFound)
    }

    async fn create_seats(&mut self, seats: &[Seat]) -> RepositoryResult<()> {
        self.working.extend_from_slice(seats);
        Ok(())
    }

    async fn update_seats_status(
        &mut self,
        seat_ids: &[SeatId],
        status: SeatStatus,
    ) -> RepositoryResult<()> {
        for seat in self.working.iter_mut() {
            if seat_ids.contains(&seat.id()) {
                seat.set_status(status);
            }
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> RepositoryResult<()> {
        let Self { table, working } = *self;
        *table.lock().unwrap() = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> RepositoryResult<()> {
        Ok(())
    }
}

// ==================== Helpers ====================

fn user(name: &str, bot: bool) -> UserInfo {
    UserInfo::new(
        MemberId::new(Uuid::new_v4()),
        MemberName::new(name),
        MemberStatus::Active,
        bot,
    )
}

fn session(token: &str) -> OidcSession {
    OidcSession::new(
        AccessToken::new(token),
        OffsetDateTime::now_utc() + time::Duration::hours(2),
    )
}

struct Harness {
    services: Services,
    directory: Arc<MockDirectory>,
    seats: Arc<MockSeatRepository>,
    clock: Arc<ManualClock>,
}

fn harness(users: Vec<UserInfo>) -> Harness {
    let directory = Arc::new(MockDirectory::new(users));
    let seats = Arc::new(MockSeatRepository::default());
    let clock = Arc::new(ManualClock::new());
    let services = Services::build(
        &AppConfig::default(),
        directory.clone(),
        seats.clone(),
        clock.clone(),
    )
    .expect("services should build");
    Harness {
        services,
        directory,
        seats,
        clock,
    }
}

// ==================== Scenarios ====================

#[tokio::test]
async fn me_is_fetched_once_per_token_within_ttl() {
    let h = harness(vec![user("mazrean", false), user("alice", false)]);
    let ctx = RequestContext::default();

    let first = h.services.users.resolve_me(&ctx, &session("mazrean")).await.unwrap();
    let again = h.services.users.resolve_me(&ctx, &session("mazrean")).await.unwrap();
    let other = h.services.users.resolve_me(&ctx, &session("alice")).await.unwrap();

    assert_eq!(first, again);
    assert_eq!(other.name().as_str(), "alice");
    assert_eq!(h.directory.me_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn me_is_refetched_after_ttl() {
    let h = harness(vec![user("mazrean", false)]);
    let ctx = RequestContext::default();
    let s = session("mazrean");

    h.services.users.resolve_me(&ctx, &s).await.unwrap();
    h.clock.advance(Duration::from_secs(299));
    h.services.users.resolve_me(&ctx, &s).await.unwrap();
    assert_eq!(h.directory.me_calls.load(Ordering::SeqCst), 1);

    h.clock.advance(Duration::from_secs(2));
    h.services.users.resolve_me(&ctx, &s).await.unwrap();
    assert_eq!(h.directory.me_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn directory_outage_is_masked_by_cache_until_expiry() {
    let h = harness(vec![user("alice", false), user("bot", true)]);
    let ctx = RequestContext::default();
    let s = session("alice");

    let users = h.services.users.get_active_users(&ctx, &s, false).await.unwrap();
    assert_eq!(users.len(), 1);

    h.directory.down.store(true, Ordering::SeqCst);
    let cached = h.services.users.get_active_users(&ctx, &s, true).await.unwrap();
    assert_eq!(cached.len(), 2);

    h.clock.advance(Duration::from_secs(3601));
    let result = h.services.users.get_active_users(&ctx, &s, true).await;
    assert!(matches!(result, Err(ServiceError::Directory(_))));
    assert_eq!(h.directory.users_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn empty_seat_list_is_cached() {
    let h = harness(Vec::new());
    let ctx = RequestContext::default();

    assert!(h.services.seats.get_seats(&ctx).await.unwrap().is_empty());
    assert!(h.services.seats.get_seats(&ctx).await.unwrap().is_empty());
    assert_eq!(h.seats.reads.load(Ordering::SeqCst), 1);

    h.clock.advance(Duration::from_secs(61));
    h.services.seats.get_seats(&ctx).await.unwrap();
    assert_eq!(h.seats.reads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn seat_count_update_refreshes_cache() {
    let h = harness(Vec::new());
    let ctx = RequestContext::default();

    h.services.seats.update_seat_num(&ctx, 3).await.unwrap();
    let seats = h.services.seats.get_seats(&ctx).await.unwrap();

    assert_eq!(seats.len(), 3);
    assert!(seats.iter().all(|s| s.status() == SeatStatus::Empty));
    assert_eq!(h.seats.reads.load(Ordering::SeqCst), 0);

    // Status changes are not pushed into the cache.
    let seat_id = SeatId::new(2).unwrap();
    h.services
        .seats
        .update_seat_status(&ctx, seat_id, SeatStatus::InUse)
        .await
        .unwrap();
    let stale = h.services.seats.get_seats(&ctx).await.unwrap();
    assert_eq!(stale[1].status(), SeatStatus::Empty);

    h.clock.advance(Duration::from_secs(61));
    let fresh = h.services.seats.get_seats(&ctx).await.unwrap();
    assert_eq!(fresh[1].status(), SeatStatus::InUse);
}

#[tokio::test]
async fn caches_do_not_share_entries() {
    let h = harness(vec![user("mazrean", false)]);
    let ctx = RequestContext::default();

    h.services
        .users
        .resolve_all_active_users(&ctx, &session("mazrean"))
        .await
        .unwrap();
    h.services.seats.get_seats(&ctx).await.unwrap();
    h.services.run_pending_tasks().await;

    let stats = h.services.cache_stats();
    let entries = |kind: CacheKind| {
        stats
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, s)| s.entries)
            .unwrap()
    };
    assert_eq!(entries(CacheKind::Me), 0);
    assert_eq!(entries(CacheKind::ActiveUsers), 1);
    assert_eq!(entries(CacheKind::ActiveSeats), 1);
}

#[tokio::test]
async fn concurrent_lookups_all_succeed() {
    let users: Vec<UserInfo> = (0..50).map(|i| user(&format!("user{i}"), false)).collect();
    let h = harness(users);
    let services = Arc::new(h.services);

    let mut handles = Vec::new();
    for i in 0..50 {
        let services = Arc::clone(&services);
        handles.push(tokio::spawn(async move {
            let ctx = RequestContext::default();
            let name = format!("user{i}");
            let me = services.users.resolve_me(&ctx, &session(&name)).await?;
            assert_eq!(me.name().as_str(), name);
            services.users.resolve_all_active_users(&ctx, &session(&name)).await
        }));
    }

    for handle in handles {
        let users = handle.await.unwrap().unwrap();
        assert_eq!(users.len(), 50);
    }
}

#[tokio::test]
async fn invalid_config_fails_bootstrap() {
    let mut config = AppConfig::default();
    config.cache.me.num_counters = 0;

    let result = Services::build(
        &config,
        Arc::new(MockDirectory::new(Vec::new())),
        Arc::new(MockSeatRepository::default()),
        Arc::new(ManualClock::new()),
    );

    assert!(result.is_err());
}

#[tokio::test]
async fn configured_upstream_timeout_applies_to_unbounded_requests() {
    let directory = Arc::new(MockDirectory::new(vec![user("mazrean", false)]));
    directory.delay_ms.store(300, Ordering::SeqCst);
    let mut config = AppConfig::default();
    config.upstream.timeout_ms = 10;
    let services = Services::build(
        &config,
        directory.clone(),
        Arc::new(MockSeatRepository::default()),
        Arc::new(ManualClock::new()),
    )
    .expect("services should build");

    let result = services
        .users
        .resolve_me(&RequestContext::default(), &session("mazrean"))
        .await;
    assert!(matches!(result, Err(ServiceError::Timeout(limit)) if limit == Duration::from_millis(10)));

    assert_eq!(
        services.request_context().timeout(),
        Some(Duration::from_millis(10))
    );

    // A caller's own deadline takes precedence.
    let patient = RequestContext::with_timeout(Duration::from_secs(5));
    let me = services
        .users
        .resolve_me(&patient, &session("mazrean"))
        .await
        .unwrap();
    assert_eq!(me.name().as_str(), "mazrean");
}
