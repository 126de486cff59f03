//! Member lookups with caching in front of the identity directory.

use std::sync::Arc;
use std::time::Duration;

use launchpad_auth::{OidcSession, UserDirectory};
use launchpad_core::UserInfo;

use super::{fill_result, from_cache};
use crate::cache::UserCache;
use crate::context::RequestContext;
use crate::error::{ServiceError, ServiceResult};
use crate::filter::filter_bots;

/// Member information service.
///
/// Suspensions and reactivations in the directory become visible only
/// after the cached entries expire.
#[derive(Clone)]
pub struct UserService {
    directory: Arc<dyn UserDirectory>,
    cache: Arc<dyn UserCache>,
    upstream_timeout: Option<Duration>,
}

impl UserService {
    pub fn new(directory: Arc<dyn UserDirectory>, cache: Arc<dyn UserCache>) -> Self {
        Self {
            directory,
            cache,
            upstream_timeout: None,
        }
    }

    /// Bound directory calls whose request context carries no timeout.
    pub fn with_upstream_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    /// Check that the session is still valid.
    ///
    /// Only the session expiry is checked; the directory is not contacted.
    pub fn authenticate(&self, session: &OidcSession) -> ServiceResult<()> {
        if session.is_expired() {
            return Err(ServiceError::SessionExpired);
        }
        Ok(())
    }

    /// Resolve the member the session belongs to.
    ///
    /// A member whose name breaks the naming rules is an error and is not
    /// cached.
    pub async fn resolve_me(
        &self,
        ctx: &RequestContext,
        session: &OidcSession,
    ) -> ServiceResult<UserInfo> {
        if let Some(user) = from_cache(self.cache.get_me(session.access_token()).await) {
            return Ok(user);
        }

        let ctx = ctx.or_timeout(self.upstream_timeout);
        let user = ctx.run(self.directory.get_me(session)).await?;
        user.validate()?;

        fill_result(self.cache.set_me(session, &user).await);

        Ok(user)
    }

    /// Resolve every active member, bots included.
    ///
    /// Members with invalid names are dropped from the result.
    pub async fn resolve_all_active_users(
        &self,
        ctx: &RequestContext,
        session: &OidcSession,
    ) -> ServiceResult<Arc<[UserInfo]>> {
        if let Some(users) = from_cache(self.cache.get_all_active_users().await) {
            return Ok(users);
        }

        let ctx = ctx.or_timeout(self.upstream_timeout);
        let users: Arc<[UserInfo]> = ctx
            .run(self.directory.get_all_active_users(session))
            .await?
            .into_iter()
            .filter(|user| match user.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(member_id = %user.id(), error = %e, "skipping member from directory");
                    false
                }
            })
            .collect();

        fill_result(self.cache.set_all_active_users(Arc::clone(&users)).await);

        Ok(users)
    }

    /// Resolve active members, leaving out bots unless `include_bot` is set.
    pub async fn get_active_users(
        &self,
        ctx: &RequestContext,
        session: &OidcSession,
        include_bot: bool,
    ) -> ServiceResult<Vec<UserInfo>> {
        let users = self.resolve_all_active_users(ctx, session).await?;
        Ok(filter_bots(&users, include_bot))
    }
}
