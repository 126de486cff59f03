//! User directory trait.
//!
//! The directory is the authoritative source for member information (an
//! OIDC-backed identity provider). Implementations own their own transport
//! and retry policy; callers treat every error the same way.

use async_trait::async_trait;
use launchpad_core::UserInfo;

use crate::AuthResult;
use crate::session::OidcSession;

/// Authoritative source of member information.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Get the member the session belongs to.
    async fn get_me(&self, session: &OidcSession) -> AuthResult<UserInfo>;

    /// Get every active (not suspended or deactivated) member, bots included.
    async fn get_all_active_users(&self, session: &OidcSession) -> AuthResult<Vec<UserInfo>>;
}
