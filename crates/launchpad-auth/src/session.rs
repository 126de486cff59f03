//! OIDC sessions held by launcher clients.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// OIDC access token. Used as the cache key for per-user lookups.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are credentials; keep them out of logs.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// An authenticated OIDC session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OidcSession {
    access_token: AccessToken,
    expires_at: OffsetDateTime,
}

impl OidcSession {
    pub fn new(access_token: AccessToken, expires_at: OffsetDateTime) -> Self {
        Self {
            access_token,
            expires_at,
        }
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn expires_at(&self) -> OffsetDateTime {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at < now
    }

    /// Remaining lifetime of the session, or `None` once it has expired.
    pub fn remaining(&self) -> Option<Duration> {
        self.remaining_at(OffsetDateTime::now_utc())
    }

    pub fn remaining_at(&self, now: OffsetDateTime) -> Option<Duration> {
        Duration::try_from(self.expires_at - now)
            .ok()
            .filter(|d| !d.is_zero())
    }
}
