//! Launcher user information as resolved from the identity directory.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// Maximum number of characters in a member name.
const MEMBER_NAME_MAX_CHARS: usize = 32;

/// Opaque identifier of a member in the identity directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(Uuid);

impl MemberId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name of a member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberName(String);

impl MemberName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate the name against the directory's naming rules.
    ///
    /// A name is 1 to 32 characters of ASCII letters, digits, `-` or `_`.
    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(CoreError::invalid_member_name("name is empty"));
        }
        if self.0.chars().count() > MEMBER_NAME_MAX_CHARS {
            return Err(CoreError::invalid_member_name(format!(
                "name is longer than {MEMBER_NAME_MAX_CHARS} characters"
            )));
        }
        if let Some(c) = self
            .0
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(CoreError::invalid_member_name(format!(
                "name contains invalid character {c:?}"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for MemberName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account state reported by the identity directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Deactivated,
    Suspended,
}

impl MemberStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, MemberStatus::Active)
    }
}

/// Minimal information about a member.
///
/// Values are immutable once built; caches hand out clones, so mutating a
/// returned value never affects what other callers observe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    id: MemberId,
    name: MemberName,
    status: MemberStatus,
    bot: bool,
}

impl UserInfo {
    pub fn new(id: MemberId, name: MemberName, status: MemberStatus, bot: bool) -> Self {
        Self {
            id,
            name,
            status,
            bot,
        }
    }

    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn name(&self) -> &MemberName {
        &self.name
    }

    pub fn status(&self) -> MemberStatus {
        self.status
    }

    pub fn is_bot(&self) -> bool {
        self.bot
    }

    /// Check the fields that carry naming rules.
    pub fn validate(&self) -> Result<()> {
        self.name.validate()
    }
}
