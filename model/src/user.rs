//! `users` rows and the partial shapes written back to them.

#[cfg(test)]
#[path = "user_test.rs"]
mod user_test;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::role::Role;

/// An account row from the `users` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Identity id issued by the auth service (UUID string).
    pub id: String,
    pub email: String,
    /// Display name.
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

fn default_active() -> bool {
    true
}

/// The `users(name, avatar_url)` projection embedded in appointment listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Client-editable account fields.
///
/// Role and email are deliberately absent: the role is fixed at sign-up and
/// email changes go through the auth service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UserUpdate {
    /// True when no field would be written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.avatar_url.is_none()
    }
}

/// Metadata attached to a new account at sign-up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignUpProfile {
    pub name: Option<String>,
    /// Requested role; the sign-up call falls back to [`Role::Patient`].
    pub role: Option<Role>,
}

impl SignUpProfile {
    /// Role sent to the auth service.
    #[must_use]
    pub fn role_or_default(&self) -> Role {
        self.role.unwrap_or(Role::Patient)
    }
}
