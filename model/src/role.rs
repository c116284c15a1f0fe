//! User roles.
//!
//! A role is assigned at sign-up and trusted as returned by the backend. It
//! decides which profile table is read for a user and which routes the user
//! may enter.

#[cfg(test)]
#[path = "role_test.rs"]
mod role_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of four mutually exclusive account roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Doctor,
    CompanyAdmin,
    PlatformAdmin,
}

/// Returned when a string does not name a [`Role`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl Role {
    pub const ALL: [Role; 4] = [Role::Patient, Role::Doctor, Role::CompanyAdmin, Role::PlatformAdmin];

    /// Wire name of the role, as stored in `users.role`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::CompanyAdmin => "company_admin",
            Self::PlatformAdmin => "platform_admin",
        }
    }

    /// Whether this role administers a company or the platform.
    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::CompanyAdmin | Self::PlatformAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ParseRoleError(s.to_owned()))
    }
}
