//! Route-guard decisions.
//!
//! Views call [`evaluate`] with the current snapshot and render from the
//! outcome; the redirect helpers give the same answers to code that only
//! needs to know where to navigate.

#[cfg(test)]
#[path = "gate_test.rs"]
mod gate_test;

use model::Role;

use crate::state::SessionState;

/// Where unauthenticated visitors are sent.
pub const SIGN_IN_PATH: &str = "/auth/signin";
/// Where signed-in visitors without the required role are sent.
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Roles a guarded view admits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RoleRequirement {
    /// Any signed-in user.
    #[default]
    Any,
    Only(Role),
    /// Any of the listed roles; an empty list admits nobody.
    OneOf(Vec<Role>),
}

impl RoleRequirement {
    #[must_use]
    pub fn patient() -> Self {
        Self::Only(Role::Patient)
    }

    #[must_use]
    pub fn doctor() -> Self {
        Self::Only(Role::Doctor)
    }

    /// Company or platform administrators.
    #[must_use]
    pub fn admin() -> Self {
        Self::OneOf(vec![Role::CompanyAdmin, Role::PlatformAdmin])
    }

    #[must_use]
    pub fn allows(&self, role: Role) -> bool {
        match self {
            Self::Any => true,
            Self::Only(required) => *required == role,
            Self::OneOf(roles) => roles.contains(&role),
        }
    }
}

impl From<Role> for RoleRequirement {
    fn from(role: Role) -> Self {
        Self::Only(role)
    }
}

impl From<Vec<Role>> for RoleRequirement {
    fn from(roles: Vec<Role>) -> Self {
        Self::OneOf(roles)
    }
}

impl From<&[Role]> for RoleRequirement {
    fn from(roles: &[Role]) -> Self {
        Self::OneOf(roles.to_vec())
    }
}

/// What a guarded view should render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateOutcome {
    /// Session still resolving: show the spinner.
    Loading,
    /// Session resolution failed: show the error panel.
    Failed(String),
    /// Nobody is signed in: navigate away.
    Redirect(&'static str),
    /// Signed in with the wrong role: show the access-denied panel.
    Denied,
    Granted,
}

/// Decide what a view guarded by `requirement` shows for `state`.
///
/// Precedence is loading, then error, then missing user, then role.
#[must_use]
pub fn evaluate(state: &SessionState, requirement: &RoleRequirement) -> GateOutcome {
    if state.loading {
        return GateOutcome::Loading;
    }
    if let Some(error) = &state.error {
        return GateOutcome::Failed(error.clone());
    }
    let Some(user) = &state.user else {
        return GateOutcome::Redirect(SIGN_IN_PATH);
    };
    if requirement.allows(user.role) {
        GateOutcome::Granted
    } else {
        GateOutcome::Denied
    }
}

/// Sign-in path when settled with nobody signed in.
#[must_use]
pub fn auth_redirect(state: &SessionState) -> Option<&'static str> {
    (!state.loading && state.user.is_none()).then_some(SIGN_IN_PATH)
}

/// Unauthorized path when settled with a user outside `requirement`.
#[must_use]
pub fn role_redirect(state: &SessionState, requirement: &RoleRequirement) -> Option<&'static str> {
    if state.loading {
        return None;
    }
    let user = state.user.as_ref()?;
    (!requirement.allows(user.role)).then_some(UNAUTHORIZED_PATH)
}
