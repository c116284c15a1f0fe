//! Session snapshot shape.
//!
//! A snapshot is rebuilt from the backend on every mount and every pushed
//! auth change; nothing here is persisted.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use model::{Company, DoctorProfile, PatientProfile, Role, User};

/// Coarse lifecycle derived from a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Identity not resolved yet, or an action is in flight without a user.
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Identity, role profile, and UI flags for the current browser or CLI session.
///
/// At most one of `patient` / `doctor` / `company` is set, and it matches
/// `user.role`.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub patient: Option<PatientProfile>,
    pub doctor: Option<DoctorProfile>,
    pub company: Option<Company>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    /// Empty state before the first identity lookup.
    #[must_use]
    pub fn initializing() -> Self {
        Self { loading: true, ..Self::signed_out() }
    }

    /// Empty, settled state.
    #[must_use]
    pub fn signed_out() -> Self {
        Self { user: None, patient: None, doctor: None, company: None, loading: false, error: None }
    }

    /// Clear identity, profile, and flags.
    pub fn reset(&mut self) {
        *self = Self::signed_out();
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.user.is_some() {
            Phase::Authenticated
        } else if self.loading {
            Phase::Loading
        } else {
            Phase::Unauthenticated
        }
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    /// Whether the populated profile fields agree with the user's role.
    #[must_use]
    pub fn profile_matches_role(&self) -> bool {
        let populated = [self.patient.is_some(), self.doctor.is_some(), self.company.is_some()]
            .into_iter()
            .filter(|set| *set)
            .count();
        if populated > 1 {
            return false;
        }
        match self.role() {
            None => populated == 0,
            Some(Role::Patient) => self.doctor.is_none() && self.company.is_none(),
            Some(Role::Doctor) => self.patient.is_none() && self.company.is_none(),
            Some(Role::CompanyAdmin | Role::PlatformAdmin) => self.patient.is_none() && self.doctor.is_none(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::initializing()
    }
}
