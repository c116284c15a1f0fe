//! Record shapes for the Autamedica telehealth platform.
//!
//! This crate owns the row types read from and written to the hosted
//! Postgres schema (`users`, `patients`, `doctors`, `appointments`, and the
//! `doctor_public_info` / `upcoming_appointments` views). It carries no
//! behavior beyond serde mapping and small parse helpers, so every other
//! crate can share one vocabulary.

pub mod appointment;
pub mod company;
pub mod doctor;
pub mod patient;
pub mod role;
pub mod user;

pub use appointment::{
    Appointment, AppointmentDetail, AppointmentKind, AppointmentStatus, AppointmentUpdate, NewAppointment,
    UpcomingAppointment,
};
pub use company::Company;
pub use doctor::{Doctor, DoctorListing, DoctorProfile, DoctorPublicInfo, DoctorUpdate};
pub use patient::{Patient, PatientListing, PatientProfile, PatientUpdate};
pub use role::{ParseRoleError, Role};
pub use user::{SignUpProfile, User, UserSummary, UserUpdate};

use serde::{Deserialize, Deserializer, Serialize};

/// A row with its owning user embedded by a `user:users(...)` select.
///
/// The embedded shape varies by query: profile fetches embed the whole
/// [`User`], appointment listings embed only a [`UserSummary`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Joined<T, U> {
    #[serde(flatten)]
    pub record: T,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub user: Option<U>,
}

impl<T, U> Joined<T, U> {
    /// Wrap a bare record with no embedded user.
    pub fn bare(record: T) -> Self {
        Self { record, user: None }
    }
}

impl<T, U> std::ops::Deref for Joined<T, U> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.record
    }
}

/// Read an array column that PostgREST may send as `null` into an empty vec.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
