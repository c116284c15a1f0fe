//! `patients` table access.

use model::{AppointmentDetail, Patient, PatientProfile, PatientUpdate};

use crate::error::BackendError;
use crate::rest::{Query, RestClient, stamp};

const PROFILE_SELECT: &str = "*,user:users(*)";
const APPOINTMENTS_SELECT: &str = "*,doctor:doctors(*,user:users(name,avatar_url))";

pub struct Patients<'a> {
    pub(crate) rest: &'a RestClient,
}

impl Patients<'_> {
    /// Patient row of `user_id` with the account embedded.
    ///
    /// # Errors
    ///
    /// Returns the service's message when no patient row exists.
    pub async fn get(&self, user_id: &str) -> Result<PatientProfile, BackendError> {
        self.rest
            .fetch_one(Query::table("patients").select(PROFILE_SELECT).eq("user_id", user_id))
            .await
    }

    /// Patch the patient row of `user_id`, stamping `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns the service's message when the update is refused.
    pub async fn update(&self, user_id: &str, updates: &PatientUpdate) -> Result<Patient, BackendError> {
        self.rest
            .update_one(Query::table("patients").eq("user_id", user_id), &stamp(updates))
            .await
    }

    /// Appointments of a patient, soonest first, with doctor and doctor name embedded.
    ///
    /// # Errors
    ///
    /// Returns the service's message on failure.
    pub async fn appointments(&self, patient_id: &str) -> Result<Vec<AppointmentDetail>, BackendError> {
        self.rest
            .fetch_many(
                Query::table("appointments")
                    .select(APPOINTMENTS_SELECT)
                    .eq("patient_id", patient_id)
                    .order("scheduled_at", true),
            )
            .await
    }
}
