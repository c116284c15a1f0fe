//! `doctors` table and `doctor_public_info` view access.

use model::{AppointmentDetail, Doctor, DoctorProfile, DoctorPublicInfo, DoctorUpdate};

use crate::error::BackendError;
use crate::rest::{Query, RestClient, stamp};

const PROFILE_SELECT: &str = "*,user:users(*)";
const APPOINTMENTS_SELECT: &str = "*,patient:patients(*,user:users(name,avatar_url))";

pub struct Doctors<'a> {
    pub(crate) rest: &'a RestClient,
}

impl Doctors<'_> {
    /// Doctor row of `user_id` with the account embedded.
    ///
    /// # Errors
    ///
    /// Returns the service's message when no doctor row exists.
    pub async fn get(&self, user_id: &str) -> Result<DoctorProfile, BackendError> {
        self.rest
            .fetch_one(Query::table("doctors").select(PROFILE_SELECT).eq("user_id", user_id))
            .await
    }

    /// Patch the doctor row of `user_id`, stamping `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns the service's message when the update is refused.
    pub async fn update(&self, user_id: &str, updates: &DoctorUpdate) -> Result<Doctor, BackendError> {
        self.rest
            .update_one(Query::table("doctors").eq("user_id", user_id), &stamp(updates))
            .await
    }

    /// Public directory entries of doctors currently taking appointments.
    ///
    /// # Errors
    ///
    /// Returns the service's message on failure.
    pub async fn available(&self) -> Result<Vec<DoctorPublicInfo>, BackendError> {
        self.rest
            .fetch_many(
                Query::table("doctor_public_info")
                    .select("*")
                    .eq("is_available", true),
            )
            .await
    }

    /// Appointments of a doctor, soonest first, with patient and patient name embedded.
    ///
    /// # Errors
    ///
    /// Returns the service's message on failure.
    pub async fn appointments(&self, doctor_id: &str) -> Result<Vec<AppointmentDetail>, BackendError> {
        self.rest
            .fetch_many(
                Query::table("appointments")
                    .select(APPOINTMENTS_SELECT)
                    .eq("doctor_id", doctor_id)
                    .order("scheduled_at", true),
            )
            .await
    }
}
