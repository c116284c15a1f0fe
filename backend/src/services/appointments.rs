//! `appointments` table and `upcoming_appointments` view access.
//!
//! Booking assigns the video room id on the client from a random v4 UUID.

#[cfg(test)]
#[path = "appointments_test.rs"]
mod appointments_test;

use serde::Serialize;
use uuid::Uuid;

use model::{Appointment, AppointmentUpdate, NewAppointment, UpcomingAppointment};

use crate::error::BackendError;
use crate::rest::{Query, RestClient, stamp};

const UPCOMING_LIMIT: usize = 10;

pub struct Appointments<'a> {
    pub(crate) rest: &'a RestClient,
}

#[derive(Serialize)]
struct Booking<'a> {
    #[serde(flatten)]
    appointment: &'a NewAppointment,
    video_room_id: String,
}

pub(crate) fn new_room_id() -> String {
    format!("room_{}", Uuid::new_v4().simple())
}

impl Appointments<'_> {
    /// Book an appointment with a fresh video room.
    ///
    /// # Errors
    ///
    /// Returns the service's message when the insert is refused.
    pub async fn create(&self, appointment: &NewAppointment) -> Result<Appointment, BackendError> {
        let booking = Booking { appointment, video_room_id: new_room_id() };
        self.rest.insert_one("appointments", &booking).await
    }

    /// Patch one appointment, stamping `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns the service's message when the update is refused.
    pub async fn update(&self, appointment_id: &str, updates: &AppointmentUpdate) -> Result<Appointment, BackendError> {
        self.rest
            .update_one(Query::table("appointments").eq("id", appointment_id), &stamp(updates))
            .await
    }

    /// Next appointments visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns the service's message on failure.
    pub async fn upcoming(&self) -> Result<Vec<UpcomingAppointment>, BackendError> {
        self.rest
            .fetch_many(
                Query::table("upcoming_appointments")
                    .select("*")
                    .limit(UPCOMING_LIMIT),
            )
            .await
    }
}
