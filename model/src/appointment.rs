//! Appointments between a patient and a doctor.
//!
//! The session layer never owns appointments; these types exist for the
//! listing, booking, and change-feed helpers.

#[cfg(test)]
#[path = "appointment_test.rs"]
mod appointment_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::doctor::DoctorListing;
use crate::patient::PatientListing;

/// Lifecycle of an appointment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

/// Kind of visit, stored in the `type` column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentKind {
    #[default]
    Consultation,
    FollowUp,
    Emergency,
}

/// Returned when a string does not name an appointment status or kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown appointment {field}: {value}")]
pub struct ParseAppointmentFieldError {
    pub field: &'static str,
    pub value: String,
}

impl AppointmentStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl AppointmentKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Consultation => "consultation",
            Self::FollowUp => "follow_up",
            Self::Emergency => "emergency",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AppointmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ParseAppointmentFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ParseAppointmentFieldError { field: "status", value: other.to_owned() }),
        }
    }
}

impl FromStr for AppointmentKind {
    type Err = ParseAppointmentFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consultation" => Ok(Self::Consultation),
            "follow_up" => Ok(Self::FollowUp),
            "emergency" => Ok(Self::Emergency),
            other => Err(ParseAppointmentFieldError { field: "type", value: other.to_owned() }),
        }
    }
}

/// An `appointments` row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_at: OffsetDateTime,
    pub status: AppointmentStatus,
    #[serde(rename = "type")]
    pub kind: AppointmentKind,
    #[serde(default)]
    pub notes: Option<String>,
    /// Video session room, assigned when the appointment is booked.
    #[serde(default)]
    pub video_room_id: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

/// An appointment with its counterpart embedded: the doctor when listed for
/// a patient, the patient when listed for a doctor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: Appointment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<DoctorListing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<PatientListing>,
}

/// A row of the read-only `upcoming_appointments` view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpcomingAppointment {
    #[serde(flatten)]
    pub appointment: Appointment,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub doctor_name: Option<String>,
}

/// Insert payload for a new appointment. The room id is assigned by the
/// booking helper, not by callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_id: String,
    pub doctor_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_at: OffsetDateTime,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(rename = "type")]
    pub kind: AppointmentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update of an appointment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
    pub scheduled_at: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<AppointmentKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
