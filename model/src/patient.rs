//! `patients` rows, one per patient-role user.

#[cfg(test)]
#[path = "patient_test.rs"]
mod patient_test;

use serde::{Deserialize, Serialize};

use crate::Joined;
use crate::user::{User, UserSummary};

/// Patient profile row keyed by the owning user's id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub emergency_contact_name: Option<String>,
    #[serde(default)]
    pub emergency_contact_phone: Option<String>,
    #[serde(default)]
    pub medical_record_number: Option<String>,
    #[serde(default)]
    pub insurance_provider: Option<String>,
    #[serde(default)]
    pub insurance_number: Option<String>,
    #[serde(default, deserialize_with = "crate::null_as_empty")]
    pub allergies: Vec<String>,
    #[serde(default, deserialize_with = "crate::null_as_empty")]
    pub chronic_conditions: Vec<String>,
}

/// Patient row with the full owning user embedded.
pub type PatientProfile = Joined<Patient, User>;

/// Patient row with a name/avatar summary, as embedded in a doctor's appointments.
pub type PatientListing = Joined<Patient, UserSummary>;

/// Patient-editable fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chronic_conditions: Option<Vec<String>>,
}
