//! `doctors` rows and the public doctor directory view.

#[cfg(test)]
#[path = "doctor_test.rs"]
mod doctor_test;

use serde::{Deserialize, Serialize};

use crate::Joined;
use crate::user::{User, UserSummary};

/// Doctor profile row keyed by the owning user's id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub user_id: String,
    pub license_number: String,
    #[serde(default, deserialize_with = "crate::null_as_empty")]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub years_experience: u32,
    #[serde(default)]
    pub consultation_fee: Option<f64>,
    #[serde(default, deserialize_with = "crate::null_as_empty")]
    pub education: Vec<String>,
    #[serde(default, deserialize_with = "crate::null_as_empty")]
    pub certifications: Vec<String>,
    #[serde(default, deserialize_with = "crate::null_as_empty")]
    pub languages: Vec<String>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_available: bool,
}

fn default_timezone() -> String {
    "UTC".to_owned()
}

/// Doctor row with the full owning user embedded.
pub type DoctorProfile = Joined<Doctor, User>;

/// Doctor row with a name/avatar summary, as embedded in a patient's appointments.
pub type DoctorListing = Joined<Doctor, UserSummary>;

/// A row of the read-only `doctor_public_info` view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoctorPublicInfo {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default, deserialize_with = "crate::null_as_empty")]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub years_experience: u32,
    #[serde(default)]
    pub consultation_fee: Option<f64>,
    #[serde(default, deserialize_with = "crate::null_as_empty")]
    pub languages: Vec<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_available: bool,
}

/// Doctor-editable fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DoctorUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialties: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_experience: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consultation_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
}
