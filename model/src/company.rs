//! Company accounts managed by company administrators.

use serde::{Deserialize, Serialize};

/// A company record. Not read by the session layer today; kept so admin
/// screens and the session state share a type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub tax_id: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub employees_count: u32,
    #[serde(default)]
    pub contact_person_name: Option<String>,
    #[serde(default)]
    pub contact_person_email: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}
