use super::*;

fn patient_row() -> serde_json::Value {
    serde_json::json!({
        "id": "p1",
        "user_id": "u1",
        "date_of_birth": "1990-04-12",
        "gender": null,
        "address": null,
        "emergency_contact_name": null,
        "emergency_contact_phone": null,
        "medical_record_number": "MRN-001",
        "insurance_provider": null,
        "insurance_number": null,
        "allergies": null,
        "chronic_conditions": null
    })
}

#[test]
fn null_array_columns_read_as_empty() {
    let patient: Patient = serde_json::from_value(patient_row()).unwrap();
    assert!(patient.allergies.is_empty());
    assert!(patient.chronic_conditions.is_empty());
    assert_eq!(patient.medical_record_number.as_deref(), Some("MRN-001"));
}

#[test]
fn array_columns_keep_their_values() {
    let mut row = patient_row();
    row["allergies"] = serde_json::json!(["penicilina"]);
    let patient: Patient = serde_json::from_value(row).unwrap();
    assert_eq!(patient.allergies, vec!["penicilina".to_owned()]);
}

#[test]
fn profile_without_embedded_user_is_bare() {
    let profile: PatientProfile = serde_json::from_value(patient_row()).unwrap();
    assert!(profile.user.is_none());
    assert_eq!(profile.id, "p1");
}
