use super::*;
use crate::role::Role;

#[test]
fn doctor_profile_flattens_row_and_embeds_user() {
    let json = serde_json::json!({
        "id": "d1",
        "user_id": "u1",
        "license_number": "MN-4411",
        "specialties": ["cardiology"],
        "years_experience": 12,
        "languages": ["es", "en"],
        "timezone": "America/Argentina/Buenos_Aires",
        "is_verified": true,
        "is_available": false,
        "user": {
            "id": "u1",
            "email": "doc@x.com",
            "name": "Dra. Ruiz",
            "role": "doctor",
            "is_active": true,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }
    });
    let profile: DoctorProfile = serde_json::from_value(json).unwrap();
    assert_eq!(profile.license_number, "MN-4411");
    assert_eq!(profile.record.years_experience, 12);
    assert_eq!(profile.user.as_ref().map(|u| u.role), Some(Role::Doctor));
}

#[test]
fn doctor_listing_accepts_summary_user() {
    let json = serde_json::json!({
        "id": "d1",
        "user_id": "u1",
        "license_number": "MN-4411",
        "user": { "name": "Dra. Ruiz", "avatar_url": null }
    });
    let listing: DoctorListing = serde_json::from_value(json).unwrap();
    assert_eq!(listing.user.unwrap().name, "Dra. Ruiz");
    assert_eq!(listing.record.timezone, "UTC");
    assert!(listing.record.specialties.is_empty());
}

#[test]
fn doctor_update_skips_unset_fields() {
    let update = DoctorUpdate { is_available: Some(true), ..DoctorUpdate::default() };
    assert_eq!(serde_json::to_value(&update).unwrap(), serde_json::json!({ "is_available": true }));
}

#[test]
fn doctor_null_array_columns_read_as_empty() {
    let json = serde_json::json!({
        "id": "d1",
        "user_id": "u1",
        "license_number": "MN-4411",
        "specialties": null,
        "consultation_fee": null,
        "education": null,
        "certifications": null,
        "languages": null
    });
    let doctor: Doctor = serde_json::from_value(json).unwrap();
    assert!(doctor.education.is_empty());
    assert!(doctor.certifications.is_empty());
    assert!(doctor.specialties.is_empty());
    assert!(doctor.languages.is_empty());
}
