use super::*;
use model::{Doctor, Joined, Patient};

fn patient() -> Patient {
    Patient {
        id: "p1".to_owned(),
        user_id: "u1".to_owned(),
        date_of_birth: None,
        gender: None,
        address: None,
        emergency_contact_name: None,
        emergency_contact_phone: None,
        medical_record_number: None,
        insurance_provider: None,
        insurance_number: None,
        allergies: Vec::new(),
        chronic_conditions: Vec::new(),
    }
}

fn doctor() -> Doctor {
    Doctor {
        id: "d1".to_owned(),
        user_id: "u1".to_owned(),
        license_number: "12345678".to_owned(),
        specialties: vec!["Cardiología".to_owned(), "Medicina interna".to_owned()],
        years_experience: 12,
        consultation_fee: Some(800.0),
        education: Vec::new(),
        certifications: Vec::new(),
        languages: Vec::new(),
        timezone: "UTC".to_owned(),
        is_verified: true,
        is_available: false,
    }
}

#[test]
fn bare_patient_has_no_detail_rows() {
    assert!(patient_details(&Joined::bare(patient())).is_empty());
}

#[test]
fn patient_rows_follow_filled_fields() {
    let profile = Joined::bare(Patient {
        medical_record_number: Some("MRN-9".to_owned()),
        allergies: vec!["penicilina".to_owned(), "látex".to_owned()],
        ..patient()
    });
    assert_eq!(
        patient_details(&profile),
        vec![("Expediente", "MRN-9".to_owned()), ("Alergias", "penicilina, látex".to_owned())]
    );
}

#[test]
fn doctor_rows_always_include_license_and_availability() {
    let rows = doctor_details(&Joined::bare(doctor()));
    assert_eq!(rows[0], ("Cédula", "12345678".to_owned()));
    assert!(rows.contains(&("Especialidades", "Cardiología, Medicina interna".to_owned())));
    assert!(rows.contains(&("Experiencia", "12 años".to_owned())));
    assert!(rows.contains(&("Disponible", "No".to_owned())));
}
