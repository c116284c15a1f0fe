//! Role landing pages behind their route guards.

#[cfg(test)]
#[path = "home_test.rs"]
mod home_test;

use leptos::prelude::*;

use model::{DoctorProfile, PatientProfile, User};
use session::gate::SIGN_IN_PATH;

use crate::components::card::{Card, CardContent, CardFooter, CardHeader};
use crate::components::protected_route::{AdminRoute, DoctorRoute, PatientRoute};
use crate::state::auth::AuthContext;
use crate::util::redirect::assign_location;

/// Label/value rows describing a patient profile.
pub(crate) fn patient_details(patient: &PatientProfile) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();
    if let Some(mrn) = &patient.medical_record_number {
        rows.push(("Expediente", mrn.clone()));
    }
    if let Some(provider) = &patient.insurance_provider {
        rows.push(("Aseguradora", provider.clone()));
    }
    if !patient.allergies.is_empty() {
        rows.push(("Alergias", patient.allergies.join(", ")));
    }
    rows
}

/// Label/value rows describing a doctor profile.
pub(crate) fn doctor_details(doctor: &DoctorProfile) -> Vec<(&'static str, String)> {
    let mut rows = vec![("Cédula", doctor.license_number.clone())];
    if !doctor.specialties.is_empty() {
        rows.push(("Especialidades", doctor.specialties.join(", ")));
    }
    rows.push(("Experiencia", format!("{} años", doctor.years_experience)));
    rows.push(("Disponible", if doctor.is_available { "Sí" } else { "No" }.to_owned()));
    rows
}

#[component]
fn SessionCard(auth: AuthContext, title: &'static str) -> impl IntoView {
    let user = move || auth.with(|state| state.user.clone());
    let details = move || {
        auth.with(|state| {
            state
                .patient
                .as_ref()
                .map(patient_details)
                .or_else(|| state.doctor.as_ref().map(doctor_details))
                .unwrap_or_default()
        })
    };

    let on_sign_out = move |_: leptos::ev::MouseEvent| {
        #[cfg(feature = "csr")]
        {
            let store = auth.store();
            leptos::task::spawn_local(async move {
                store.sign_out().await;
                if store.snapshot().user.is_none() {
                    assign_location(SIGN_IN_PATH);
                }
            });
        }
        #[cfg(not(feature = "csr"))]
        assign_location(SIGN_IN_PATH);
    };

    view! {
        <div class="min-h-screen flex items-center justify-center bg-gray-50">
            <Card class="w-full max-w-lg">
                <CardHeader>
                    <h1 class="text-2xl font-bold text-gray-900">{title}</h1>
                    <p class="text-sm text-gray-600">
                        {move || user().map(|u: User| format!("{} · {}", u.name, u.email)).unwrap_or_default()}
                    </p>
                </CardHeader>
                <CardContent>
                    <dl class="grid grid-cols-2 gap-2 text-sm">
                        <For each=details key=|row| row.0 let:row>
                            <dt class="text-gray-500">{row.0}</dt>
                            <dd class="text-gray-900">{row.1}</dd>
                        </For>
                    </dl>
                </CardContent>
                <CardFooter class="justify-between">
                    <a class="text-blue-600 hover:underline" href="/account">"Mi cuenta"</a>
                    <button class="rounded-md border border-gray-300 px-3 py-2" on:click=on_sign_out>
                        "Cerrar sesión"
                    </button>
                </CardFooter>
            </Card>
        </div>
    }
}

#[component]
pub fn PatientHomePage(auth: AuthContext) -> impl IntoView {
    view! {
        <PatientRoute auth>
            <SessionCard auth title="Portal del paciente"/>
        </PatientRoute>
    }
}

#[component]
pub fn DoctorHomePage(auth: AuthContext) -> impl IntoView {
    view! {
        <DoctorRoute auth>
            <SessionCard auth title="Portal médico"/>
        </DoctorRoute>
    }
}

#[component]
pub fn AdminHomePage(auth: AuthContext) -> impl IntoView {
    view! {
        <AdminRoute auth>
            <SessionCard auth title="Administración"/>
        </AdminRoute>
    }
}
