//! Root application component with routing and the session context.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use backend::{BackendConfig, BackendError, Supabase, config};
use session::SessionStore;

use crate::pages::{
    account::AccountPage,
    home::{AdminHomePage, DoctorHomePage, PatientHomePage},
    signin::SignInPage,
    unauthorized::UnauthorizedPage,
};
use crate::state::auth::AuthContext;

/// Build the session store from configuration baked in at compile time.
///
/// # Errors
///
/// Returns [`BackendError::MissingConfig`] when the build did not set
/// `SUPABASE_URL` or `SUPABASE_ANON_KEY`.
pub fn browser_store() -> Result<SessionStore, BackendError> {
    let config = BackendConfig::from_lookup(compile_time_var)?;
    let backend = Supabase::new(config)?;
    Ok(SessionStore::new(Arc::new(backend)))
}

fn compile_time_var(name: &str) -> Option<String> {
    let value = match name {
        config::URL_VAR => option_env!("SUPABASE_URL"),
        config::ANON_KEY_VAR => option_env!("SUPABASE_ANON_KEY"),
        config::SITE_URL_VAR => option_env!("AUTAMEDICA_SITE_URL"),
        _ => None,
    };
    value.map(str::to_owned)
}

/// Root application component.
///
/// Creates the one [`AuthContext`] for the app and hands it to every route
/// explicitly.
#[component]
pub fn App(store: SessionStore) -> impl IntoView {
    provide_meta_context();

    let auth = AuthContext::new(store);
    auth.mount();

    view! {
        <Title text="Autamedica"/>

        <Router>
            <Routes fallback=|| "Página no encontrada.".into_view()>
                <Route path=(StaticSegment("auth"), StaticSegment("signin")) view=move || view! { <SignInPage auth/> }/>
                <Route path=StaticSegment("unauthorized") view=UnauthorizedPage/>
                <Route path=StaticSegment("patient") view=move || view! { <PatientHomePage auth/> }/>
                <Route path=StaticSegment("doctor") view=move || view! { <DoctorHomePage auth/> }/>
                <Route path=StaticSegment("admin") view=move || view! { <AdminHomePage auth/> }/>
                <Route path=StaticSegment("account") view=move || view! { <AccountPage auth/> }/>
                <Route path=StaticSegment("") view=move || view! { <SignInPage auth/> }/>
            </Routes>
        </Router>
    }
}

/// Shown instead of the app when the build is missing backend settings.
#[component]
pub fn ConfigError(message: String) -> impl IntoView {
    view! {
        <div class="min-h-screen flex items-center justify-center">
            <div class="text-center">
                <h2 class="text-2xl font-bold text-gray-900 mb-4">"Error de configuración"</h2>
                <p class="text-gray-600">{message}</p>
            </div>
        </div>
    }
}
