//! Session-gated route wrappers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route views wrap their content in one of these guards. The guard renders
//! from [`session::gate::evaluate`]: a spinner while the session resolves, an
//! error panel if resolution failed, a full-page redirect to sign-in with no
//! user, an access-denied panel for the wrong role, and the children
//! otherwise.

use leptos::prelude::*;

use session::{GateOutcome, RoleRequirement};

use crate::state::auth::AuthContext;
use crate::util::redirect::assign_location;

/// Full-screen loading indicator.
#[component]
pub fn LoadingSpinner() -> impl IntoView {
    view! {
        <div class="min-h-screen flex items-center justify-center">
            <div class="animate-spin rounded-full h-32 w-32 border-b-2 border-blue-600"></div>
        </div>
    }
}

#[component]
fn StatusPanel(title: &'static str, message: String) -> impl IntoView {
    view! {
        <div class="min-h-screen flex items-center justify-center">
            <div class="text-center">
                <h2 class="text-2xl font-bold text-gray-900 mb-4">{title}</h2>
                <p class="text-gray-600">{message}</p>
            </div>
        </div>
    }
}

fn guarded(auth: AuthContext, requirement: RoleRequirement, children: ChildrenFn) -> impl IntoView {
    let redirect_requirement = requirement.clone();
    Effect::new(move || {
        if let GateOutcome::Redirect(path) = auth.gate(&redirect_requirement) {
            assign_location(path);
        }
    });

    move || match auth.gate(&requirement) {
        GateOutcome::Loading => view! { <LoadingSpinner/> }.into_any(),
        GateOutcome::Failed(message) => view! { <StatusPanel title="Error de Autenticación" message/> }.into_any(),
        GateOutcome::Redirect(_) => ().into_any(),
        GateOutcome::Denied => view! {
            <StatusPanel
                title="Acceso Denegado"
                message="No tienes permisos para acceder a esta página.".to_owned()
            />
        }
        .into_any(),
        GateOutcome::Granted => children().into_any(),
    }
}

/// Render `children` only for a signed-in user allowed by `require`.
#[component]
pub fn ProtectedRoute(
    auth: AuthContext,
    #[prop(optional, into)] require: RoleRequirement,
    children: ChildrenFn,
) -> impl IntoView {
    guarded(auth, require, children)
}

#[component]
pub fn PatientRoute(auth: AuthContext, children: ChildrenFn) -> impl IntoView {
    guarded(auth, RoleRequirement::patient(), children)
}

#[component]
pub fn DoctorRoute(auth: AuthContext, children: ChildrenFn) -> impl IntoView {
    guarded(auth, RoleRequirement::doctor(), children)
}

/// Company and platform administrators.
#[component]
pub fn AdminRoute(auth: AuthContext, children: ChildrenFn) -> impl IntoView {
    guarded(auth, RoleRequirement::admin(), children)
}
