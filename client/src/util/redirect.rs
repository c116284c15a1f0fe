//! Navigation helpers for session-dependent routes.
//!
//! SYSTEM CONTEXT
//! ==============
//! Guards leave the app with a full-page load (the session is rebuilt from
//! scratch on the sign-in page). Pages that only need to bounce a visitor
//! use the in-app navigator through [`install_session_redirects`].

#[cfg(test)]
#[path = "redirect_test.rs"]
mod redirect_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use model::Role;
use session::{RoleRequirement, gate};

use crate::state::auth::AuthContext;

/// Landing route for a signed-in user of `role`.
pub fn home_path(role: Role) -> &'static str {
    match role {
        Role::Patient => "/patient",
        Role::Doctor => "/doctor",
        Role::CompanyAdmin | Role::PlatformAdmin => "/admin",
    }
}

/// Replace the whole document with `path`. A no-op outside the browser.
pub fn assign_location(path: &str) {
    #[cfg(feature = "csr")]
    {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().set_href(path) {
                log::warn!("redirect to {path} failed: {e:?}");
            }
        }
    }
    #[cfg(not(feature = "csr"))]
    leptos::logging::log!("redirect to {path} skipped outside the browser");
}

/// Send settled visitors without a session to the sign-in page, and
/// signed-in visitors outside `requirement` to the unauthorized page.
pub fn install_session_redirects<F>(auth: AuthContext, requirement: RoleRequirement, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        let target = auth.with(|state| gate::auth_redirect(state).or_else(|| gate::role_redirect(state, &requirement)));
        if let Some(path) = target {
            navigate(path, NavigateOptions::default());
        }
    });
}
