//! Account page: edit the signed-in user's display name and phone.

#[cfg(test)]
#[path = "account_test.rs"]
mod account_test;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use model::UserUpdate;
use session::RoleRequirement;

use crate::components::card::{Card, CardContent, CardHeader};
use crate::components::protected_route::LoadingSpinner;
use crate::state::auth::AuthContext;
use crate::util::redirect::{home_path, install_session_redirects};

/// Build an update from the form fields. Blank fields are left unchanged;
/// `None` when nothing would be written.
pub(crate) fn build_user_update(name: &str, phone: &str) -> Option<UserUpdate> {
    let field = |value: &str| {
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_owned())
    };
    let update = UserUpdate { name: field(name), phone: field(phone), avatar_url: None };
    (!update.is_empty()).then_some(update)
}

#[component]
pub fn AccountPage(auth: AuthContext) -> impl IntoView {
    install_session_redirects(auth, RoleRequirement::Any, use_navigate());

    let name = RwSignal::new(String::new());
    let phone = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let Some(updates) = build_user_update(&name.get(), &phone.get()) else {
            info.set("No hay cambios que guardar.".to_owned());
            return;
        };
        busy.set(true);
        info.set(String::new());

        #[cfg(feature = "csr")]
        {
            let store = auth.store();
            leptos::task::spawn_local(async move {
                match store.update_profile(&updates).await {
                    Ok(()) => {
                        name.set(String::new());
                        phone.set(String::new());
                        info.set("Perfil actualizado.".to_owned());
                    }
                    Err(e) => info.set(format!("No se pudo actualizar el perfil: {e}")),
                }
                busy.set(false);
            });
        }
        #[cfg(not(feature = "csr"))]
        drop(updates);
    };

    let user = move || auth.with(|state| state.user.clone());

    view! {
        <Show when=move || user().is_some() fallback=|| view! { <LoadingSpinner/> }>
            <div class="min-h-screen flex items-center justify-center bg-gray-50">
                <Card class="w-full max-w-md">
                    <CardHeader>
                        <h1 class="text-2xl font-bold text-gray-900">"Mi cuenta"</h1>
                        <p class="text-sm text-gray-600">
                            {move || user().map(|u| format!("{} · {}", u.name, u.email)).unwrap_or_default()}
                        </p>
                    </CardHeader>
                    <CardContent>
                        <form class="space-y-4" on:submit=on_submit>
                            <input
                                class="w-full rounded-md border border-gray-300 px-3 py-2"
                                type="text"
                                placeholder=move || user().map(|u| u.name).unwrap_or_default()
                                prop:value=move || name.get()
                                on:input=move |ev| name.set(event_target_value(&ev))
                            />
                            <input
                                class="w-full rounded-md border border-gray-300 px-3 py-2"
                                type="tel"
                                placeholder=move || user().and_then(|u| u.phone).unwrap_or_else(|| "Teléfono".to_owned())
                                prop:value=move || phone.get()
                                on:input=move |ev| phone.set(event_target_value(&ev))
                            />
                            <button
                                class="w-full rounded-md bg-blue-600 px-3 py-2 text-white"
                                type="submit"
                                disabled=move || busy.get()
                            >
                                "Guardar"
                            </button>
                        </form>
                        <Show when=move || !info.get().is_empty()>
                            <p class="mt-4 text-sm text-gray-700">{move || info.get()}</p>
                        </Show>
                        <a
                            class="mt-4 block text-blue-600 hover:underline"
                            href=move || auth.role().map_or("/", home_path)
                        >
                            "Volver"
                        </a>
                    </CardContent>
                </Card>
            </div>
        </Show>
    }
}
