//! Sign-in page supporting password and emailed-link sign-in.

#[cfg(test)]
#[path = "signin_test.rs"]
mod signin_test;

use leptos::prelude::*;
use leptos_router::{NavigateOptions, hooks::use_navigate};

use crate::components::card::{Card, CardContent, CardHeader};
use crate::state::auth::AuthContext;
use crate::util::redirect::home_path;

/// Credentials accepted by the form: a trimmed email and, for password
/// sign-in, the password as typed.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct SignInInput {
    pub email: String,
    pub password: Option<String>,
}

pub(crate) fn validate_sign_in_input(email: &str, password: &str) -> Result<SignInInput, &'static str> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Ingresa tu correo electrónico.");
    }
    if !email.contains('@') {
        return Err("Correo electrónico inválido.");
    }
    let password = (!password.trim().is_empty()).then(|| password.to_owned());
    Ok(SignInInput { email: email.to_owned(), password })
}

pub(crate) fn link_sent_message(email: &str) -> String {
    format!("Te enviamos un enlace de acceso a {email}.")
}

#[component]
pub fn SignInPage(auth: AuthContext) -> impl IntoView {
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let navigate = use_navigate();
    Effect::new(move || {
        if let Some(role) = auth.role() {
            navigate(home_path(role), NavigateOptions::default());
        }
    });

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let input = match validate_sign_in_input(&email.get(), &password.get()) {
            Ok(input) => input,
            Err(message) => {
                info.set(message.to_owned());
                return;
            }
        };
        busy.set(true);
        info.set(String::new());

        #[cfg(feature = "csr")]
        {
            let store = auth.store();
            leptos::task::spawn_local(async move {
                let result = match input.password.as_deref() {
                    Some(password) => store.sign_in(&input.email, Some(password)).await,
                    None => store.send_magic_link(&input.email).await,
                };
                match result {
                    Ok(()) if input.password.is_none() => info.set(link_sent_message(&input.email)),
                    Ok(()) => {}
                    Err(e) => log::warn!("sign-in failed: {e}"),
                }
                busy.set(false);
            });
        }
        #[cfg(not(feature = "csr"))]
        drop(input);
    };

    let error = move || auth.with(|state| state.error.clone());

    view! {
        <div class="min-h-screen flex items-center justify-center bg-gray-50">
            <Card class="w-full max-w-md">
                <CardHeader>
                    <h1 class="text-2xl font-bold text-gray-900">"Autamedica"</h1>
                    <p class="text-sm text-gray-600">"Inicia sesión con tu contraseña o recibe un enlace por correo."</p>
                </CardHeader>
                <CardContent>
                    <form class="space-y-4" on:submit=on_submit>
                        <input
                            class="w-full rounded-md border border-gray-300 px-3 py-2"
                            type="email"
                            placeholder="tu@correo.com"
                            prop:value=move || email.get()
                            on:input=move |ev| email.set(event_target_value(&ev))
                        />
                        <input
                            class="w-full rounded-md border border-gray-300 px-3 py-2"
                            type="password"
                            placeholder="Contraseña (opcional)"
                            prop:value=move || password.get()
                            on:input=move |ev| password.set(event_target_value(&ev))
                        />
                        <button
                            class="w-full rounded-md bg-blue-600 px-3 py-2 text-white"
                            type="submit"
                            disabled=move || busy.get()
                        >
                            {move || if password.get().trim().is_empty() { "Enviar enlace" } else { "Iniciar sesión" }}
                        </button>
                    </form>
                    <Show when=move || !info.get().is_empty()>
                        <p class="mt-4 text-sm text-gray-700">{move || info.get()}</p>
                    </Show>
                    <Show when=move || error().is_some()>
                        <p class="mt-4 text-sm text-red-600">{move || error().unwrap_or_default()}</p>
                    </Show>
                </CardContent>
            </Card>
        </div>
    }
}
